/*!
 * Monitoring
 * Structured tracing for the syscall layer
 */

mod tracer;

pub use tracer::{generate_trace_id, init_tracing, SyscallSpan};
