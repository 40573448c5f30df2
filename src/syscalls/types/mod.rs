/*!
 * Syscall Types
 * Requests, results and the error taxonomy of the descriptor syscalls
 */

pub mod errors;
pub mod results;
pub mod syscall;

pub use crate::core::errno;
pub use errors::SyscallError;
pub use results::SyscallResult;
pub use syscall::{Syscall, Whence};

/// Result type for descriptor syscalls
pub type SyscallOutcome<T> = Result<T, SyscallError>;
