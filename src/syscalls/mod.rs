/*!
 * Syscalls Module
 * Descriptor syscalls over the open file and descriptor tables
 */

mod fd;
mod fd_handler;
mod handler;
mod process;
mod rw;

pub mod types;

pub use fd::FdManager;
pub use fd_handler::FileDescriptorHandler;
pub use handler::{SyscallHandler, SyscallHandlerRegistry};
pub use types::{Syscall, SyscallError, SyscallOutcome, SyscallResult, Whence};
