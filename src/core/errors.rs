/*!
 * Error Types
 * Top-level kernel error with thiserror and miette diagnostics
 */

use miette::Diagnostic;
use thiserror::Error;

pub use crate::files::TableError;
pub use crate::syscalls::types::SyscallError;
pub use crate::vfs::VfsError;

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Syscall error: {0}")]
    #[diagnostic(
        code(kernel::syscall_error),
        help("The request was rejected by the file syscall layer. Check the errno.")
    )]
    Syscall(#[from] SyscallError),

    #[error("Filesystem error: {0}")]
    #[diagnostic(
        code(kernel::vfs_error),
        help("The backing filesystem rejected the operation.")
    )]
    Vfs(#[from] VfsError),

    #[error("File table error: {0}")]
    #[diagnostic(code(kernel::table_error))]
    Table(#[from] TableError),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(kernel::configuration_error),
        help("Invalid configuration. Review KERNEL_MAX_OPEN_FILES and KERNEL_MAX_FDS.")
    )]
    Configuration(String),
}

impl KernelError {
    /// Conventional errno for this error, if it came from a syscall path
    pub fn errno(&self) -> Option<i32> {
        match self {
            KernelError::Syscall(e) => Some(e.errno()),
            KernelError::Vfs(e) => Some(e.errno()),
            KernelError::Table(e) => Some(SyscallError::from(e.clone()).errno()),
            KernelError::Configuration(_) => None,
        }
    }
}
