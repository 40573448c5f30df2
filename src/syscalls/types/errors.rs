/*!
 * Syscall Error Types
 * The error taxonomy every descriptor syscall reports through
 */

use crate::core::errno;
use crate::files::{TableError, TableKind};
use crate::vfs::VfsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Syscall operation errors
///
/// Backing layer failures are carried verbatim in [`SyscallError::Backing`].
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
#[non_exhaustive]
pub enum SyscallError {
    /// Invalid, out-of-range, unbound or mode-mismatched descriptor
    #[error("Bad file descriptor: {0}")]
    BadDescriptor(String),

    /// Malformed syscall argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A table has no free slot
    #[error("Resource exhausted: {table} full ({capacity} slots)")]
    ResourceExhausted { table: TableKind, capacity: usize },

    /// Allocation failure for table storage
    #[error("Out of memory")]
    OutOfMemory,

    /// The calling process has no descriptor table
    #[error("No descriptor table for process {0}")]
    NoSuchProcess(u32),

    /// Failure reported by the backing layer
    #[error(transparent)]
    Backing(#[from] VfsError),
}

impl SyscallError {
    /// Create a bad descriptor error
    #[inline]
    pub fn bad_descriptor(msg: impl Into<String>) -> Self {
        Self::BadDescriptor(msg.into())
    }

    /// Create an invalid argument error
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Conventional errno for this error
    pub const fn errno(&self) -> i32 {
        match self {
            SyscallError::BadDescriptor(_) => errno::EBADF,
            SyscallError::InvalidArgument(_) => errno::EINVAL,
            SyscallError::ResourceExhausted {
                table: TableKind::OpenFiles,
                ..
            } => errno::ENFILE,
            SyscallError::ResourceExhausted {
                table: TableKind::Descriptors,
                ..
            } => errno::EMFILE,
            SyscallError::OutOfMemory => errno::ENOMEM,
            SyscallError::NoSuchProcess(_) => errno::ESRCH,
            SyscallError::Backing(e) => e.errno(),
        }
    }
}

impl From<TableError> for SyscallError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::BadDescriptor(fd) => Self::BadDescriptor(format!("fd {}", fd)),
            TableError::UnknownEntry(id) => Self::BadDescriptor(format!("stale entry {}", id)),
            TableError::Exhausted { table, capacity } => Self::ResourceExhausted { table, capacity },
            TableError::OutOfMemory(_) => Self::OutOfMemory,
            TableError::Close(e) => Self::Backing(e),
        }
    }
}
