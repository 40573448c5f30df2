/*!
 * VFS Error Types
 * Failures reported by the backing object layer
 */

use crate::core::errno;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// VFS operation result
#[must_use = "VFS operations can fail and must be handled"]
pub type VfsResult<T> = Result<T, VfsError>;

/// Backing layer errors
///
/// These pass through the syscall layer verbatim, so every variant carries
/// its own errno. Context strings must be non-empty.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum VfsError {
    #[error("Not found: {0}")]
    NotFound(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Already exists: {0}")]
    AlreadyExists(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Permission denied: {0}")]
    PermissionDenied(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Not a directory: {0}")]
    NotADirectory(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Is a directory: {0}")]
    IsADirectory(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Invalid path: {0}")]
    InvalidPath(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("I/O error: {0}")]
    IoError(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Not supported: {0}")]
    NotSupported(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Out of space")]
    OutOfSpace,

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("File too large")]
    FileTooLarge,
}

impl VfsError {
    /// Conventional errno for this failure
    pub const fn errno(&self) -> i32 {
        match self {
            VfsError::NotFound(_) => errno::ENOENT,
            VfsError::AlreadyExists(_) => errno::EEXIST,
            VfsError::PermissionDenied(_) => errno::EACCES,
            VfsError::NotADirectory(_) => errno::ENOTDIR,
            VfsError::IsADirectory(_) => errno::EISDIR,
            VfsError::InvalidPath(_) | VfsError::InvalidArgument(_) => errno::EINVAL,
            VfsError::IoError(_) => errno::EIO,
            VfsError::NotSupported(_) => errno::ENOSYS,
            VfsError::OutOfSpace => errno::ENOSPC,
            VfsError::FileTooLarge => errno::EFBIG,
        }
    }
}

/// Deserialize and validate non-empty string for error messages
pub(super) fn deserialize_nonempty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::custom("error message must not be empty"));
    }
    Ok(s)
}
