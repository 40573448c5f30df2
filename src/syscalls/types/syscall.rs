/*!
 * Syscall Definitions
 * Serializable requests for the descriptor syscall surface
 */

use crate::core::types::{Fd, Offset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::errors::SyscallError;

/// Origin selector for lseek
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Whence {
    /// Absolute position
    Set,
    /// Relative to the current offset
    Current,
    /// Relative to the backing object's size
    End,
}

impl Whence {
    pub const SEEK_SET: i32 = 0;
    pub const SEEK_CUR: i32 = 1;
    pub const SEEK_END: i32 = 2;

    #[inline]
    pub const fn to_raw(self) -> i32 {
        match self {
            Whence::Set => Self::SEEK_SET,
            Whence::Current => Self::SEEK_CUR,
            Whence::End => Self::SEEK_END,
        }
    }
}

impl TryFrom<i32> for Whence {
    type Error = SyscallError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            Self::SEEK_SET => Ok(Whence::Set),
            Self::SEEK_CUR => Ok(Whence::Current),
            Self::SEEK_END => Ok(Whence::End),
            other => Err(SyscallError::invalid_argument(format!("whence {}", other))),
        }
    }
}

impl fmt::Display for Whence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Whence::Set => write!(f, "SEEK_SET"),
            Whence::Current => write!(f, "SEEK_CUR"),
            Whence::End => write!(f, "SEEK_END"),
        }
    }
}

/// Descriptor syscall request
///
/// Arguments stay in their raw integer form; decoding happens in the
/// syscall layer so malformed requests surface as syscall errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "syscall")]
#[non_exhaustive]
pub enum Syscall {
    Open {
        /// Path to open; `None` is the null path
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
        /// POSIX open flags (`O_RDONLY` | `O_CREAT` | ...)
        flags: u32,
        /// Creation mode bits
        #[serde(default)]
        mode: u32,
    },
    Close {
        fd: Fd,
    },
    Read {
        fd: Fd,
        /// Maximum bytes to read
        len: usize,
    },
    Write {
        fd: Fd,
        data: Vec<u8>,
    },
    Dup2 {
        oldfd: Fd,
        newfd: Fd,
    },
    Lseek {
        fd: Fd,
        offset: Offset,
        /// Raw origin selector (`SEEK_SET`, `SEEK_CUR`, `SEEK_END`)
        whence: i32,
    },
}

impl Syscall {
    /// Name used for spans and logs
    pub const fn name(&self) -> &'static str {
        match self {
            Syscall::Open { .. } => "open",
            Syscall::Close { .. } => "close",
            Syscall::Read { .. } => "read",
            Syscall::Write { .. } => "write",
            Syscall::Dup2 { .. } => "dup2",
            Syscall::Lseek { .. } => "lseek",
        }
    }
}
