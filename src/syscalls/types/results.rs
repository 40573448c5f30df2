/*!
 * Syscall Result Types
 * Return value / errno pair handed back to the syscall invoker
 */

use super::errors::SyscallError;
use serde::{Deserialize, Serialize};

/// System call result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SyscallResult {
    /// Successful operation
    Success {
        /// Return value (descriptor, byte count, offset, or 0)
        value: i64,
        /// Bytes produced by the call (read)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Vec<u8>>,
    },
    /// Operation failed
    Error {
        /// Conventional error number
        errno: i32,
        /// Human-readable error message
        message: String,
    },
}

impl SyscallResult {
    #[inline]
    #[must_use]
    pub fn success() -> Self {
        Self::Success {
            value: 0,
            data: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn success_with_value(value: i64) -> Self {
        Self::Success { value, data: None }
    }

    #[inline]
    #[must_use]
    pub fn success_with_data(value: i64, data: Vec<u8>) -> Self {
        Self::Success {
            value,
            data: Some(data),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[inline]
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Conventional return register value: the result, or -1 on failure
    #[inline]
    #[must_use]
    pub const fn retval(&self) -> i64 {
        match self {
            Self::Success { value, .. } => *value,
            Self::Error { .. } => -1,
        }
    }

    /// Error number, 0 on success
    #[inline]
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::Success { .. } => 0,
            Self::Error { errno, .. } => *errno,
        }
    }

    /// Extract data if successful
    #[inline]
    #[must_use]
    pub const fn data(&self) -> Option<&Vec<u8>> {
        match self {
            Self::Success { data, .. } => data.as_ref(),
            Self::Error { .. } => None,
        }
    }
}

impl From<SyscallError> for SyscallResult {
    fn from(err: SyscallError) -> Self {
        Self::Error {
            errno: err.errno(),
            message: err.to_string(),
        }
    }
}

impl<T: Into<i64>> From<Result<T, SyscallError>> for SyscallResult {
    fn from(result: Result<T, SyscallError>) -> Self {
        match result {
            Ok(value) => Self::success_with_value(value.into()),
            Err(err) => err.into(),
        }
    }
}
