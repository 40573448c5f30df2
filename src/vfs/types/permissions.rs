/*!
 * VFS Permissions
 * Unix-style creation mode bits for backing objects
 */

use serde::{Deserialize, Deserializer, Serialize};

/// File permissions (Unix-style) with validation
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(deserialize_with = "deserialize_permission_mode")]
    pub mode: u32,
}

impl Permissions {
    /// Create permissions, masking to the valid mode bits
    #[inline]
    #[must_use]
    pub const fn new(mode: u32) -> Self {
        Self {
            mode: mode & 0o7777,
        }
    }

    /// Read-only permissions (0o444)
    #[inline]
    #[must_use]
    pub const fn readonly() -> Self {
        Self { mode: 0o444 }
    }

    /// Read-write permissions (0o644)
    #[inline]
    #[must_use]
    pub const fn readwrite() -> Self {
        Self { mode: 0o644 }
    }

    /// No owner write bit set
    #[inline(always)]
    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        self.mode & 0o200 == 0
    }

    /// Clear every write bit, or restore the owner write bit
    #[inline]
    pub fn set_readonly(&mut self, readonly: bool) {
        if readonly {
            self.mode &= !0o222;
        } else {
            self.mode |= 0o200;
        }
    }
}

/// Deserialize and validate permission mode (must be <= 0o7777)
fn deserialize_permission_mode<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let mode = u32::deserialize(deserializer)?;
    if mode > 0o7777 {
        return Err(serde::de::Error::custom(format!(
            "invalid permission mode: 0o{:o} exceeds maximum 0o7777",
            mode
        )));
    }
    Ok(mode)
}

impl Default for Permissions {
    fn default() -> Self {
        Self::readwrite()
    }
}
