/*!
 * VFS Open Flags and Mode
 * Flags and modes for file opening operations
 */

use super::errors::VfsError;
use super::permissions::Permissions;
use crate::core::serde::{is_default, is_false};
use serde::{Deserialize, Serialize};

/// POSIX access mode mask
pub const O_ACCMODE: u32 = 0x0003;
pub const O_RDONLY: u32 = 0x0000;
pub const O_WRONLY: u32 = 0x0001;
pub const O_RDWR: u32 = 0x0002;
pub const O_CREAT: u32 = 0x0040;
pub const O_EXCL: u32 = 0x0080;
pub const O_TRUNC: u32 = 0x0200;
pub const O_APPEND: u32 = 0x0400;

/// Direction(s) of transfer an open file permits
///
/// Kept as an explicit tri-state rather than a pair of bits so that
/// read-write can never be mistaken for either single direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    #[default]
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    #[inline(always)]
    #[must_use]
    pub const fn can_read(self) -> bool {
        matches!(self, AccessMode::ReadOnly | AccessMode::ReadWrite)
    }

    #[inline(always)]
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, AccessMode::WriteOnly | AccessMode::ReadWrite)
    }

    /// Decode the low two POSIX bits; `0b11` is not a valid access mode
    pub const fn from_posix(flags: u32) -> Option<Self> {
        match flags & O_ACCMODE {
            O_RDONLY => Some(AccessMode::ReadOnly),
            O_WRONLY => Some(AccessMode::WriteOnly),
            O_RDWR => Some(AccessMode::ReadWrite),
            _ => None,
        }
    }

    pub const fn to_posix(self) -> u32 {
        match self {
            AccessMode::ReadOnly => O_RDONLY,
            AccessMode::WriteOnly => O_WRONLY,
            AccessMode::ReadWrite => O_RDWR,
        }
    }
}

/// File open flags (skips false values when serialized)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct OpenFlags {
    pub access: AccessMode,
    #[serde(skip_serializing_if = "is_false")]
    pub create: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub exclusive: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub truncate: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub append: bool,
}

impl OpenFlags {
    #[inline]
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            access: AccessMode::ReadOnly,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn write_only() -> Self {
        Self {
            access: AccessMode::WriteOnly,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn read_write() -> Self {
        Self {
            access: AccessMode::ReadWrite,
            ..Default::default()
        }
    }

    /// Add create semantics to these flags
    #[inline]
    #[must_use]
    pub fn with_create(mut self) -> Self {
        self.create = true;
        self
    }

    #[inline]
    #[must_use]
    pub const fn will_create(&self) -> bool {
        self.create
    }

    /// Convert from POSIX-style flags (O_RDONLY, O_WRONLY, O_RDWR, etc.)
    pub fn from_posix(flags: u32) -> Result<Self, VfsError> {
        let access = AccessMode::from_posix(flags).ok_or_else(|| {
            VfsError::InvalidArgument(format!("invalid access mode in flags 0x{:x}", flags))
        })?;

        let parsed = Self {
            access,
            create: flags & O_CREAT != 0,
            exclusive: flags & O_EXCL != 0,
            truncate: flags & O_TRUNC != 0,
            append: flags & O_APPEND != 0,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Convert to POSIX-style flags
    pub fn to_posix(&self) -> u32 {
        let mut flags = self.access.to_posix();
        if self.create {
            flags |= O_CREAT;
        }
        if self.exclusive {
            flags |= O_EXCL;
        }
        if self.truncate {
            flags |= O_TRUNC;
        }
        if self.append {
            flags |= O_APPEND;
        }
        flags
    }

    /// Validate flag combinations
    #[must_use = "validation result must be checked"]
    pub fn validate(&self) -> Result<(), VfsError> {
        if self.truncate && !self.access.can_write() {
            return Err(VfsError::InvalidArgument(
                "truncate requires write access".into(),
            ));
        }
        Ok(())
    }
}

/// File open mode (permissions for newly created files)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenMode {
    #[serde(skip_serializing_if = "is_default", default)]
    pub permissions: Permissions,
}

impl OpenMode {
    #[inline]
    #[must_use]
    pub const fn new(mode: u32) -> Self {
        Self {
            permissions: Permissions::new(mode),
        }
    }
}

impl Default for OpenMode {
    fn default() -> Self {
        Self {
            permissions: Permissions::readwrite(),
        }
    }
}
