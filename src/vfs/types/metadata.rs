/*!
 * VFS Metadata
 * Stat results for backing objects
 */

use super::file_type::FileType;
use super::permissions::Permissions;
use crate::core::serde::{is_default, is_zero_u64, system_time_micros};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Backing object metadata
///
/// Timestamps are serialized as microseconds since UNIX epoch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Metadata {
    pub file_type: FileType,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub size: u64,
    #[serde(skip_serializing_if = "is_default", default)]
    pub permissions: Permissions,
    #[serde(with = "system_time_micros")]
    pub modified: SystemTime,
    #[serde(with = "system_time_micros")]
    pub created: SystemTime,
}

impl Metadata {
    #[inline]
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.file_type, FileType::File)
    }

    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }

    /// Size as a seek offset, saturating for objects beyond `i64::MAX`
    #[inline]
    #[must_use]
    pub fn size_as_offset(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }
}
