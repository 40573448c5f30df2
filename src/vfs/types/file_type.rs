/*!
 * VFS File Type Enum
 * Kinds of backing objects a vnode can refer to
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backing object type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    File,
    Directory,
    #[serde(rename = "char_device")]
    CharDevice,
    #[default]
    Unknown,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FileType::File => write!(f, "file"),
            FileType::Directory => write!(f, "directory"),
            FileType::CharDevice => write!(f, "char device"),
            FileType::Unknown => write!(f, "unknown"),
        }
    }
}
