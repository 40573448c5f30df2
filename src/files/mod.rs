/*!
 * File Tables
 *
 * The two registries behind every descriptor syscall:
 * - Open file table: system-wide, reference counted, owns backing handles
 * - Descriptor table: per process, maps small integers to open file entries
 *
 * Neither table locks internally. Callers hold the single table lock
 * (see `syscalls::FdManager`) across every access.
 */

pub mod descriptor_table;
pub mod open_file;
pub mod open_file_table;

pub use descriptor_table::{DescriptorEntry, DescriptorTable};
pub use open_file::{OpenFileEntry, OpenFileId};
pub use open_file_table::{OpenFileTable, Released};

use crate::core::types::Fd;
use crate::vfs::VfsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which table an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    OpenFiles,
    Descriptors,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableKind::OpenFiles => write!(f, "open file table"),
            TableKind::Descriptors => write!(f, "descriptor table"),
        }
    }
}

/// File table errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("bad file descriptor {0}")]
    BadDescriptor(Fd),

    #[error("{table} is full ({capacity} slots)")]
    Exhausted { table: TableKind, capacity: usize },

    #[error("out of memory allocating {0}")]
    OutOfMemory(TableKind),

    #[error("no live open file entry {0}")]
    UnknownEntry(OpenFileId),

    #[error("closing backing object failed: {0}")]
    Close(#[from] VfsError),
}

/// Reserve exactly `capacity` empty slots, reporting allocation failure
pub(crate) fn empty_slots<T>(capacity: usize, table: TableKind) -> Result<Vec<Option<T>>, TableError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| TableError::OutOfMemory(table))?;
    slots.resize_with(capacity, || None);
    Ok(slots)
}
