/*!
 * Open File Table
 * System-wide registry of reference-counted open file entries
 */

use tracing::{debug, warn};

use super::open_file::{OpenFileEntry, OpenFileId};
use super::{empty_slots, TableError, TableKind};
use crate::vfs::{OpenFlags, Vnode};

/// Result of dropping one reference to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    /// Other descriptors still reference the entry
    Shared { remaining: usize },
    /// That was the last reference: backing handle closed, slot freed
    Closed,
}

/// Fixed-capacity arena of open file entries
///
/// Allocation scans for the first empty slot. The table owns every backing
/// handle it holds and closes it when the entry's count reaches zero.
#[derive(Debug)]
pub struct OpenFileTable {
    slots: Vec<Option<OpenFileEntry>>,
    live: usize,
}

impl OpenFileTable {
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Ok(Self {
            slots: empty_slots(capacity, TableKind::OpenFiles)?,
            live: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entries
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.live == self.slots.len()
    }

    /// Store a freshly opened handle with refcount 1 and offset 0
    ///
    /// Ownership of `vnode` passes to the table even on failure: when no
    /// slot is free the handle is closed before the error is returned.
    pub fn allocate(&mut self, vnode: Box<dyn Vnode>, flags: OpenFlags) -> Result<OpenFileId, TableError> {
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            let path = vnode.path().display().to_string();
            if let Err(e) = vnode.close() {
                warn!(path = %path, error = %e, "Closing rejected backing handle failed");
            }
            return Err(TableError::Exhausted {
                table: TableKind::OpenFiles,
                capacity: self.capacity(),
            });
        };

        debug!(slot, path = %vnode.path().display(), access = ?flags.access, "open file entry allocated");
        self.slots[slot] = Some(OpenFileEntry::new(vnode, flags));
        self.live += 1;
        Ok(OpenFileId::new(slot))
    }

    /// Add a reference (dup2); returns the new count
    pub fn retain(&mut self, id: OpenFileId) -> Result<usize, TableError> {
        let entry = self.get_mut(id).ok_or(TableError::UnknownEntry(id))?;
        let refcount = entry.retain();
        debug!(slot = id.slot(), refcount, "open file entry retained");
        Ok(refcount)
    }

    /// Drop a reference
    ///
    /// On the 1 -> 0 transition the slot is freed first and then the backing
    /// handle is closed; a close failure is returned but the slot stays free.
    pub fn release(&mut self, id: OpenFileId) -> Result<Released, TableError> {
        let slot = id.slot();
        let remaining = match self.slots.get_mut(slot) {
            Some(Some(entry)) => entry.drop_ref(),
            _ => return Err(TableError::UnknownEntry(id)),
        };

        if remaining > 0 {
            debug!(slot, remaining, "open file entry released (shared)");
            return Ok(Released::Shared { remaining });
        }

        let Some(entry) = self.slots[slot].take() else {
            return Err(TableError::UnknownEntry(id));
        };
        self.live -= 1;
        debug!(slot, path = %entry.path().display(), "open file entry destroyed");

        entry.into_vnode().close()?;
        Ok(Released::Closed)
    }

    pub fn get(&self, id: OpenFileId) -> Option<&OpenFileEntry> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: OpenFileId) -> Option<&mut OpenFileEntry> {
        self.slots.get_mut(id.slot()).and_then(Option::as_mut)
    }

    /// Live entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (OpenFileId, &OpenFileEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|e| (OpenFileId::new(slot), e)))
    }
}
