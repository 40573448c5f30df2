/*!
 * Descriptor Table
 * Per-process map from descriptor numbers to open file entries
 */

use serde::{Deserialize, Serialize};

use super::open_file::OpenFileId;
use super::{empty_slots, TableError, TableKind};
use crate::core::types::Fd;

/// A bound descriptor: its number and the open file it references
///
/// The entry holds one counted reference on the open file; it does not own
/// the backing handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorEntry {
    fd: Fd,
    file: OpenFileId,
}

impl DescriptorEntry {
    #[inline]
    pub fn fd(&self) -> Fd {
        self.fd
    }

    #[inline]
    pub fn file(&self) -> OpenFileId {
        self.file
    }
}

/// Fixed-capacity descriptor table
///
/// Valid descriptors are `0..capacity`. New bindings take the lowest free
/// number.
#[derive(Debug)]
pub struct DescriptorTable {
    slots: Vec<Option<DescriptorEntry>>,
    bound: usize,
}

impl DescriptorTable {
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        // Every slot index must be representable as a descriptor
        let capacity = capacity.min(Fd::MAX as usize);
        Ok(Self {
            slots: empty_slots(capacity, TableKind::Descriptors)?,
            bound: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of bound descriptors
    #[inline]
    pub fn len(&self) -> usize {
        self.bound
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bound == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.bound == self.slots.len()
    }

    fn index(&self, fd: Fd) -> Result<usize, TableError> {
        usize::try_from(fd)
            .ok()
            .filter(|&slot| slot < self.slots.len())
            .ok_or(TableError::BadDescriptor(fd))
    }

    /// Fail with `BadDescriptor` unless `fd` is inside the table
    pub fn check_range(&self, fd: Fd) -> Result<(), TableError> {
        self.index(fd).map(|_| ())
    }

    /// Bind the lowest free descriptor to `file`
    pub fn bind(&mut self, file: OpenFileId) -> Result<Fd, TableError> {
        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(TableError::Exhausted {
                table: TableKind::Descriptors,
                capacity: self.capacity(),
            })?;

        let fd = slot as Fd;
        self.slots[slot] = Some(DescriptorEntry { fd, file });
        self.bound += 1;
        Ok(fd)
    }

    /// Bind exactly `fd`, which must be in range and currently empty
    pub fn bind_at(&mut self, fd: Fd, file: OpenFileId) -> Result<(), TableError> {
        let slot = self.index(fd)?;
        if self.slots[slot].is_some() {
            return Err(TableError::BadDescriptor(fd));
        }
        self.slots[slot] = Some(DescriptorEntry { fd, file });
        self.bound += 1;
        Ok(())
    }

    /// Remove a binding; the number is immediately reusable
    pub fn unbind(&mut self, fd: Fd) -> Result<OpenFileId, TableError> {
        let slot = self.index(fd)?;
        let entry = self.slots[slot].take().ok_or(TableError::BadDescriptor(fd))?;
        self.bound -= 1;
        Ok(entry.file)
    }

    pub fn resolve(&self, fd: Fd) -> Result<OpenFileId, TableError> {
        self.get(fd)
            .map(DescriptorEntry::file)
            .ok_or(TableError::BadDescriptor(fd))
    }

    pub fn get(&self, fd: Fd) -> Option<&DescriptorEntry> {
        let slot = self.index(fd).ok()?;
        self.slots[slot].as_ref()
    }

    pub fn is_bound(&self, fd: Fd) -> bool {
        self.get(fd).is_some()
    }

    /// Bound descriptors in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &DescriptorEntry> {
        self.slots.iter().flatten()
    }

    /// Unbind everything, returning the former bindings in ascending order
    pub fn drain(&mut self) -> Vec<DescriptorEntry> {
        let drained: Vec<_> = self.slots.iter_mut().filter_map(Option::take).collect();
        self.bound = 0;
        drained
    }
}
