/*!
 * Open File Entry
 * Shared open-file state referenced by one or more descriptors
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::core::types::Offset;
use crate::vfs::{AccessMode, OpenFlags, Vnode};

/// Slot number of an entry in the open file table
///
/// Ids are only handed out for live entries and a slot is not reused while
/// any descriptor still holds its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpenFileId(usize);

impl OpenFileId {
    #[inline]
    pub(crate) const fn new(slot: usize) -> Self {
        Self(slot)
    }

    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.0
    }
}

impl fmt::Display for OpenFileId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "of#{}", self.0)
    }
}

/// One open of a backing object
///
/// The offset is shared by every descriptor referencing this entry, so
/// descriptors produced by dup2 move together while independent opens of
/// the same path do not.
#[derive(Debug)]
pub struct OpenFileEntry {
    vnode: Box<dyn Vnode>,
    refcount: usize,
    flags: OpenFlags,
    offset: Offset,
}

impl OpenFileEntry {
    pub(crate) fn new(vnode: Box<dyn Vnode>, flags: OpenFlags) -> Self {
        Self {
            vnode,
            refcount: 1,
            flags,
            offset: 0,
        }
    }

    /// Number of descriptors referencing this entry (always >= 1 while live)
    #[inline]
    pub fn refcount(&self) -> usize {
        self.refcount
    }

    #[inline]
    pub fn access(&self) -> AccessMode {
        self.flags.access
    }

    #[inline]
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    #[inline]
    pub fn offset(&self) -> Offset {
        self.offset
    }

    #[inline]
    pub fn set_offset(&mut self, offset: Offset) {
        self.offset = offset;
    }

    /// Name the backing handle was opened with
    pub fn path(&self) -> &Path {
        self.vnode.path()
    }

    pub fn vnode(&self) -> &dyn Vnode {
        self.vnode.as_ref()
    }

    pub fn vnode_mut(&mut self) -> &mut dyn Vnode {
        self.vnode.as_mut()
    }

    pub(crate) fn retain(&mut self) -> usize {
        self.refcount += 1;
        self.refcount
    }

    /// Drop one reference; returns the count left
    pub(crate) fn drop_ref(&mut self) -> usize {
        self.refcount = self.refcount.saturating_sub(1);
        self.refcount
    }

    pub(crate) fn into_vnode(self) -> Box<dyn Vnode> {
        self.vnode
    }
}
