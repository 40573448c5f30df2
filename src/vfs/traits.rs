/*!
 * VFS Traits
 * The backing object layer the file tables delegate I/O to
 */

use std::fmt;
use std::path::Path;

use super::types::*;
use crate::core::types::Offset;

/// Outcome of a positioned transfer: bytes moved and the offset after the move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub bytes: usize,
    pub offset: Offset,
}

impl Transfer {
    #[inline]
    #[must_use]
    pub const fn new(bytes: usize, offset: Offset) -> Self {
        Self { bytes, offset }
    }
}

/// Virtual filesystem trait
///
/// Resolves names to backing handles. Implementations may block.
pub trait FileSystem: Send + Sync {
    /// Open (or create) the named object and return an exclusively owned handle
    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn Vnode>>;

    /// Get filesystem name/type
    fn name(&self) -> &str;
}

/// Backing handle trait
///
/// One handle per successful open. The open file table owns it and hands it
/// back through [`Vnode::close`] exactly once; dropping a handle without
/// closing it skips whatever the backend does on close.
pub trait Vnode: Send + fmt::Debug {
    /// Read up to `buf.len()` bytes starting at `offset`
    fn read_at(&mut self, offset: Offset, buf: &mut [u8]) -> VfsResult<Transfer>;

    /// Write `buf` starting at `offset`
    fn write_at(&mut self, offset: Offset, buf: &[u8]) -> VfsResult<Transfer>;

    /// Current metadata of the backing object
    fn stat(&self) -> VfsResult<Metadata>;

    /// Release the backing object
    fn close(self: Box<Self>) -> VfsResult<()>;

    /// Name the handle was opened with
    fn path(&self) -> &Path;
}
