/*!
 * File Handle Implementation
 * Backing handle for regular in-memory files
 */

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::super::traits::{Transfer, Vnode};
use super::super::types::*;
use super::node::SharedData;
use super::MemFS;
use crate::core::types::Offset;

/// In-memory regular file handle
#[derive(Debug)]
pub(super) struct MemVnode {
    fs: MemFS,
    path: PathBuf,
    data: SharedData,
    permissions: Permissions,
    created: SystemTime,
}

impl MemVnode {
    pub fn new(
        fs: MemFS,
        path: PathBuf,
        data: SharedData,
        permissions: Permissions,
        created: SystemTime,
    ) -> Self {
        Self {
            fs,
            path,
            data,
            permissions,
            created,
        }
    }
}

/// Convert a seek offset into a buffer index, rejecting negative positions
fn position(offset: Offset) -> VfsResult<usize> {
    if offset < 0 {
        return Err(VfsError::InvalidArgument(format!(
            "negative file offset {}",
            offset
        )));
    }
    usize::try_from(offset).map_err(|_| VfsError::FileTooLarge)
}

fn advance(offset: Offset, bytes: usize) -> VfsResult<Offset> {
    i64::try_from(bytes)
        .ok()
        .and_then(|n| offset.checked_add(n))
        .ok_or(VfsError::FileTooLarge)
}

impl Vnode for MemVnode {
    fn read_at(&mut self, offset: Offset, buf: &mut [u8]) -> VfsResult<Transfer> {
        let start = position(offset)?;
        let contents = self.data.read();

        if start >= contents.bytes.len() {
            return Ok(Transfer::new(0, offset));
        }

        let count = buf.len().min(contents.bytes.len() - start);
        buf[..count].copy_from_slice(&contents.bytes[start..start + count]);
        Ok(Transfer::new(count, advance(offset, count)?))
    }

    fn write_at(&mut self, offset: Offset, buf: &[u8]) -> VfsResult<Transfer> {
        let start = position(offset)?;
        let end = start.checked_add(buf.len()).ok_or(VfsError::FileTooLarge)?;
        let new_offset = advance(offset, buf.len())?;

        let mut contents = self.data.write();
        if end > contents.bytes.len() {
            // Writing past the end zero-fills the gap
            self.fs.check_and_reserve_space(end - contents.bytes.len())?;
            contents.bytes.resize(end, 0);
        }
        contents.bytes[start..end].copy_from_slice(buf);
        contents.modified = SystemTime::now();

        Ok(Transfer::new(buf.len(), new_offset))
    }

    fn stat(&self) -> VfsResult<Metadata> {
        let contents = self.data.read();
        Ok(Metadata {
            file_type: FileType::File,
            size: contents.bytes.len() as u64,
            permissions: self.permissions,
            modified: contents.modified,
            created: self.created,
        })
    }

    fn close(self: Box<Self>) -> VfsResult<()> {
        self.fs.release_handle(&self.path);
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
