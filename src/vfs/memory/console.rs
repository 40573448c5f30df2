/*!
 * Console Device
 * Character device backing the standard streams
 */

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::super::traits::{Transfer, Vnode};
use super::super::types::*;
use super::MemFS;
use crate::core::types::Offset;

#[derive(Debug, Default)]
struct ConsoleState {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

/// Shared view of a console device: feed its input, inspect its output
#[derive(Debug, Clone, Default)]
pub struct ConsoleHandle {
    state: Arc<Mutex<ConsoleState>>,
}

impl ConsoleHandle {
    /// Queue bytes for subsequent reads
    pub fn push_input(&self, bytes: &[u8]) {
        self.state.lock().input.extend(bytes.iter().copied());
    }

    /// Everything written so far
    pub fn output(&self) -> Vec<u8> {
        self.state.lock().output.clone()
    }

    /// Drain everything written so far
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut self.state.lock().output)
    }
}

/// Open handle on a console device
///
/// Offsets are meaningless for a character device: reads consume queued
/// input, writes append to the output, and the returned offset simply
/// advances by the bytes moved.
#[derive(Debug)]
pub(super) struct ConsoleVnode {
    fs: MemFS,
    path: PathBuf,
    console: ConsoleHandle,
}

impl ConsoleVnode {
    pub fn new(fs: MemFS, path: PathBuf, console: ConsoleHandle) -> Self {
        Self { fs, path, console }
    }
}

impl Vnode for ConsoleVnode {
    fn read_at(&mut self, offset: Offset, buf: &mut [u8]) -> VfsResult<Transfer> {
        let mut state = self.console.state.lock();
        let count = buf.len().min(state.input.len());
        for (slot, byte) in buf.iter_mut().zip(state.input.drain(..count)) {
            *slot = byte;
        }
        Ok(Transfer::new(count, offset.saturating_add(count as i64)))
    }

    fn write_at(&mut self, offset: Offset, buf: &[u8]) -> VfsResult<Transfer> {
        self.console.state.lock().output.extend_from_slice(buf);
        Ok(Transfer::new(buf.len(), offset.saturating_add(buf.len() as i64)))
    }

    fn stat(&self) -> VfsResult<Metadata> {
        Ok(Metadata {
            file_type: FileType::CharDevice,
            size: 0,
            permissions: Permissions::new(0o620),
            modified: SystemTime::now(),
            created: SystemTime::UNIX_EPOCH,
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

impl MemFS {
    /// Install a console device at `path` and return a handle to it
    pub fn install_console(&self, path: impl AsRef<Path>) -> VfsResult<ConsoleHandle> {
        let path = self.normalize(path.as_ref());
        if self.nodes.contains_key(&path) {
            return Err(VfsError::AlreadyExists(path.display().to_string()));
        }
        let console = ConsoleHandle::default();
        self.insert_node(&path, super::node::Node::Console(console.clone()))?;
        Ok(console)
    }
}
