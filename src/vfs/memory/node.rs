/*!
 * Filesystem Node Types
 * Internal representation of files, directories and devices
 */

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use super::super::types::{FileType, Permissions};
use super::console::ConsoleHandle;

/// File contents shared by the node and every handle opened on it
#[derive(Debug)]
pub(in crate::vfs) struct FileData {
    pub bytes: Vec<u8>,
    pub modified: SystemTime,
    /// Space counter to credit once the last reference to an unlinked file drops
    unlinked: Option<Arc<AtomicUsize>>,
}

impl FileData {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            modified: SystemTime::now(),
            unlinked: None,
        }
    }

    /// Mark the contents as no longer reachable by path
    pub fn unlink(&mut self, used: &Arc<AtomicUsize>) {
        self.unlinked = Some(Arc::clone(used));
    }
}

impl Drop for FileData {
    fn drop(&mut self) {
        if let Some(used) = self.unlinked.take() {
            used.fetch_sub(self.bytes.len(), Ordering::SeqCst);
        }
    }
}

pub(in crate::vfs) type SharedData = Arc<RwLock<FileData>>;

/// In-memory filesystem node
#[derive(Debug, Clone)]
pub(in crate::vfs) enum Node {
    File {
        data: SharedData,
        permissions: Permissions,
        created: SystemTime,
    },
    Directory {
        children: HashMap<String, PathBuf>,
        permissions: Permissions,
        created: SystemTime,
    },
    Console(ConsoleHandle),
}

impl Node {
    pub fn new_file(bytes: Vec<u8>, permissions: Permissions) -> Self {
        Node::File {
            data: Arc::new(RwLock::new(FileData::new(bytes))),
            permissions,
            created: SystemTime::now(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }

    pub fn file_type(&self) -> FileType {
        match self {
            Node::File { .. } => FileType::File,
            Node::Directory { .. } => FileType::Directory,
            Node::Console(_) => FileType::CharDevice,
        }
    }
}
