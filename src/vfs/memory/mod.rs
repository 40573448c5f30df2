/*!
 * In-Memory Filesystem Backend
 * Volatile backing layer for tests, benchmarks and the demo kernel
 */

mod console;
mod file_handle;
mod file_ops;
mod node;

use ahash::RandomState;
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::trace;

use super::traits::{FileSystem, Vnode};
use super::types::*;
use node::Node;

pub use console::ConsoleHandle;
use console::ConsoleVnode;
use file_handle::MemVnode;

/// In-memory filesystem implementation
///
/// Cloning is cheap and yields a view of the same filesystem.
#[derive(Debug, Clone)]
pub struct MemFS {
    pub(super) nodes: Arc<DashMap<PathBuf, Node, RandomState>>,
    /// Live backing handles per path
    pub(super) handles: Arc<DashMap<PathBuf, usize, RandomState>>,
    pub(super) max_size: Option<usize>,
    pub(super) current_size: Arc<AtomicUsize>,
}

impl MemFS {
    /// Create new in-memory filesystem
    pub fn new() -> Self {
        let nodes = DashMap::with_hasher(RandomState::new());

        nodes.insert(
            PathBuf::from("/"),
            Node::Directory {
                children: HashMap::default(),
                permissions: Permissions::new(0o755),
                created: SystemTime::now(),
            },
        );

        Self {
            nodes: Arc::new(nodes),
            handles: Arc::new(DashMap::with_hasher(RandomState::new())),
            max_size: None,
            current_size: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create with size limit
    pub fn with_capacity(max_size: usize) -> Self {
        let mut fs = Self::new();
        fs.max_size = Some(max_size);
        fs
    }

    /// Number of backing handles currently open on `path`
    pub fn open_handle_count(&self, path: impl AsRef<Path>) -> usize {
        let path = self.normalize(path.as_ref());
        self.handles.get(&path).map(|count| *count).unwrap_or(0)
    }

    /// Total backing handles currently open
    pub fn total_open_handles(&self) -> usize {
        self.handles.iter().map(|entry| *entry.value()).sum()
    }

    /// Normalize path (make absolute and clean)
    pub(super) fn normalize(&self, path: &Path) -> PathBuf {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new("/").join(path)
        };

        PathBuf::from(path_clean::clean(&path))
    }

    /// Check if space is available and reserve it atomically
    pub(super) fn check_and_reserve_space(&self, additional: usize) -> VfsResult<()> {
        if let Some(max) = self.max_size {
            self.current_size
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                    current
                        .checked_add(additional)
                        .filter(|&total| total <= max)
                })
                .map_err(|_| VfsError::OutOfSpace)?;
        } else {
            self.current_size.fetch_add(additional, Ordering::SeqCst);
        }
        Ok(())
    }

    /// Return space previously reserved
    pub(super) fn release_space(&self, amount: usize) {
        self.current_size.fetch_sub(amount, Ordering::SeqCst);
    }

    /// Bytes currently stored in regular files
    pub fn used_space(&self) -> usize {
        self.current_size.load(Ordering::SeqCst)
    }

    pub(super) fn acquire_handle(&self, path: &Path) {
        *self.handles.entry(path.to_path_buf()).or_insert(0) += 1;
    }

    pub(super) fn release_handle(&self, path: &Path) {
        let remaining = self.handles.get_mut(path).map(|mut count| {
            *count = count.saturating_sub(1);
            *count
        });
        if remaining == Some(0) {
            self.handles.remove_if(path, |_, count| *count == 0);
        }
        trace!(path = %path.display(), remaining = remaining.unwrap_or(0), "backing handle released");
    }

    /// Get file name from path
    pub(super) fn file_name(&self, path: &Path) -> VfsResult<String> {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| VfsError::InvalidPath(format!("invalid path: {}", path.display())))
    }

    /// Ensure parent directory exists
    pub(super) fn ensure_parent(&self, path: &Path) -> VfsResult<()> {
        if let Some(parent) = path.parent() {
            match self.nodes.get(parent) {
                Some(node) if node.is_dir() => {}
                Some(_) => return Err(VfsError::NotADirectory(parent.display().to_string())),
                None => {
                    return Err(VfsError::NotFound(format!(
                        "parent directory not found: {}",
                        parent.display()
                    )))
                }
            }
        }
        Ok(())
    }

    /// Link `child_path` into its parent directory and insert the node
    pub(super) fn insert_node(&self, child_path: &Path, node: Node) -> VfsResult<()> {
        self.ensure_parent(child_path)?;
        let name = self.file_name(child_path)?;
        let parent = child_path
            .parent()
            .ok_or_else(|| VfsError::InvalidPath(child_path.display().to_string()))?;

        match self.nodes.get_mut(parent) {
            Some(mut entry) => match entry.value_mut() {
                Node::Directory { children, .. } => {
                    children.insert(name, child_path.to_path_buf());
                }
                _ => return Err(VfsError::NotADirectory(parent.display().to_string())),
            },
            None => return Err(VfsError::NotFound(parent.display().to_string())),
        }

        self.nodes.insert(child_path.to_path_buf(), node);
        Ok(())
    }

    /// Unlink `child_path` from its parent directory
    pub(super) fn remove_child(&self, child_path: &Path) {
        let (Some(parent), Ok(name)) = (child_path.parent(), self.file_name(child_path)) else {
            return;
        };
        if let Some(mut entry) = self.nodes.get_mut(parent) {
            if let Node::Directory { children, .. } = entry.value_mut() {
                children.remove(&name);
            }
        }
    }

    fn create_file(&self, path: &Path, permissions: Permissions) -> VfsResult<Node> {
        let node = Node::new_file(Vec::new(), permissions);
        self.insert_node(path, node.clone())?;
        Ok(node)
    }

    /// Handle for `node`; the creating open is exempt from the mode it just set
    fn vnode_for(&self, path: PathBuf, node: Node, flags: OpenFlags, fresh: bool) -> VfsResult<Box<dyn Vnode>> {
        match node {
            Node::File {
                data,
                permissions,
                created,
            } => {
                if !fresh && flags.access.can_write() && permissions.is_readonly() {
                    return Err(VfsError::PermissionDenied(format!(
                        "file is readonly: {}",
                        path.display()
                    )));
                }
                if flags.truncate {
                    let mut contents = data.write();
                    let freed = contents.bytes.len();
                    contents.bytes.clear();
                    contents.modified = SystemTime::now();
                    self.release_space(freed);
                }
                Ok(Box::new(MemVnode::new(
                    self.clone(),
                    path,
                    data,
                    permissions,
                    created,
                )))
            }
            Node::Directory { .. } => Err(VfsError::IsADirectory(path.display().to_string())),
            Node::Console(console) => Ok(Box::new(ConsoleVnode::new(self.clone(), path, console))),
        }
    }
}

impl FileSystem for MemFS {
    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn Vnode>> {
        flags.validate()?;
        let path = self.normalize(path);

        let existing = self.nodes.get(&path).map(|node| node.value().clone());
        let (node, fresh) = match existing {
            Some(_) if flags.create && flags.exclusive => {
                return Err(VfsError::AlreadyExists(path.display().to_string()))
            }
            Some(node) => (node, false),
            None if flags.create => (self.create_file(&path, mode.permissions)?, true),
            None => return Err(VfsError::NotFound(path.display().to_string())),
        };

        let vnode = self.vnode_for(path.clone(), node, flags, fresh)?;
        self.acquire_handle(&path);
        trace!(path = %path.display(), ?flags, "backing handle opened");
        Ok(vnode)
    }

    fn name(&self) -> &str {
        "memfs"
    }
}

impl Default for MemFS {
    fn default() -> Self {
        Self::new()
    }
}
