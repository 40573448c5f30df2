/*!
 * Path Operations
 * Direct (handle-less) access used to seed and inspect the filesystem
 */

use std::path::Path;
use std::time::SystemTime;

use super::super::types::*;
use super::node::Node;
use super::MemFS;

impl MemFS {
    /// Check if a node exists
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        let path = self.normalize(path.as_ref());
        self.nodes.contains_key(&path)
    }

    /// Read entire file contents
    pub fn read(&self, path: impl AsRef<Path>) -> VfsResult<Vec<u8>> {
        let path = self.normalize(path.as_ref());
        match self.nodes.get(&path).map(|n| n.value().clone()) {
            Some(Node::File { data, .. }) => Ok(data.read().bytes.clone()),
            Some(Node::Directory { .. }) => Err(VfsError::IsADirectory(path.display().to_string())),
            Some(Node::Console(_)) => Err(VfsError::NotSupported(format!(
                "direct read of device: {}",
                path.display()
            ))),
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    /// Write entire file contents (create or overwrite)
    pub fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> VfsResult<()> {
        let path = self.normalize(path.as_ref());
        match self.nodes.get(&path).map(|n| n.value().clone()) {
            Some(Node::File {
                data: existing,
                permissions,
                ..
            }) => {
                if permissions.is_readonly() {
                    return Err(VfsError::PermissionDenied(format!(
                        "file is readonly: {}",
                        path.display()
                    )));
                }
                let mut contents = existing.write();
                let old_len = contents.bytes.len();
                if data.len() > old_len {
                    self.check_and_reserve_space(data.len() - old_len)?;
                } else {
                    self.release_space(old_len - data.len());
                }
                contents.bytes = data.to_vec();
                contents.modified = SystemTime::now();
                Ok(())
            }
            Some(Node::Directory { .. }) => Err(VfsError::IsADirectory(path.display().to_string())),
            Some(Node::Console(_)) => Err(VfsError::NotSupported(format!(
                "direct write to device: {}",
                path.display()
            ))),
            None => {
                self.check_and_reserve_space(data.len())?;
                let result = self.insert_node(&path, Node::new_file(data.to_vec(), Permissions::readwrite()));
                if result.is_err() {
                    self.release_space(data.len());
                }
                result
            }
        }
    }

    /// Create a single directory (parent must exist)
    pub fn create_dir(&self, path: impl AsRef<Path>) -> VfsResult<()> {
        let path = self.normalize(path.as_ref());
        if self.nodes.contains_key(&path) {
            return Err(VfsError::AlreadyExists(path.display().to_string()));
        }
        self.insert_node(
            &path,
            Node::Directory {
                children: Default::default(),
                permissions: Permissions::new(0o755),
                created: SystemTime::now(),
            },
        )
    }

    /// Remove a file or device node; open handles keep their contents
    ///
    /// A file's bytes stay counted against the capacity until its last open
    /// handle is closed.
    pub fn delete(&self, path: impl AsRef<Path>) -> VfsResult<()> {
        let path = self.normalize(path.as_ref());
        match self.nodes.get(&path).map(|n| n.value().clone()) {
            Some(Node::Directory { .. }) => Err(VfsError::IsADirectory(path.display().to_string())),
            Some(node) => {
                if let Node::File { data, .. } = &node {
                    data.write().unlink(&self.current_size);
                }
                self.nodes.remove(&path);
                self.remove_child(&path);
                Ok(())
            }
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    /// Replace the permissions of a regular file
    pub fn set_permissions(&self, path: impl AsRef<Path>, perms: Permissions) -> VfsResult<()> {
        let path = self.normalize(path.as_ref());
        match self.nodes.get_mut(&path) {
            Some(mut entry) => match entry.value_mut() {
                Node::File { permissions, .. } | Node::Directory { permissions, .. } => {
                    *permissions = perms;
                    Ok(())
                }
                Node::Console(_) => Err(VfsError::NotSupported(format!(
                    "permissions on device: {}",
                    path.display()
                ))),
            },
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    /// Get node metadata by path
    pub fn metadata(&self, path: impl AsRef<Path>) -> VfsResult<Metadata> {
        let path = self.normalize(path.as_ref());
        let node = self
            .nodes
            .get(&path)
            .map(|n| n.value().clone())
            .ok_or_else(|| VfsError::NotFound(path.display().to_string()))?;

        let file_type = node.file_type();
        Ok(match node {
            Node::File {
                data,
                permissions,
                created,
            } => {
                let contents = data.read();
                Metadata {
                    file_type,
                    size: contents.bytes.len() as u64,
                    permissions,
                    modified: contents.modified,
                    created,
                }
            }
            Node::Directory {
                permissions,
                created,
                ..
            } => Metadata {
                file_type,
                size: 0,
                permissions,
                modified: created,
                created,
            },
            Node::Console(_) => Metadata {
                file_type,
                size: 0,
                permissions: Permissions::new(0o620),
                modified: SystemTime::now(),
                created: SystemTime::UNIX_EPOCH,
            },
        })
    }
}
