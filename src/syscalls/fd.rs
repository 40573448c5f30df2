/*!
 * File Descriptor Syscalls
 * open, close and dup2 over the shared file tables
 */

use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::config::FileTableConfig;
use crate::core::errors::KernelError;
use crate::core::types::{Fd, Offset, Pid};
use crate::files::{DescriptorTable, OpenFileTable, Released, TableKind};
use crate::monitoring::SyscallSpan;
use crate::vfs::{FileSystem, OpenFlags, OpenMode};

use super::types::{SyscallError, SyscallOutcome};

/// Everything the table lock protects
#[derive(Debug)]
pub(super) struct FileTables {
    pub(super) open_files: OpenFileTable,
    pub(super) processes: HashMap<Pid, DescriptorTable, RandomState>,
}

impl FileTables {
    pub(super) fn descriptors(&self, pid: Pid) -> SyscallOutcome<&DescriptorTable> {
        self.processes.get(&pid).ok_or(SyscallError::NoSuchProcess(pid))
    }

    pub(super) fn descriptors_mut(&mut self, pid: Pid) -> SyscallOutcome<&mut DescriptorTable> {
        self.processes
            .get_mut(&pid)
            .ok_or(SyscallError::NoSuchProcess(pid))
    }
}

/// File descriptor manager
///
/// Owns the system-wide open file table and every process's descriptor
/// table behind one lock. Backing I/O runs with the lock held, so all
/// descriptor syscalls are totally ordered. Clones share the same tables.
#[derive(Clone)]
pub struct FdManager {
    pub(super) tables: Arc<Mutex<FileTables>>,
    pub(super) fs: Arc<dyn FileSystem>,
    pub(super) config: FileTableConfig,
}

impl fmt::Debug for FdManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdManager")
            .field("fs", &self.fs.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FdManager {
    pub fn new(fs: Arc<dyn FileSystem>, config: FileTableConfig) -> Result<Self, KernelError> {
        config.validate()?;
        let open_files = OpenFileTable::with_capacity(config.max_open_files)?;

        info!(
            fs = fs.name(),
            max_open_files = config.max_open_files,
            max_descriptors = config.max_descriptors,
            "File descriptor manager initialized"
        );

        Ok(Self {
            tables: Arc::new(Mutex::new(FileTables {
                open_files,
                processes: HashMap::with_hasher(RandomState::new()),
            })),
            fs,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &FileTableConfig {
        &self.config
    }

    /// Open `path` and bind the lowest free descriptor of `pid` to it
    ///
    /// A `None` path is rejected as `BadDescriptor`. `flags` are POSIX open
    /// flags; an undefined access mode is `InvalidArgument`.
    pub fn open(&self, pid: Pid, path: Option<&Path>, flags: u32, mode: u32) -> SyscallOutcome<Fd> {
        let span = SyscallSpan::new("open", pid);
        let result = self.open_inner(pid, path, flags, mode);
        span.record_outcome(&result);
        if let Ok(fd) = result {
            span.record_fd(fd);
        }
        result
    }

    fn open_inner(&self, pid: Pid, path: Option<&Path>, flags: u32, mode: u32) -> SyscallOutcome<Fd> {
        let path = path.ok_or_else(|| SyscallError::bad_descriptor("null path"))?;
        let flags = OpenFlags::from_posix(flags).map_err(|e| SyscallError::invalid_argument(e.to_string()))?;

        let mut tables = self.tables.lock();
        self.open_locked(&mut tables, pid, path, flags, OpenMode::new(mode))
    }

    /// The open sequence proper; the caller holds the table lock
    pub(super) fn open_locked(
        &self,
        tables: &mut FileTables,
        pid: Pid,
        path: &Path,
        flags: OpenFlags,
        mode: OpenMode,
    ) -> SyscallOutcome<Fd> {
        let FileTables {
            open_files,
            processes,
        } = tables;
        let descriptors = processes
            .get_mut(&pid)
            .ok_or(SyscallError::NoSuchProcess(pid))?;

        // Admission: a full table must not create backing objects as a side effect
        if descriptors.is_full() {
            return Err(SyscallError::ResourceExhausted {
                table: TableKind::Descriptors,
                capacity: descriptors.capacity(),
            });
        }
        if open_files.is_full() {
            return Err(SyscallError::ResourceExhausted {
                table: TableKind::OpenFiles,
                capacity: open_files.capacity(),
            });
        }

        let vnode = self.fs.open(path, flags, mode)?;
        let file = open_files.allocate(vnode, flags)?;

        match descriptors.bind(file) {
            Ok(fd) => {
                info!(pid, fd, slot = file.slot(), path = %path.display(), access = ?flags.access, "opened");
                Ok(fd)
            }
            Err(e) => {
                if let Err(close_err) = open_files.release(file) {
                    warn!(pid, slot = file.slot(), error = %close_err, "rollback of open file entry failed");
                }
                Err(e.into())
            }
        }
    }

    /// Unbind `fd` and drop its reference on the open file
    pub fn close(&self, pid: Pid, fd: Fd) -> SyscallOutcome<()> {
        let span = SyscallSpan::new("close", pid);
        span.record_fd(fd);
        let result = {
            let mut tables = self.tables.lock();
            Self::close_locked(&mut tables, pid, fd).map(|_| ())
        };
        span.record_outcome(&result);
        result
    }

    /// The close contract; the caller holds the table lock
    pub(super) fn close_locked(tables: &mut FileTables, pid: Pid, fd: Fd) -> SyscallOutcome<Released> {
        let file = tables.descriptors_mut(pid)?.unbind(fd)?;
        let released = tables.open_files.release(file)?;
        debug!(pid, fd, slot = file.slot(), ?released, "closed");
        Ok(released)
    }

    /// Make `newfd` refer to the same open file as `oldfd`
    ///
    /// A bound `newfd` is closed first. Both descriptors then share one
    /// offset and access mode.
    pub fn dup2(&self, pid: Pid, oldfd: Fd, newfd: Fd) -> SyscallOutcome<Fd> {
        let span = SyscallSpan::new("dup2", pid);
        span.record_fd(oldfd);
        span.record_target_fd(newfd);
        let result = self.dup2_inner(pid, oldfd, newfd);
        span.record_outcome(&result);
        result
    }

    fn dup2_inner(&self, pid: Pid, oldfd: Fd, newfd: Fd) -> SyscallOutcome<Fd> {
        let mut tables = self.tables.lock();

        let descriptors = tables.descriptors(pid)?;
        descriptors.check_range(oldfd)?;
        descriptors.check_range(newfd)?;
        if oldfd == newfd {
            return Err(SyscallError::bad_descriptor(format!(
                "dup2 source and target are both fd {}",
                oldfd
            )));
        }
        let file = descriptors.resolve(oldfd)?;

        if descriptors.is_bound(newfd) {
            if let Err(e) = Self::close_locked(&mut tables, pid, newfd) {
                // The target is unbound even when its backing close failed
                warn!(pid, fd = newfd, error = %e, "closing dup2 target failed");
                return Err(SyscallError::OutOfMemory);
            }
        }

        let FileTables {
            open_files,
            processes,
        } = &mut *tables;
        let refcount = open_files.retain(file)?;
        let bound = processes
            .get_mut(&pid)
            .ok_or(SyscallError::NoSuchProcess(pid))
            .and_then(|descriptors| descriptors.bind_at(newfd, file).map_err(SyscallError::from));

        if let Err(e) = bound {
            if let Err(release_err) = open_files.release(file) {
                warn!(pid, slot = file.slot(), error = %release_err, "dropping dup2 reference failed");
            }
            return Err(e);
        }

        debug!(pid, oldfd, newfd, slot = file.slot(), refcount, "dup2");
        Ok(newfd)
    }

    /// Number of live open file entries system-wide
    pub fn open_file_count(&self) -> usize {
        self.tables.lock().open_files.len()
    }

    /// Number of bound descriptors in `pid`'s table
    pub fn descriptor_count(&self, pid: Pid) -> Option<usize> {
        self.tables.lock().processes.get(&pid).map(DescriptorTable::len)
    }

    /// Reference count of the open file behind `fd`
    pub fn refcount(&self, pid: Pid, fd: Fd) -> Option<usize> {
        let tables = self.tables.lock();
        let file = tables.processes.get(&pid)?.resolve(fd).ok()?;
        tables.open_files.get(file).map(|entry| entry.refcount())
    }

    /// Shared offset of the open file behind `fd`
    pub fn offset(&self, pid: Pid, fd: Fd) -> Option<Offset> {
        let tables = self.tables.lock();
        let file = tables.processes.get(&pid)?.resolve(fd).ok()?;
        tables.open_files.get(file).map(|entry| entry.offset())
    }

    /// Whether two descriptors of `pid` reference the same open file
    pub fn shares_open_file(&self, pid: Pid, a: Fd, b: Fd) -> bool {
        let tables = self.tables.lock();
        let Some(descriptors) = tables.processes.get(&pid) else {
            return false;
        };
        matches!(
            (descriptors.resolve(a), descriptors.resolve(b)),
            (Ok(x), Ok(y)) if x == y
        )
    }

    pub fn has_process_table(&self, pid: Pid) -> bool {
        self.tables.lock().processes.contains_key(&pid)
    }
}
