/*!
 * Shared fixtures for syscall tests
 */

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fdtable_kernel::core::types::Offset;
use fdtable_kernel::vfs::{
    FileSystem, Metadata, OpenFlags, OpenMode, Transfer, VfsError, VfsResult, Vnode,
};
use fdtable_kernel::{FdManager, FileTableConfig, MemFS};
use parking_lot::Mutex;

pub const PID: u32 = 1;
pub const CONSOLE: &str = "con:";

/// MemFS with a console and one bootstrapped process
pub fn setup() -> (FdManager, MemFS) {
    setup_with(FileTableConfig::default())
}

pub fn setup_with(config: FileTableConfig) -> (FdManager, MemFS) {
    let fs = MemFS::new();
    fs.install_console(CONSOLE).unwrap();
    let fds = FdManager::new(Arc::new(fs.clone()), config).unwrap();
    fds.create_process_table(PID, CONSOLE, CONSOLE, CONSOLE)
        .unwrap();
    (fds, fs)
}

pub fn p(path: &str) -> Option<&Path> {
    Some(Path::new(path))
}

/// Backing layer wrapper that fails on demand and counts I/O
#[derive(Clone, Default)]
pub struct FaultyFs {
    inner: MemFS,
    state: Arc<FaultState>,
}

#[derive(Default)]
pub struct FaultState {
    fail_open: Mutex<HashSet<PathBuf>>,
    fail_close: Mutex<HashSet<PathBuf>>,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub stats: AtomicUsize,
    pub closes: AtomicUsize,
}

impl FaultyFs {
    pub fn new(inner: MemFS) -> Self {
        Self {
            inner,
            state: Arc::default(),
        }
    }

    pub fn memfs(&self) -> &MemFS {
        &self.inner
    }

    pub fn state(&self) -> &FaultState {
        &self.state
    }

    pub fn fail_open(&self, path: &str) {
        self.state.fail_open.lock().insert(PathBuf::from(path));
    }

    pub fn fail_close(&self, path: &str) {
        self.state.fail_close.lock().insert(PathBuf::from(path));
    }

    pub fn io_count(&self) -> usize {
        self.state.reads.load(Ordering::SeqCst) + self.state.writes.load(Ordering::SeqCst)
    }
}

impl FileSystem for FaultyFs {
    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn Vnode>> {
        if self.state.fail_open.lock().contains(path) {
            return Err(VfsError::IoError(format!("injected open failure: {}", path.display())));
        }
        let inner = self.inner.open(path, flags, mode)?;
        Ok(Box::new(FaultyVnode {
            inner,
            name: path.to_path_buf(),
            state: self.state.clone(),
        }))
    }

    fn name(&self) -> &str {
        "faultyfs"
    }
}

#[derive(Debug)]
struct FaultyVnode {
    inner: Box<dyn Vnode>,
    name: PathBuf,
    state: Arc<FaultState>,
}

impl std::fmt::Debug for FaultState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultState").finish_non_exhaustive()
    }
}

impl Vnode for FaultyVnode {
    fn read_at(&mut self, offset: Offset, buf: &mut [u8]) -> VfsResult<Transfer> {
        self.state.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_at(offset, buf)
    }

    fn write_at(&mut self, offset: Offset, buf: &[u8]) -> VfsResult<Transfer> {
        self.state.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_at(offset, buf)
    }

    fn stat(&self) -> VfsResult<Metadata> {
        self.state.stats.fetch_add(1, Ordering::SeqCst);
        self.inner.stat()
    }

    fn close(self: Box<Self>) -> VfsResult<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        let fail = self.state.fail_close.lock().contains(&self.name);
        self.inner.close()?;
        if fail {
            return Err(VfsError::IoError(format!(
                "injected close failure: {}",
                self.name.display()
            )));
        }
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.name
    }
}

/// Faulty backing layer with a console and one bootstrapped process
pub fn faulty_setup() -> (FdManager, FaultyFs) {
    let memfs = MemFS::new();
    memfs.install_console(CONSOLE).unwrap();
    let fs = FaultyFs::new(memfs);
    let fds = FdManager::new(Arc::new(fs.clone()), FileTableConfig::default()).unwrap();
    fds.create_process_table(PID, CONSOLE, CONSOLE, CONSOLE)
        .unwrap();
    (fds, fs)
}
