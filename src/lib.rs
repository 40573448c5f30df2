/*!
 * File Descriptor Kernel Library
 * Open file table, per-process descriptor tables and the descriptor syscalls
 */

pub mod core;
pub mod files;
pub mod monitoring;
pub mod process;
pub mod syscalls;
pub mod vfs;

// Re-exports
pub use crate::core::{FileTableConfig, Fd, KernelError, KernelResult, Offset, Pid};
pub use files::{DescriptorTable, OpenFileTable, TableError, TableKind};
pub use monitoring::{init_tracing, SyscallSpan};
pub use process::{CleanupResult, CleanupStats, ResourceCleanup, ResourceOrchestrator};
pub use syscalls::{
    FdManager, FileDescriptorHandler, Syscall, SyscallError, SyscallHandler, SyscallHandlerRegistry,
    SyscallResult, Whence,
};
pub use vfs::{ConsoleHandle, FileSystem, MemFS, OpenFlags, Vnode, VfsError};
