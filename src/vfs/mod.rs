/*!
 * Virtual File System Module
 * Backing object abstraction consumed by the file tables
 */

pub mod memory;
pub mod traits;
pub mod types;

// Re-exports
pub use memory::{ConsoleHandle, MemFS};
pub use traits::{FileSystem, Transfer, Vnode};
pub use types::{
    AccessMode, FileType, Metadata, OpenFlags, OpenMode, Permissions, VfsError, VfsResult, O_ACCMODE,
    O_APPEND, O_CREAT, O_EXCL, O_RDONLY, O_RDWR, O_TRUNC, O_WRONLY,
};
