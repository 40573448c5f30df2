/*!
 * VFS Types
 * Shared types for backing object operations
 */

mod errors;
mod file_type;
mod metadata;
mod open_flags;
mod permissions;

pub use errors::{VfsError, VfsResult};
pub use file_type::FileType;
pub use metadata::Metadata;
pub use open_flags::{
    AccessMode, OpenFlags, OpenMode, O_ACCMODE, O_APPEND, O_CREAT, O_EXCL, O_RDONLY, O_RDWR,
    O_TRUNC, O_WRONLY,
};
pub use permissions::Permissions;
