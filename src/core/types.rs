/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process ID type
pub type Pid = u32;

/// File descriptor type
///
/// Signed so that syscall arguments outside the table (including negative
/// values) can be carried to the descriptor table and rejected there.
pub type Fd = i32;

/// Byte offset within a backing object
pub type Offset = i64;

/// Common result type for kernel operations
pub type KernelResult<T> = Result<T, super::errors::KernelError>;
