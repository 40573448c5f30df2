/*!
 * System Limits and Constants
 *
 * Configuration-time capacities for the file tables. Runtime overrides go
 * through `FileTableConfig`; these are the defaults it starts from.
 */

// =============================================================================
// FILE TABLE LIMITS
// =============================================================================

/// Maximum simultaneously open files system-wide (open file table slots)
pub const MAX_OPEN_FILES: usize = 128;

/// Maximum descriptors per process (descriptor table slots)
pub const MAX_FDS_PER_PROCESS: usize = 128;

/// Minimum descriptor table size: stdin, stdout and stderr must fit
pub const MIN_FDS_PER_PROCESS: usize = 3;

// =============================================================================
// STANDARD STREAMS
// =============================================================================

/// Standard input descriptor
pub const STDIN_FILENO: i32 = 0;

/// Standard output descriptor
pub const STDOUT_FILENO: i32 = 1;

/// Standard error descriptor
pub const STDERR_FILENO: i32 = 2;

/// Console device path used for standard streams when nothing else is configured
pub const CONSOLE_PATH: &str = "con:";
