/*!
 * Core Module
 * Fundamental kernel types, limits, configuration and error handling
 */

pub mod config;
pub mod errno;
pub mod errors;
pub mod limits;
pub mod serde;
pub mod types;

// Re-export for convenience
pub use config::FileTableConfig;
pub use errors::*;
pub use types::*;
