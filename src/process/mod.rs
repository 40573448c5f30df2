/*!
 * Process Lifecycle Support
 * Resource teardown hooks run when a process exits
 */

pub mod resources;

pub use resources::{CleanupResult, CleanupStats, ResourceCleanup, ResourceOrchestrator};
