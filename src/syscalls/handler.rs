/*!
 * Syscall Handler Trait
 * Defines the interface for syscall handlers and handler registration
 */

use crate::core::types::Pid;
use super::types::{Syscall, SyscallResult};
use std::sync::Arc;

/// Trait for handling individual syscalls
pub trait SyscallHandler: Send + Sync {
    /// Handle a syscall, or return `None` if this handler does not serve it
    fn handle(&self, pid: Pid, syscall: &Syscall) -> Option<SyscallResult>;

    /// Get the name of this handler (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Registry for syscall handlers
///
/// Dispatch tries each handler in registration order.
#[derive(Clone, Default)]
pub struct SyscallHandlerRegistry {
    handlers: Vec<Arc<dyn SyscallHandler>>,
}

impl SyscallHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler in the registry
    pub fn register(mut self, handler: Arc<dyn SyscallHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Dispatch a syscall to the first handler that accepts it
    pub fn dispatch(&self, pid: Pid, syscall: &Syscall) -> Option<SyscallResult> {
        self.handlers
            .iter()
            .find_map(|handler| handler.handle(pid, syscall))
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}
