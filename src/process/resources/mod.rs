/*!
 * Resource Cleanup
 * Per-process resource teardown orchestration
 */

use crate::core::types::Pid;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Resource cleanup statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub resources_freed: usize,
    pub errors_encountered: usize,
    pub cleanup_duration_micros: u64,
    pub by_type: HashMap<String, usize>,
}

impl CleanupStats {
    /// Run `f` and stamp the elapsed time onto the stats it returns
    #[inline]
    pub fn with_timing<F>(f: F) -> Self
    where
        F: FnOnce() -> Self,
    {
        let start = Instant::now();
        let mut stats = f();
        stats.cleanup_duration_micros = start.elapsed().as_micros() as u64;
        stats
    }

    fn merge(&mut self, other: CleanupStats) {
        self.resources_freed += other.resources_freed;
        self.errors_encountered += other.errors_encountered;
        self.cleanup_duration_micros += other.cleanup_duration_micros;

        for (type_name, count) in other.by_type {
            *self.by_type.entry(type_name).or_insert(0) += count;
        }
    }
}

/// Per-process resource cleanup
pub trait ResourceCleanup: Send + Sync {
    /// Release everything `pid` owns
    fn cleanup(&self, pid: Pid) -> CleanupStats;

    /// Resource type name for logging
    fn resource_type(&self) -> &'static str;

    /// Whether `pid` currently owns anything of this type
    fn has_resources(&self, pid: Pid) -> bool;
}

/// Runs every registered cleanup for a terminating process
///
/// Resources are cleaned up in reverse registration order.
#[derive(Clone, Default)]
pub struct ResourceOrchestrator {
    resources: Vec<Arc<dyn ResourceCleanup>>,
}

impl ResourceOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource for cleanup (builder pattern)
    pub fn register(mut self, resource: Arc<dyn ResourceCleanup>) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn cleanup_process(&self, pid: Pid) -> CleanupResult {
        let overall_start = Instant::now();
        let mut total = CleanupStats::default();
        let mut errors = Vec::new();

        for resource in self.resources.iter().rev() {
            if !resource.has_resources(pid) {
                continue;
            }

            let resource_type = resource.resource_type();
            let mut stats = CleanupStats::with_timing(|| resource.cleanup(pid));
            stats
                .by_type
                .insert(resource_type.to_string(), stats.resources_freed);

            if stats.errors_encountered > 0 {
                warn!(pid, resource_type, errors = stats.errors_encountered, "cleanup reported errors");
                errors.push(format!(
                    "{}: {} errors during cleanup",
                    resource_type, stats.errors_encountered
                ));
            }

            info!(
                pid,
                resource_type,
                freed = stats.resources_freed,
                duration_us = stats.cleanup_duration_micros,
                "resources cleaned"
            );
            total.merge(stats);
        }

        total.cleanup_duration_micros = overall_start.elapsed().as_micros() as u64;

        CleanupResult {
            pid,
            stats: total,
            errors,
        }
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn registered_types(&self) -> Vec<&'static str> {
        self.resources.iter().map(|r| r.resource_type()).collect()
    }
}

/// Result of a cleanup operation
#[derive(Debug, Clone)]
pub struct CleanupResult {
    pub pid: Pid,
    pub stats: CleanupStats,
    pub errors: Vec<String>,
}

impl CleanupResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_freed_resources(&self) -> bool {
        self.stats.resources_freed > 0
    }
}

impl fmt::Display for CleanupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PID {} cleanup: {} resources freed, {} errors",
            self.pid,
            self.stats.resources_freed,
            self.errors.len()
        )
    }
}
