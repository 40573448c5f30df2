/*!
 * Process Descriptor Tables
 * Creation with standard streams, and teardown on exit
 */

use std::path::Path;
use tracing::{info, warn};

use crate::core::limits::{STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use crate::core::types::{Fd, Pid};
use crate::files::DescriptorTable;
use crate::monitoring::SyscallSpan;
use crate::process::{CleanupStats, ResourceCleanup};
use crate::vfs::{OpenFlags, OpenMode};

use super::fd::{FdManager, FileTables};
use super::types::{SyscallError, SyscallOutcome};

impl FdManager {
    /// Create `pid`'s descriptor table with descriptors 0, 1 and 2 bound to
    /// the given standard stream paths
    ///
    /// On any failure the streams already opened are closed and the table
    /// is removed, leaving no trace of the process.
    pub fn create_process_table(
        &self,
        pid: Pid,
        stdin: impl AsRef<Path>,
        stdout: impl AsRef<Path>,
        stderr: impl AsRef<Path>,
    ) -> SyscallOutcome<()> {
        let span = SyscallSpan::new("bootstrap", pid);
        let result = self.bootstrap(pid, [
            (STDIN_FILENO, stdin.as_ref(), OpenFlags::read_only()),
            (STDOUT_FILENO, stdout.as_ref(), OpenFlags::write_only()),
            (STDERR_FILENO, stderr.as_ref(), OpenFlags::write_only()),
        ]);
        span.record_outcome(&result);
        result
    }

    fn bootstrap(&self, pid: Pid, streams: [(Fd, &Path, OpenFlags); 3]) -> SyscallOutcome<()> {
        let mut tables = self.tables.lock();

        if tables.processes.contains_key(&pid) {
            return Err(SyscallError::invalid_argument(format!(
                "process {} already has a descriptor table",
                pid
            )));
        }
        let descriptors = DescriptorTable::with_capacity(self.config.max_descriptors)?;
        tables.processes.insert(pid, descriptors);

        for (expected, path, flags) in streams {
            let opened = self.open_locked(&mut tables, pid, path, flags, OpenMode::default());
            let failure = match opened {
                Ok(fd) if fd == expected => continue,
                Ok(fd) => SyscallError::bad_descriptor(format!(
                    "standard stream landed on fd {} instead of {}",
                    fd, expected
                )),
                Err(e) => e,
            };

            warn!(pid, fd = expected, path = %path.display(), error = %failure, "standard stream setup failed");
            match Self::teardown_locked(&mut tables, pid).and_then(Teardown::into_result) {
                Ok(_) => {}
                Err(e) => warn!(pid, error = %e, "rollback of partial process table failed"),
            }
            return Err(failure);
        }

        info!(pid, "process descriptor table created");
        Ok(())
    }

    /// Close every descriptor of `pid` and remove its table
    ///
    /// Keeps going past individual close failures and reports the first
    /// one. Returns the number of descriptors closed.
    pub fn destroy_process_table(&self, pid: Pid) -> SyscallOutcome<usize> {
        let span = SyscallSpan::new("teardown", pid);
        let result = self.teardown(pid).and_then(Teardown::into_result);
        span.record_outcome(&result);
        result
    }

    fn teardown(&self, pid: Pid) -> SyscallOutcome<Teardown> {
        let mut tables = self.tables.lock();
        Self::teardown_locked(&mut tables, pid)
    }

    fn teardown_locked(tables: &mut FileTables, pid: Pid) -> SyscallOutcome<Teardown> {
        let mut descriptors = tables
            .processes
            .remove(&pid)
            .ok_or(SyscallError::NoSuchProcess(pid))?;

        let mut report = Teardown::default();
        for entry in descriptors.drain() {
            match tables.open_files.release(entry.file()) {
                Ok(_) => report.closed += 1,
                Err(e) => {
                    warn!(pid, fd = entry.fd(), error = %e, "close during teardown failed");
                    report.failed += 1;
                    report.first_error.get_or_insert(SyscallError::from(e));
                }
            }
        }

        info!(pid, closed = report.closed, failed = report.failed, "process descriptor table destroyed");
        Ok(report)
    }
}

/// Outcome of tearing down one descriptor table
///
/// Failed closes still unbind their descriptor.
#[derive(Debug, Default)]
struct Teardown {
    closed: usize,
    failed: usize,
    first_error: Option<SyscallError>,
}

impl Teardown {
    fn into_result(self) -> SyscallOutcome<usize> {
        match self.first_error {
            Some(e) => Err(e),
            None => Ok(self.closed),
        }
    }
}

impl ResourceCleanup for FdManager {
    fn cleanup(&self, pid: Pid) -> CleanupStats {
        match self.teardown(pid) {
            Ok(report) => CleanupStats {
                resources_freed: report.closed + report.failed,
                errors_encountered: report.failed,
                ..Default::default()
            },
            Err(_) => CleanupStats::default(),
        }
    }

    fn resource_type(&self) -> &'static str {
        "file_descriptors"
    }

    fn has_resources(&self, pid: Pid) -> bool {
        self.has_process_table(pid)
    }
}
