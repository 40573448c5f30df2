/*!
 * File Descriptor Syscall Handler
 * Decodes descriptor syscall requests and runs them on an FdManager
 */

use super::fd::FdManager;
use super::handler::SyscallHandler;
use super::types::{Syscall, SyscallError, SyscallResult};
use crate::core::types::Pid;

/// Handler for the descriptor syscalls
#[derive(Debug, Clone)]
pub struct FileDescriptorHandler {
    fds: FdManager,
}

impl FileDescriptorHandler {
    #[inline]
    pub fn new(fds: FdManager) -> Self {
        Self { fds }
    }

    #[inline]
    pub fn manager(&self) -> &FdManager {
        &self.fds
    }

    /// Run one request to completion
    pub fn execute(&self, pid: Pid, syscall: &Syscall) -> SyscallResult {
        match syscall {
            Syscall::Open { path, flags, mode } => {
                self.fds.open(pid, path.as_deref(), *flags, *mode).into()
            }
            Syscall::Close { fd } => match self.fds.close(pid, *fd) {
                Ok(()) => SyscallResult::success(),
                Err(e) => e.into(),
            },
            Syscall::Read { fd, len } => self.read(pid, *fd, *len),
            Syscall::Write { fd, data } => self.fds.write(pid, *fd, data).and_then(byte_count).into(),
            Syscall::Dup2 { oldfd, newfd } => self.fds.dup2(pid, *oldfd, *newfd).into(),
            Syscall::Lseek { fd, offset, whence } => self.fds.lseek(pid, *fd, *offset, *whence).into(),
        }
    }

    fn read(&self, pid: Pid, fd: i32, len: usize) -> SyscallResult {
        let mut buf = Vec::new();
        if buf.try_reserve_exact(len).is_err() {
            return SyscallError::OutOfMemory.into();
        }
        buf.resize(len, 0);

        match self.fds.read(pid, fd, &mut buf).and_then(|n| byte_count(n).map(|v| (n, v))) {
            Ok((n, value)) => {
                buf.truncate(n);
                SyscallResult::success_with_data(value, buf)
            }
            Err(e) => e.into(),
        }
    }
}

fn byte_count(n: usize) -> Result<i64, SyscallError> {
    i64::try_from(n).map_err(|_| SyscallError::invalid_argument(format!("transfer of {} bytes", n)))
}

impl SyscallHandler for FileDescriptorHandler {
    #[inline]
    fn handle(&self, pid: Pid, syscall: &Syscall) -> Option<SyscallResult> {
        Some(self.execute(pid, syscall))
    }

    fn name(&self) -> &'static str {
        "fd_handler"
    }
}
