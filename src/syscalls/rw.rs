/*!
 * Read / Write / Seek Syscalls
 * Data transfer through the shared offset of an open file entry
 */

use tracing::{debug, trace};

use crate::core::types::{Fd, Offset, Pid};
use crate::files::{OpenFileEntry, TableError};
use crate::monitoring::SyscallSpan;

use super::fd::{FdManager, FileTables};
use super::types::{SyscallError, SyscallOutcome, Whence};

/// Resolve `fd` of `pid` to its open file entry
fn entry_mut(tables: &mut FileTables, pid: Pid, fd: Fd) -> SyscallOutcome<&mut OpenFileEntry> {
    let file = tables.descriptors(pid)?.resolve(fd)?;
    tables
        .open_files
        .get_mut(file)
        .ok_or(SyscallError::from(TableError::UnknownEntry(file)))
}

impl FdManager {
    /// Read up to `buf.len()` bytes at the shared offset
    ///
    /// Returns the byte count the backing layer produced; short reads are
    /// not retried.
    pub fn read(&self, pid: Pid, fd: Fd, buf: &mut [u8]) -> SyscallOutcome<usize> {
        let span = SyscallSpan::new("read", pid);
        span.record_fd(fd);
        let result = self.read_inner(pid, fd, buf);
        span.record_outcome(&result);
        result
    }

    fn read_inner(&self, pid: Pid, fd: Fd, buf: &mut [u8]) -> SyscallOutcome<usize> {
        let mut tables = self.tables.lock();
        let entry = entry_mut(&mut tables, pid, fd)?;

        if !entry.access().can_read() {
            return Err(SyscallError::bad_descriptor(format!("fd {} is not open for reading", fd)));
        }

        let offset = entry.offset();
        let transfer = entry.vnode_mut().read_at(offset, buf)?;
        entry.set_offset(transfer.offset);

        trace!(pid, fd, from = offset, to = transfer.offset, bytes = transfer.bytes, "read");
        Ok(transfer.bytes)
    }

    /// Write `buf` at the shared offset
    ///
    /// Entries opened with `O_APPEND` move the offset to the end of the
    /// backing object first.
    pub fn write(&self, pid: Pid, fd: Fd, buf: &[u8]) -> SyscallOutcome<usize> {
        let span = SyscallSpan::new("write", pid);
        span.record_fd(fd);
        let result = self.write_inner(pid, fd, buf);
        span.record_outcome(&result);
        result
    }

    fn write_inner(&self, pid: Pid, fd: Fd, buf: &[u8]) -> SyscallOutcome<usize> {
        let mut tables = self.tables.lock();
        let entry = entry_mut(&mut tables, pid, fd)?;

        if !entry.access().can_write() {
            return Err(SyscallError::bad_descriptor(format!("fd {} is not open for writing", fd)));
        }

        if entry.flags().append {
            let end = entry.vnode().stat()?.size_as_offset();
            entry.set_offset(end);
        }

        let offset = entry.offset();
        let transfer = entry.vnode_mut().write_at(offset, buf)?;
        entry.set_offset(transfer.offset);

        trace!(pid, fd, from = offset, to = transfer.offset, bytes = transfer.bytes, "write");
        Ok(transfer.bytes)
    }

    /// Reposition the shared offset
    ///
    /// `whence` is the raw origin selector. Negative results are stored as
    /// is; the backing layer decides whether to reject them on the next
    /// transfer.
    pub fn lseek(&self, pid: Pid, fd: Fd, offset: Offset, whence: i32) -> SyscallOutcome<Offset> {
        let span = SyscallSpan::new("lseek", pid);
        span.record_fd(fd);
        let result = self.lseek_inner(pid, fd, offset, whence);
        span.record_outcome(&result);
        result
    }

    fn lseek_inner(&self, pid: Pid, fd: Fd, offset: Offset, whence: i32) -> SyscallOutcome<Offset> {
        let mut tables = self.tables.lock();
        let entry = entry_mut(&mut tables, pid, fd)?;
        let whence = Whence::try_from(whence)?;

        let base = match whence {
            Whence::Set => 0,
            Whence::Current => entry.offset(),
            Whence::End => entry.vnode().stat()?.size_as_offset(),
        };
        let target = base.checked_add(offset).ok_or_else(|| {
            SyscallError::invalid_argument(format!("{} {:+} overflows the file offset", whence, offset))
        })?;

        entry.set_offset(target);
        debug!(pid, fd, %whence, offset, target, "lseek");
        Ok(target)
    }
}
