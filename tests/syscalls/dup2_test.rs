/*!
 * dup2 Tests
 */

use crate::common::{faulty_setup, p, setup, PID};
use fdtable_kernel::core::errno;
use fdtable_kernel::vfs::{O_CREAT, O_RDONLY, O_RDWR, O_WRONLY};
use fdtable_kernel::SyscallError;
use pretty_assertions::assert_eq;
use std::sync::atomic::Ordering;

#[test]
fn test_dup2_shares_offset() {
    let (fds, _fs) = setup();
    let a = fds.open(PID, p("/shared"), O_RDWR | O_CREAT, 0o644).unwrap();
    let b = fds.dup2(PID, a, 7).unwrap();
    assert_eq!(b, 7);

    fds.write(PID, a, b"hello world").unwrap();
    assert_eq!(fds.offset(PID, b), Some(11));

    fds.lseek(PID, b, 6, 0).unwrap();
    let mut buf = [0u8; 5];
    assert_eq!(fds.read(PID, a, &mut buf).unwrap(), 5);
    assert_eq!(&buf, b"world");
}

#[test]
fn test_dup2_shares_access_mode() {
    let (fds, _fs) = setup();
    let ro = fds.open(PID, p("/r"), O_RDONLY | O_CREAT, 0o644).unwrap();
    fds.dup2(PID, ro, 5).unwrap();
    assert_eq!(fds.write(PID, 5, b"x").unwrap_err().errno(), errno::EBADF);
}

#[test]
fn test_dup2_closes_previous_target() {
    let (fds, fs) = setup();
    let a = fds.open(PID, p("/a"), O_RDWR | O_CREAT, 0o644).unwrap();
    let b = fds.open(PID, p("/b"), O_RDWR | O_CREAT, 0o644).unwrap();
    assert_eq!(fs.open_handle_count("/b"), 1);
    let entries = fds.open_file_count();

    fds.dup2(PID, a, b).unwrap();
    assert_eq!(fs.open_handle_count("/b"), 0);
    assert_eq!(fds.open_file_count(), entries - 1);
    assert_eq!(fds.refcount(PID, a), Some(2));
    assert!(fds.shares_open_file(PID, a, b));
}

#[test]
fn test_dup2_over_shared_target_only_drops_reference() {
    let (fds, fs) = setup();
    let a = fds.open(PID, p("/a"), O_RDWR | O_CREAT, 0o644).unwrap();
    let b = fds.open(PID, p("/b"), O_RDWR | O_CREAT, 0o644).unwrap();
    fds.dup2(PID, b, 9).unwrap();
    assert_eq!(fds.refcount(PID, b), Some(2));

    fds.dup2(PID, a, 9).unwrap();
    assert_eq!(fds.refcount(PID, b), Some(1));
    assert_eq!(fs.open_handle_count("/b"), 1);
}

#[test]
fn test_dup2_onto_standard_stream() {
    let (fds, fs) = setup();
    let log = fds.open(PID, p("/log"), O_WRONLY | O_CREAT, 0o644).unwrap();
    fds.dup2(PID, log, 1).unwrap();
    fds.close(PID, log).unwrap();

    fds.write(PID, 1, b"redirected").unwrap();
    assert_eq!(fs.read("/log").unwrap(), b"redirected".to_vec());
}

#[test]
fn test_dup2_rejects_same_and_out_of_range() {
    let (fds, _fs) = setup();
    let a = fds.open(PID, p("/a"), O_RDWR | O_CREAT, 0o644).unwrap();

    assert!(matches!(fds.dup2(PID, a, a), Err(SyscallError::BadDescriptor(_))));
    assert!(matches!(fds.dup2(PID, a, 128), Err(SyscallError::BadDescriptor(_))));
    assert!(matches!(fds.dup2(PID, a, -1), Err(SyscallError::BadDescriptor(_))));
    assert!(matches!(fds.dup2(PID, 200, a), Err(SyscallError::BadDescriptor(_))));
    assert_eq!(fds.refcount(PID, a), Some(1));
}

#[test]
fn test_dup2_unbound_source_keeps_target() {
    let (fds, fs) = setup();
    let b = fds.open(PID, p("/b"), O_RDWR | O_CREAT, 0o644).unwrap();

    assert_eq!(fds.dup2(PID, 50, b).unwrap_err().errno(), errno::EBADF);
    assert_eq!(fds.refcount(PID, b), Some(1));
    assert_eq!(fs.open_handle_count("/b"), 1);
}

#[test]
fn test_dup2_target_close_failure_reports_out_of_memory() {
    let (fds, fs) = faulty_setup();
    fs.fail_close("/b");
    let a = fds.open(PID, p("/a"), O_RDWR | O_CREAT, 0o644).unwrap();
    let b = fds.open(PID, p("/b"), O_RDWR | O_CREAT, 0o644).unwrap();

    let err = fds.dup2(PID, a, b).unwrap_err();
    assert_eq!(err, SyscallError::OutOfMemory);
    assert_eq!(err.errno(), errno::ENOMEM);

    // The target binding is gone and the source untouched
    assert_eq!(fds.refcount(PID, b), None);
    assert_eq!(fds.refcount(PID, a), Some(1));
    assert_eq!(fs.state().closes.load(Ordering::SeqCst), 1);
    assert_eq!(fs.memfs().open_handle_count("/b"), 0);
}
