/*!
 * open / close / read / write Tests
 */

use crate::common::{p, setup, setup_with, PID};
use fdtable_kernel::core::errno;
use fdtable_kernel::vfs::{O_APPEND, O_CREAT, O_EXCL, O_RDONLY, O_RDWR, O_TRUNC, O_WRONLY};
use fdtable_kernel::{FileTableConfig, SyscallError, TableKind, VfsError};
use pretty_assertions::assert_eq;

#[test]
fn test_scenario_open_write_seek_close() {
    let (fds, fs) = setup();

    let fd = fds.open(PID, p("A"), O_RDWR | O_CREAT, 0o644).unwrap();
    assert_eq!(fd, 3);
    assert_eq!(fds.write(PID, fd, b"0123456789").unwrap(), 10);
    assert_eq!(fds.offset(PID, fd), Some(10));
    assert_eq!(fds.lseek(PID, fd, 0, 1).unwrap(), 10);

    let before = fds.open_file_count();
    fds.close(PID, fd).unwrap();
    assert_eq!(fds.open_file_count(), before - 1);
    assert_eq!(fs.open_handle_count("A"), 0);
}

#[test]
fn test_lowest_free_descriptor_after_close() {
    let (fds, _fs) = setup();
    fds.close(PID, 1).unwrap();

    let fd = fds.open(PID, p("/x"), O_WRONLY | O_CREAT, 0o644).unwrap();
    assert_eq!(fd, 1);
    let fd = fds.open(PID, p("/y"), O_WRONLY | O_CREAT, 0o644).unwrap();
    assert_eq!(fd, 3);
}

#[test]
fn test_independent_opens_have_independent_offsets() {
    let (fds, fs) = setup();
    fs.write("/shared", b"abcdefgh").unwrap();

    let a = fds.open(PID, p("/shared"), O_RDONLY, 0).unwrap();
    let b = fds.open(PID, p("/shared"), O_RDONLY, 0).unwrap();
    assert!(!fds.shares_open_file(PID, a, b));

    let mut buf = [0u8; 4];
    fds.read(PID, a, &mut buf).unwrap();
    assert_eq!(&buf, b"abcd");
    fds.read(PID, b, &mut buf).unwrap();
    assert_eq!(&buf, b"abcd");
    assert_eq!(fs.open_handle_count("/shared"), 2);
}

#[test]
fn test_writes_visible_through_other_open() {
    let (fds, _fs) = setup();
    let w = fds.open(PID, p("/f"), O_WRONLY | O_CREAT, 0o644).unwrap();
    let r = fds.open(PID, p("/f"), O_RDONLY, 0).unwrap();

    fds.write(PID, w, b"ping").unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(fds.read(PID, r, &mut buf).unwrap(), 4);
    assert_eq!(&buf[..4], b"ping");
}

#[test]
fn test_read_write_mode_matrix() {
    let (fds, fs) = setup();
    fs.write("/m", b"data").unwrap();

    for (flags, can_read, can_write) in [
        (O_RDONLY, true, false),
        (O_WRONLY, false, true),
        (O_RDWR, true, true),
    ] {
        let fd = fds.open(PID, p("/m"), flags, 0).unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(fds.read(PID, fd, &mut buf).is_ok(), can_read, "read with flags {flags}");
        assert_eq!(fds.write(PID, fd, b"D").is_ok(), can_write, "write with flags {flags}");
        fds.close(PID, fd).unwrap();
    }
}

#[test]
fn test_undefined_access_mode_rejected() {
    let (fds, fs) = setup();
    let err = fds.open(PID, p("/z"), O_WRONLY | O_RDWR | O_CREAT, 0o644).unwrap_err();
    assert!(matches!(err, SyscallError::InvalidArgument(_)));
    assert!(!fs.exists("/z"));
}

#[test]
fn test_truncate_and_exclusive() {
    let (fds, fs) = setup();
    fs.write("/t", b"old contents").unwrap();

    let fd = fds.open(PID, p("/t"), O_WRONLY | O_TRUNC, 0).unwrap();
    assert_eq!(fs.read("/t").unwrap(), Vec::<u8>::new());
    fds.close(PID, fd).unwrap();

    let err = fds.open(PID, p("/t"), O_RDWR | O_CREAT | O_EXCL, 0).unwrap_err();
    assert!(matches!(err, SyscallError::Backing(VfsError::AlreadyExists(_))));
    assert_eq!(err.errno(), errno::EEXIST);

    let err = fds.open(PID, p("/t"), O_RDONLY | O_TRUNC, 0).unwrap_err();
    assert_eq!(err.errno(), errno::EINVAL);
}

#[test]
fn test_append_mode_shared_file() {
    let (fds, fs) = setup();
    let plain = fds.open(PID, p("/log"), O_WRONLY | O_CREAT, 0o644).unwrap();
    let append = fds.open(PID, p("/log"), O_WRONLY | O_APPEND, 0).unwrap();

    fds.write(PID, plain, b"aaaa").unwrap();
    fds.write(PID, append, b"bb").unwrap();
    assert_eq!(fds.offset(PID, append), Some(6));
    assert_eq!(fs.read("/log").unwrap(), b"aaaabb".to_vec());
}

#[test]
fn test_descriptor_range_is_strict() {
    let (fds, _fs) = setup_with(FileTableConfig::with_capacities(16, 8));
    for fd in [-1, 8, 9, i32::MAX, i32::MIN] {
        assert_eq!(fds.close(PID, fd).unwrap_err().errno(), errno::EBADF, "fd {fd}");
        let mut buf = [0u8; 1];
        assert_eq!(fds.read(PID, fd, &mut buf).unwrap_err().errno(), errno::EBADF);
    }
}

#[test]
fn test_descriptor_exhaustion_and_reuse() {
    let (fds, _fs) = setup_with(FileTableConfig::with_capacities(64, 6));
    let opened: Vec<_> = (0..3)
        .map(|i| fds.open(PID, p(&format!("/f{i}")), O_RDWR | O_CREAT, 0o644).unwrap())
        .collect();
    assert_eq!(opened, vec![3, 4, 5]);

    let err = fds.open(PID, p("/extra"), O_RDWR | O_CREAT, 0o644).unwrap_err();
    assert_eq!(
        err,
        SyscallError::ResourceExhausted {
            table: TableKind::Descriptors,
            capacity: 6
        }
    );

    fds.close(PID, 4).unwrap();
    assert_eq!(fds.open(PID, p("/extra"), O_RDWR | O_CREAT, 0o644).unwrap(), 4);
}

#[test]
fn test_open_file_table_is_system_wide() {
    let (fds, _fs) = setup_with(FileTableConfig::with_capacities(7, 8));
    fds.create_process_table(2, "con:", "con:", "con:").unwrap();
    assert_eq!(fds.open_file_count(), 6);

    fds.open(2, p("/only"), O_RDWR | O_CREAT, 0o644).unwrap();
    let err = fds.open(PID, p("/more"), O_RDWR | O_CREAT, 0o644).unwrap_err();
    assert_eq!(err.errno(), errno::ENFILE);
}

#[test]
fn test_zero_length_transfers() {
    let (fds, _fs) = setup();
    let fd = fds.open(PID, p("/e"), O_RDWR | O_CREAT, 0o644).unwrap();
    assert_eq!(fds.write(PID, fd, b"").unwrap(), 0);
    assert_eq!(fds.read(PID, fd, &mut []).unwrap(), 0);
    assert_eq!(fds.offset(PID, fd), Some(0));
}

#[test]
fn test_console_streams() {
    let fs = fdtable_kernel::MemFS::new();
    let console = fs.install_console("con:").unwrap();
    let fds = fdtable_kernel::FdManager::new(std::sync::Arc::new(fs), FileTableConfig::default()).unwrap();
    fds.create_process_table(PID, "con:", "con:", "con:").unwrap();

    console.push_input(b"typed");
    let mut buf = [0u8; 16];
    assert_eq!(fds.read(PID, 0, &mut buf).unwrap(), 5);
    assert_eq!(&buf[..5], b"typed");

    fds.write(PID, 1, b"out ").unwrap();
    fds.write(PID, 2, b"err").unwrap();
    assert_eq!(console.take_output(), b"out err".to_vec());
}
