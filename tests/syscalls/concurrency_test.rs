/*!
 * Concurrent Syscall Tests
 * Many threads across many processes sharing one set of tables
 */

use crate::common::{setup_with, CONSOLE};
use fdtable_kernel::vfs::{O_CREAT, O_RDWR};
use fdtable_kernel::FileTableConfig;
use std::path::PathBuf;
use std::sync::Barrier;
use std::sync::Arc;
use std::thread;

const THREADS: u32 = 8;
const ROUNDS: usize = 200;

#[test]
fn test_concurrent_open_close_across_processes() {
    let (fds, fs) = setup_with(FileTableConfig::with_capacities(256, 16));
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let fds = fds.clone();
            let barrier = barrier.clone();
            let pid = 100 + i;
            fds.create_process_table(pid, CONSOLE, CONSOLE, CONSOLE).unwrap();
            thread::spawn(move || {
                barrier.wait();
                let path = PathBuf::from(format!("/proc{pid}"));
                for round in 0..ROUNDS {
                    let fd = fds.open(pid, Some(&path), O_RDWR | O_CREAT, 0o644).unwrap();
                    // Nothing else runs in this process, so numbering is deterministic
                    assert_eq!(fd, 3, "round {round}");
                    fds.write(pid, fd, b"x").unwrap();
                    fds.close(pid, fd).unwrap();
                }
                pid
            })
        })
        .collect();

    for handle in handles {
        let pid = handle.join().unwrap();
        assert_eq!(fds.descriptor_count(pid), Some(3));
        fds.destroy_process_table(pid).unwrap();
    }

    // Only process 1's standard streams remain
    assert_eq!(fds.open_file_count(), 3);
    assert_eq!(fs.total_open_handles(), 3);
}

#[test]
fn test_concurrent_writes_through_shared_entry_never_overlap() {
    let (fds, fs) = setup_with(FileTableConfig::default());
    let fd = fds.open(1, Some(&PathBuf::from("/shared")), O_RDWR | O_CREAT, 0o644).unwrap();
    for target in 10..10 + THREADS as i32 {
        fds.dup2(1, fd, target).unwrap();
    }

    let handles: Vec<_> = (0..THREADS as i32)
        .map(|i| {
            let fds = fds.clone();
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    assert_eq!(fds.write(1, 10 + i, b"ab").unwrap(), 2);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let expected = THREADS as i64 * ROUNDS as i64 * 2;
    assert_eq!(fds.offset(1, fd), Some(expected));
    let data = fs.read("/shared").unwrap();
    assert_eq!(data.len() as i64, expected);
    assert!(data.chunks(2).all(|pair| pair == b"ab"));
}

#[test]
fn test_concurrent_closes_of_unrelated_entries() {
    let (fds, _fs) = setup_with(FileTableConfig::with_capacities(128, 128));
    let opened: Vec<_> = (0..64)
        .map(|i| {
            fds.open(1, Some(&PathBuf::from(format!("/u{i}"))), O_RDWR | O_CREAT, 0o644)
                .unwrap()
        })
        .collect();

    let handles: Vec<_> = opened
        .chunks(8)
        .map(|chunk| {
            let fds = fds.clone();
            let chunk = chunk.to_vec();
            thread::spawn(move || {
                for fd in chunk {
                    assert_eq!(fds.refcount(1, fd), Some(1));
                    fds.close(1, fd).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(fds.descriptor_count(1), Some(3));
    assert_eq!(fds.open_file_count(), 3);
}
