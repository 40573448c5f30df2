/*!
 * Property Tests
 * Descriptor numbering and reference accounting under random call sequences
 */

use crate::common::{setup_with, CONSOLE, PID};
use fdtable_kernel::vfs::{O_CREAT, O_RDWR};
use fdtable_kernel::FileTableConfig;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

const CAPACITY: i32 = 16;

#[derive(Debug, Clone)]
enum Op {
    Open(u8),
    Close(i32),
    Dup2(i32, i32),
}

const PATHS: [&str; 5] = [CONSOLE, "/p0", "/p1", "/p2", "/p3"];

/// Expected table state: each descriptor's open file, and each open file's
/// path and reference count
#[derive(Debug, Default)]
struct Model {
    bound: BTreeMap<i32, usize>,
    entries: HashMap<usize, (String, usize)>,
    next_entry: usize,
}

impl Model {
    fn bootstrapped() -> Self {
        let mut model = Self::default();
        for fd in 0..3 {
            model.open(fd, CONSOLE);
        }
        model
    }

    fn open(&mut self, fd: i32, path: &str) {
        let entry = self.next_entry;
        self.next_entry += 1;
        self.entries.insert(entry, (path.to_string(), 1));
        self.bound.insert(fd, entry);
    }

    fn close(&mut self, fd: i32) -> bool {
        let Some(entry) = self.bound.remove(&fd) else {
            return false;
        };
        if let Some((_, refs)) = self.entries.get_mut(&entry) {
            *refs -= 1;
            if *refs == 0 {
                self.entries.remove(&entry);
            }
        }
        true
    }

    fn dup2(&mut self, a: i32, b: i32) {
        self.close(b);
        let entry = self.bound[&a];
        if let Some((_, refs)) = self.entries.get_mut(&entry) {
            *refs += 1;
        }
        self.bound.insert(b, entry);
    }

    /// Opens of `path` not yet fully closed
    fn unclosed(&self, path: &str) -> usize {
        self.entries.values().filter(|(p, _)| p == path).count()
    }
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4).prop_map(Op::Open),
        (0..CAPACITY).prop_map(Op::Close),
        (0..CAPACITY, 0..CAPACITY).prop_map(|(a, b)| Op::Dup2(a, b)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_open_returns_lowest_free(ops in prop::collection::vec(op(), 1..60)) {
        let (fds, fs) = setup_with(FileTableConfig::with_capacities(64, CAPACITY as usize));
        let mut model = Model::bootstrapped();

        for op in ops {
            match op {
                Op::Open(n) => {
                    let path = format!("/p{n}");
                    let expected = (0..CAPACITY).find(|fd| !model.bound.contains_key(fd));
                    match fds.open(PID, Some(Path::new(&path)), O_RDWR | O_CREAT, 0o644) {
                        Ok(fd) => {
                            prop_assert_eq!(Some(fd), expected);
                            model.open(fd, &path);
                        }
                        Err(_) => prop_assert_eq!(expected, None),
                    }
                }
                Op::Close(fd) => {
                    let result = fds.close(PID, fd);
                    prop_assert_eq!(result.is_ok(), model.close(fd));
                }
                Op::Dup2(a, b) => {
                    let result = fds.dup2(PID, a, b);
                    let valid = a != b && model.bound.contains_key(&a);
                    prop_assert_eq!(result.is_ok(), valid);
                    if valid {
                        model.dup2(a, b);
                        prop_assert!(fds.shares_open_file(PID, a, b));
                    }
                }
            }

            prop_assert_eq!(fds.descriptor_count(PID), Some(model.bound.len()));
            prop_assert_eq!(fds.open_file_count(), model.entries.len());
            for path in PATHS {
                prop_assert_eq!(fs.open_handle_count(path), model.unclosed(path));
            }
        }

        fds.destroy_process_table(PID).unwrap();
        prop_assert_eq!(fs.total_open_handles(), 0);
        prop_assert_eq!(fds.open_file_count(), 0);
    }

    #[test]
    fn prop_refcount_matches_descriptors(targets in prop::collection::vec(3..CAPACITY, 1..20)) {
        let (fds, fs) = setup_with(FileTableConfig::with_capacities(64, CAPACITY as usize));
        let src = fds.open(PID, Some(Path::new("/src")), O_RDWR | O_CREAT, 0o644).unwrap();

        let mut sharing: BTreeSet<i32> = [src].into_iter().collect();
        for target in targets {
            if target == src {
                continue;
            }
            fds.dup2(PID, src, target).unwrap();
            sharing.insert(target);
            prop_assert_eq!(fds.refcount(PID, src), Some(sharing.len()));
        }

        for fd in sharing.iter().copied().collect::<Vec<_>>() {
            prop_assert_eq!(fs.open_handle_count("/src"), 1);
            fds.close(PID, fd).unwrap();
        }
        prop_assert_eq!(fs.open_handle_count("/src"), 0);
    }
}
