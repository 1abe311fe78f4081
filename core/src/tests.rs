use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use testdir::testdir;
use walkdir::WalkDir;

static NEXT_TREE: AtomicUsize = AtomicUsize::new(0);

/// Fresh scratch directory, unique across the test binary.
pub fn tmpdir() -> PathBuf {
    let index = NEXT_TREE.fetch_add(1, Ordering::Relaxed);
    let path = testdir!().join(format!("tree-{}", index));
    fs::create_dir_all(&path).unwrap();
    path
}

/// Build a tree from declarative entries. A path ending with '/' is a
/// folder, anything else is a file with the given content. Parent
/// folders are created as needed.
pub fn write_tree(root: &Path, entries: &[(&str, &str)]) {
    for (raw_path, content) in entries {
        let absolute_path = root.join(raw_path);
        if raw_path.ends_with('/') {
            fs::create_dir_all(&absolute_path).unwrap();
        } else {
            if let Some(parent) = absolute_path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&absolute_path, content).unwrap();
        }
    }
}

/// Sorted relative paths of everything under `root`, folders suffixed
/// with '/'.
pub fn disk_files(root: &Path) -> Vec<String> {
    let mut paths = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let mut path = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .display()
                .to_string();
            if entry.file_type().is_dir() {
                path.push('/');
            }
            path
        })
        .collect::<Vec<String>>();
    paths.sort();
    paths
}

/// Sorted (relative path, content) pairs for every file under `root`.
pub fn disk_contents(root: &Path) -> Vec<(String, String)> {
    let mut contents = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| {
            let entry = entry.unwrap();
            if !entry.file_type().is_file() {
                return None;
            }
            let path = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .display()
                .to_string();
            let content = fs::read_to_string(entry.path()).unwrap();
            Some((path, content))
        })
        .collect::<Vec<(String, String)>>();
    contents.sort();
    contents
}
