//! Best-effort directory listing.

use std::fs;
use std::path::{Path, PathBuf};

/// List the immediate entries of `dir` in the order the OS returns them, or
/// by file name when `sorted` is set.
///
/// A directory that cannot be read, or an entry that fails mid-listing,
/// contributes nothing.
pub(crate) fn list_entries(dir: &Path, sorted: bool) -> Vec<PathBuf> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            log::debug!("Cannot list {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut entries: Vec<PathBuf> = read_dir
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                log::debug!("Skipping unreadable entry in {}: {e}", dir.display());
                None
            }
        })
        .collect();

    if sorted {
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }
    entries
}

/// The file name of `path` as UTF-8, if it has one.
pub(crate) fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_directory_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(list_entries(&tmp.path().join("absent"), false).is_empty());
    }

    #[test]
    fn a_file_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.jar");
        fs::write(&file, b"").unwrap();
        assert!(list_entries(&file, true).is_empty());
    }

    #[test]
    fn sorted_listing_orders_by_name() {
        let tmp = TempDir::new().unwrap();
        for name in ["c.jar", "a.jar", "b"] {
            fs::write(tmp.path().join(name), b"").unwrap();
        }
        let names: Vec<_> = list_entries(tmp.path(), true)
            .iter()
            .map(|p| file_name_str(p).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jar", "b", "c.jar"]);
    }
}
