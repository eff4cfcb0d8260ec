// src/discovery.rs

//! Builds the list of files to analyze, from a directory or a path-list file.

use crate::error::DiscoveryError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Upper bound on the number of files collected for one run
pub const MAX_FILES: usize = 10_000;

/// True when `name` ends with `extension` and is longer than it.
pub fn has_extension(name: &str, extension: &str) -> bool {
    name.len() > extension.len() && name.ends_with(extension)
}

/// Lists regular files in `dir`, descending into subdirectories only when
/// `recursive` is set. Results are sorted by path.
pub fn scan_directory(dir: &Path, extension: Option<&str>, recursive: bool) -> Result<Vec<PathBuf>, DiscoveryError> {
    std::fs::read_dir(dir).map_err(|source| DiscoveryError::OpenDirectory {
        path: dir.to_path_buf(),
        source,
    })?;
    debug!(dir = %dir.display(), ?extension, recursive, "scanning directory");

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "cannot inspect directory entry, skipping");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(extension) = extension {
            let name = entry.file_name().to_string_lossy();
            if !has_extension(&name, extension) {
                continue;
            }
        }

        files.push(entry.into_path());
        if files.len() >= MAX_FILES {
            warn!(max = MAX_FILES, "maximum file count reached, truncating list");
            break;
        }
    }

    debug!(count = files.len(), dir = %dir.display(), "found files");
    if files.is_empty() {
        return Err(DiscoveryError::NoMatchingFiles {
            path: dir.to_path_buf(),
        });
    }
    Ok(files)
}

/// Reads one path per line from `list`, ignoring blank lines.
pub fn read_file_list(list: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let file = File::open(list).map_err(|source| DiscoveryError::OpenList {
        path: list.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| DiscoveryError::ReadList {
            path: list.to_path_buf(),
            source,
        })?;
        let entry = line.trim_end_matches('\r');
        if entry.trim().is_empty() {
            continue;
        }

        files.push(PathBuf::from(entry));
        if files.len() >= MAX_FILES {
            warn!(max = MAX_FILES, "maximum file count reached, truncating list");
            break;
        }
    }

    if files.is_empty() {
        return Err(DiscoveryError::EmptyList {
            path: list.to_path_buf(),
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn extension_must_be_a_proper_suffix() {
        assert!(has_extension("app.log", ".log"));
        assert!(!has_extension(".log", ".log"));
        assert!(!has_extension("app.txt", ".log"));
    }

    #[test]
    fn directory_scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.log"), "b\n").unwrap();
        fs::write(dir.path().join("a.log"), "a\n").unwrap();
        fs::write(dir.path().join("c.txt"), "c\n").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/d.log"), "d\n").unwrap();

        let flat = scan_directory(dir.path(), Some(".log"), false).unwrap();
        assert_eq!(flat, vec![dir.path().join("a.log"), dir.path().join("b.log")]);

        let deep = scan_directory(dir.path(), Some(".log"), true).unwrap();
        assert_eq!(deep.len(), 3);
        assert!(deep.contains(&dir.path().join("nested/d.log")));

        let all = scan_directory(dir.path(), None, false).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_directory(dir.path(), None, true).unwrap_err();
        assert!(matches!(err, DiscoveryError::NoMatchingFiles { .. }));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_directory(&dir.path().join("gone"), None, false).unwrap_err();
        assert!(matches!(err, DiscoveryError::OpenDirectory { .. }));
    }

    #[test]
    fn file_list_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("files.txt");
        fs::write(&list, "one.txt\n\n   \r\ntwo.txt\r\nthree.txt").unwrap();
        let files = read_file_list(&list).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("one.txt"),
                PathBuf::from("two.txt"),
                PathBuf::from("three.txt")
            ]
        );
    }

    #[test]
    fn blank_file_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("files.txt");
        fs::write(&list, "\n\n").unwrap();
        assert!(matches!(
            read_file_list(&list).unwrap_err(),
            DiscoveryError::EmptyList { .. }
        ));
        assert!(matches!(
            read_file_list(&dir.path().join("missing")).unwrap_err(),
            DiscoveryError::OpenList { .. }
        ));
    }
}
