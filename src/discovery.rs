//! File discovery for directories of SeaBASS files
//!
//! Walks a directory tree and collects every file carrying the requested
//! extension, in a stable sorted order.

use crate::constants::SEABASS_EXTENSION;
use crate::error::{Result, SeabassError};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Recursively collect files under `dir` whose extension is `extension`
///
/// The extension is compared without the leading dot and case-insensitively.
/// Results are sorted by path.
pub fn collect_file_paths(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let extension = extension.trim_start_matches('.');
    debug!("Searching for .{} files in: {}", extension, dir.display());

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|source| SeabassError::Discovery {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    debug!("Found {} .{} files under {}", files.len(), extension, dir.display());
    Ok(files)
}

/// Check if a path has the conventional `.sb` extension
pub fn is_seabass_file(path: &Path) -> bool {
    has_extension(path, SEABASS_EXTENSION)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to create a small cruise archive
    fn create_test_archive(temp_dir: &TempDir) -> PathBuf {
        let root = temp_dir.path().join("archive");

        let cruise1 = root.join("cruise1").join("archive");
        fs::create_dir_all(&cruise1).unwrap();
        fs::write(cruise1.join("b_002.sb"), "data").unwrap();
        fs::write(cruise1.join("a_001.sb"), "data").unwrap();

        let cruise2 = root.join("cruise2");
        fs::create_dir_all(&cruise2).unwrap();
        fs::write(cruise2.join("profile.SB"), "data").unwrap();
        fs::write(cruise2.join("readme.txt"), "notes").unwrap();

        root
    }

    #[test]
    fn test_collect_file_paths_recursive_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_test_archive(&temp_dir);

        let files = collect_file_paths(&root, "sb").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a_001.sb", "b_002.sb", "profile.SB"]);
        assert!(files.iter().all(|p| is_seabass_file(p)));
    }

    #[test]
    fn test_collect_with_dotted_extension() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_test_archive(&temp_dir);

        let files = collect_file_paths(&root, ".txt").unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_collect_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nowhere");

        match collect_file_paths(&missing, "sb").unwrap_err() {
            SeabassError::Discovery { path, .. } => assert_eq!(path, missing),
            other => panic!("Expected Discovery error, got {other:?}"),
        }
    }

    #[test]
    fn test_is_seabass_file() {
        assert!(is_seabass_file(Path::new("cruise.sb")));
        assert!(is_seabass_file(Path::new("/data/CRUISE.SB")));
        assert!(!is_seabass_file(Path::new("cruise.csv")));
        assert!(!is_seabass_file(Path::new("sb")));
    }
}
