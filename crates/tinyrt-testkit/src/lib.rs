//! Test utilities for tinyrt
//!
//! This crate provides shared testing utilities used across the tinyrt workspace.

pub mod env;
pub mod fixtures;

pub use env::{ENV_LOCK, with_isolated_env};
pub use fixtures::{
    ArchiveEntry, FakeRuntime, fake_interpreter_script, tar_gz_archive, zip_archive,
};

use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the current directory
///
/// All test scratch files end up in one gitignored location that is easy to
/// clean up manually.
///
/// # Panics
///
/// Panics if the current directory cannot be determined or `.tmp/` cannot
/// be created.
///
/// # Examples
///
/// ```rust
/// use tinyrt_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// let file_path = temp.path().join("test.txt");
/// std::fs::write(&file_path, "test data").unwrap();
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    try_temp_dir_in_workspace().expect("Failed to create temporary directory in .tmp/")
}

/// Alternative with Result for non-test code
pub fn try_temp_dir_in_workspace() -> std::io::Result<TempDir> {
    let workspace_root = std::env::current_dir()?;
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base)?;
    TempDir::new_in(&tmp_base)
}

/// Lists the file names directly inside `dir`, sorted
///
/// Returns an empty list when the directory does not exist.
pub fn list_dir(dir: &std::path::Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_in_workspace_is_under_tmp() {
        let temp = temp_dir_in_workspace();
        assert!(temp.path().exists());
        assert!(
            temp.path()
                .parent()
                .map(|p| p.ends_with(".tmp"))
                .unwrap_or(false)
        );
    }

    #[test]
    fn test_list_dir_missing_directory() {
        let temp = temp_dir_in_workspace();
        assert!(list_dir(&temp.path().join("missing")).is_empty());
    }

    #[test]
    fn test_list_dir_sorted() {
        let temp = temp_dir_in_workspace();
        std::fs::write(temp.path().join("b.txt"), "").unwrap();
        std::fs::write(temp.path().join("a.txt"), "").unwrap();
        assert_eq!(list_dir(temp.path()), vec!["a.txt", "b.txt"]);
    }
}
