//! Filesystem operations
//!
//! Handles directory creation and file metadata with typed errors.

use std::path::Path;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Size of a file in bytes
pub fn file_size(path: &Path) -> Result<u64, FilesystemError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|_| FilesystemError::FileSize {
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_dir_all_nested() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b").join("c");

        create_dir_all(&nested).unwrap();
        assert!(nested.is_dir());

        // creating an existing directory is a no-op
        create_dir_all(&nested).unwrap();
    }

    #[test]
    fn test_file_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("disk.img");
        std::fs::write(&path, [0u8; 1234]).unwrap();

        assert_eq!(file_size(&path).unwrap(), 1234);
    }

    #[test]
    fn test_file_size_missing_file() {
        let err = file_size(Path::new("/nonexistent/disk.img")).unwrap_err();
        assert!(matches!(err, FilesystemError::FileSize { .. }));
    }
}
