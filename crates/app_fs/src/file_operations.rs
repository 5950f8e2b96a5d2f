//! File operations used by the viewer: move to trash or delete permanently

use std::path::{Path, PathBuf};
use thiserror::Error;

/// File operation errors
#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Trash error: {0}")]
    #[cfg(feature = "trash-support")]
    Trash(#[from] trash::Error),

    #[error("File not found: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, FileOpError>;

/// File operations trait
pub trait FileOperations: Send + Sync {
    /// Delete files (move to trash or permanent delete)
    fn delete(&self, paths: &[PathBuf], use_trash: bool) -> Result<()>;
}

/// Default implementation of file operations
#[derive(Debug, Default)]
pub struct DefaultFileOperations;

impl DefaultFileOperations {
    pub fn new() -> Self {
        Self
    }
}

impl FileOperations for DefaultFileOperations {
    #[cfg(feature = "trash-support")]
    fn delete(&self, paths: &[PathBuf], use_trash: bool) -> Result<()> {
        for path in paths {
            if !path.exists() {
                return Err(FileOpError::NotFound(path.clone()));
            }

            if use_trash {
                trash::delete(path)?;
                tracing::info!("Moved to trash: {}", path.display());
            } else {
                remove_path(path)?;
                tracing::warn!("Permanently deleted: {}", path.display());
            }
        }

        Ok(())
    }

    #[cfg(not(feature = "trash-support"))]
    fn delete(&self, paths: &[PathBuf], _use_trash: bool) -> Result<()> {
        // Fallback: always permanent delete
        for path in paths {
            if !path.exists() {
                return Err(FileOpError::NotFound(path.clone()));
            }
            remove_path(path)?;
            tracing::warn!("Permanently deleted: {}", path.display());
        }

        Ok(())
    }
}

fn remove_path(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_permanent_delete() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gone.png");
        fs::write(&file, b"test").unwrap();

        let ops = DefaultFileOperations::new();
        ops.delete(&[file.clone()], false).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_delete_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing.png");

        let ops = DefaultFileOperations::new();
        let err = ops.delete(&[file.clone()], false).unwrap_err();
        assert!(matches!(err, FileOpError::NotFound(p) if p == file));
    }

    #[test]
    fn test_trash_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let ops = DefaultFileOperations::new();
        assert!(ops.delete(&[dir.path().join("missing.png")], true).is_err());
    }
}
