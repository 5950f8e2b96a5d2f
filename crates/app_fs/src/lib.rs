//! LC-Finder file system layer
//!
//! Provides:
//! - Image folder scanning in natural order (file lists for the picture viewer)
//! - File operations: move to trash, permanent delete

mod browser;
mod file_operations;

pub use browser::{list_directory, scan_folder_of, FileEntry, FolderScan, ListOptions, IMAGE_EXTENSIONS};
pub use file_operations::{DefaultFileOperations, FileOpError, FileOperations};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
