//! Viewer error types

use thiserror::Error;

/// Main viewer error type
#[derive(Error, Debug)]
pub enum ViewerError {
    // ===== Recoverable Errors (notify user, continue) =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("File operation failed: {0}")]
    FileOperation(#[from] app_fs::FileOpError),

    // ===== Fatal Errors (viewer cannot run) =====
    #[error("Thread error: {0}")]
    Thread(String),
}

impl ViewerError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ViewerError::Thread(_))
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::FileNotFound(path) => format!("File not found: {}", path),
            ViewerError::UnsupportedFormat(ext) => format!("Unsupported format: {}", ext),
            ViewerError::ImageDecode(msg) => format!("Cannot load image: {}", msg),
            ViewerError::FileOperation(e) => format!("Cannot delete file: {}", e),
            _ => self.to_string(),
        }
    }
}

impl From<app_fs::FsError> for ViewerError {
    fn from(e: app_fs::FsError) -> Self {
        match e {
            app_fs::FsError::NotFound(p) => ViewerError::FileNotFound(p),
            app_fs::FsError::Io(e) => ViewerError::Io(e),
            other => ViewerError::Io(std::io::Error::new(std::io::ErrorKind::Other, other.to_string())),
        }
    }
}

impl From<image::ImageError> for ViewerError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Unsupported(u) => ViewerError::UnsupportedFormat(u.to_string()),
            other => ViewerError::ImageDecode(other.to_string()),
        }
    }
}
