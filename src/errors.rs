use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Could not read configuration file {}: {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed configuration file {}: {source}", .path.display())]
    ConfigMalformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Authentication failed: {reason}")]
    Authentication { reason: String },

    #[error("Could not list directory {}: {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not read file {}: {source}", .path.display())]
    FileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Archive folder {} is unusable: {source}", .path.display())]
    ArchiveDirUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Upload failed: {reason}")]
    UploadFailed { reason: String },

    #[error("Could not archive {}: {source}", .path.display())]
    ArchiveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Custom result type
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    pub fn upload_failed(reason: impl Into<String>) -> Self {
        Self::UploadFailed {
            reason: reason.into(),
        }
    }

    pub fn directory_unreadable(path: &Path, source: std::io::Error) -> Self {
        Self::DirectoryUnreadable {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn file_unreadable(path: &Path, source: std::io::Error) -> Self {
        Self::FileUnreadable {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn archive_dir_unavailable(path: &Path, source: std::io::Error) -> Self {
        Self::ArchiveDirUnavailable {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn archive_failed(path: &Path, source: std::io::Error) -> Self {
        Self::ArchiveFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Errors that stop the whole run before any folder is processed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::ConfigUnreadable { .. }
                | AppError::ConfigMalformed { .. }
                | AppError::Validation { .. }
                | AppError::Authentication { .. }
        )
    }

    /// Errors that end a single folder task but leave sibling folders running.
    pub fn is_folder_scoped(&self) -> bool {
        matches!(
            self,
            AppError::DirectoryUnreadable { .. }
                | AppError::FileUnreadable { .. }
                | AppError::ArchiveDirUnavailable { .. }
        )
    }
}
