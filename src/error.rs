//! Error types for filesystem access.
//!
//! Fallible provider and watcher operations return [`BrowseResult<T>`].
//! The recursive filter and the size column never surface these; they
//! absorb them into "no match" and "zero bytes".

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    /// The path does not exist (or vanished after it was listed).
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path is something else.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl BrowseError {
    /// Attach `path` to an I/O error where the kind makes the path the interesting part.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => BrowseError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => BrowseError::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotADirectory => BrowseError::NotADirectory(path.to_path_buf()),
            _ => BrowseError::Io(err),
        }
    }
}

pub type BrowseResult<T> = Result<T, BrowseError>;
