//! Hierarchical data source the models read from.
//!
//! A provider only enumerates children and reports attributes. Ordering,
//! column values and error absorption belong to the model layer.

mod fs;
#[cfg(test)]
pub(crate) mod memory;

pub use fs::FsProvider;

use crate::error::BrowseResult;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One file or directory as observed at enumeration time.
///
/// `size` is the on-disk length for files and `0` for directories.
/// For symlinks, `kind`/`size` describe the target and `is_symlink` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub is_symlink: bool,
}

impl Entry {
    pub fn from_metadata(path: PathBuf, metadata: &Metadata, is_symlink: bool) -> Self {
        let name = display_name(&path);
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Entry {
            name,
            kind,
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified: metadata.modified().ok(),
            is_symlink,
            path,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }
}

/// Last path component, or the whole path for roots like `/`.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

pub trait TreeProvider {
    /// Immediate children of `dir`, hidden entries included, in no particular order.
    fn children(&self, dir: &Path) -> BrowseResult<Vec<Entry>>;

    /// Attributes of a single path.
    fn attributes(&self, path: &Path) -> BrowseResult<Entry>;
}

impl<P: TreeProvider + ?Sized> TreeProvider for &P {
    fn children(&self, dir: &Path) -> BrowseResult<Vec<Entry>> {
        (**self).children(dir)
    }

    fn attributes(&self, path: &Path) -> BrowseResult<Entry> {
        (**self).attributes(path)
    }
}
