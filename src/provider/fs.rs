use super::{Entry, TreeProvider};
use crate::error::{BrowseError, BrowseResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

/// Reads the local filesystem one directory level at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProvider;

impl TreeProvider for FsProvider {
    fn children(&self, dir: &Path) -> BrowseResult<Vec<Entry>> {
        let mut entries = Vec::new();

        for result in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let dirent = match result {
                Ok(v) => v,
                // Depth 0 means `dir` itself could not be opened.
                Err(e) if e.depth() == 0 => return Err(walk_error(dir, e)),
                Err(e) => {
                    trace!("skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let path = dirent.into_path();
            match read_entry(&path) {
                Ok(entry) => entries.push(entry),
                // Removed between listing and stat.
                Err(e) => trace!("skipping {}: {}", path.display(), e),
            }
        }

        Ok(entries)
    }

    fn attributes(&self, path: &Path) -> BrowseResult<Entry> {
        read_entry(path)
    }
}

fn walk_error(dir: &Path, err: walkdir::Error) -> BrowseError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
    let io_err: io::Error = err.into();
    BrowseError::from_io(&path, io_err)
}

/// Stat `path`, following symlinks for kind and size.
/// A dangling symlink is reported as a zero-byte file.
fn read_entry(path: &Path) -> BrowseResult<Entry> {
    let link_meta = fs::symlink_metadata(path).map_err(|e| BrowseError::from_io(path, e))?;
    let is_symlink = link_meta.file_type().is_symlink();

    if !is_symlink {
        return Ok(Entry::from_metadata(PathBuf::from(path), &link_meta, false));
    }
    match fs::metadata(path) {
        Ok(target) => Ok(Entry::from_metadata(PathBuf::from(path), &target, true)),
        Err(_) => {
            let mut entry = Entry::from_metadata(PathBuf::from(path), &link_meta, true);
            entry.size = 0;
            Ok(entry)
        }
    }
}
