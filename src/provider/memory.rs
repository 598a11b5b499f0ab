//! In-memory provider for deterministic model, filter and UI tests.

use super::{Entry, EntryKind, TreeProvider, display_name};
use crate::error::{BrowseError, BrowseResult};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy)]
enum Node {
    File(u64),
    Dir,
    /// Listed by its parent but cannot be enumerated itself.
    Unreadable,
}

#[derive(Debug)]
pub(crate) struct MemoryProvider {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    listings: Cell<usize>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(PathBuf::from("/"), Node::Dir);
        MemoryProvider {
            nodes: RefCell::new(nodes),
            listings: Cell::new(0),
        }
    }

    pub fn with_file(self, path: &str, size: u64) -> Self {
        self.add_file(path, size);
        self
    }

    pub fn with_dir(self, path: &str) -> Self {
        self.insert(path, Node::Dir);
        self
    }

    pub fn with_unreadable_dir(self, path: &str) -> Self {
        self.insert(path, Node::Unreadable);
        self
    }

    pub fn add_file(&self, path: &str, size: u64) {
        self.insert(path, Node::File(size));
    }

    /// Remove `path` and everything below it.
    pub fn remove(&self, path: &str) {
        let target = PathBuf::from(path);
        self.nodes
            .borrow_mut()
            .retain(|p, _| !p.starts_with(&target));
    }

    pub fn entry(&self, path: &str) -> Entry {
        self.attributes(Path::new(path))
            .unwrap_or_else(|e| panic!("no entry at {path}: {e}"))
    }

    /// How many times `children` has been called.
    pub fn listings(&self) -> usize {
        self.listings.get()
    }

    fn insert(&self, path: &str, node: Node) {
        let path = PathBuf::from(path);
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.ancestors().skip(1) {
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
        nodes.insert(path, node);
    }
}

fn make_entry(path: &Path, node: Node) -> Entry {
    let (kind, size) = match node {
        Node::File(size) => (EntryKind::File, size),
        Node::Dir | Node::Unreadable => (EntryKind::Directory, 0),
    };
    Entry {
        path: path.to_path_buf(),
        name: display_name(path),
        kind,
        size,
        modified: None,
        is_symlink: false,
    }
}

impl TreeProvider for MemoryProvider {
    fn children(&self, dir: &Path) -> BrowseResult<Vec<Entry>> {
        self.listings.set(self.listings.get() + 1);
        let nodes = self.nodes.borrow();
        match nodes.get(dir) {
            None => Err(BrowseError::NotFound(dir.to_path_buf())),
            Some(Node::File(_)) => Err(BrowseError::NotADirectory(dir.to_path_buf())),
            Some(Node::Unreadable) => Err(BrowseError::PermissionDenied(dir.to_path_buf())),
            Some(Node::Dir) => Ok(nodes
                .iter()
                .filter(|(path, _)| path.parent() == Some(dir))
                .map(|(path, node)| make_entry(path, *node))
                .collect()),
        }
    }

    fn attributes(&self, path: &Path) -> BrowseResult<Entry> {
        self.nodes
            .borrow()
            .get(path)
            .map(|node| make_entry(path, *node))
            .ok_or_else(|| BrowseError::NotFound(path.to_path_buf()))
    }
}
