use super::{SortKey, TreeModel};
use crate::provider::{Entry, TreeProvider};
use chrono::{DateTime, Local};
use std::cmp::Reverse;
use std::path::Path;
use std::time::SystemTime;
use tracing::trace;

const HEADERS: [&str; 3] = ["Name", "Type", "Date Modified"];

/// Base projection: Name, Type and Date Modified columns over a provider.
#[derive(Debug, Default)]
pub struct FsModel<P> {
    provider: P,
}

impl<P: TreeProvider> FsModel<P> {
    pub fn new(provider: P) -> Self {
        FsModel { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: TreeProvider> TreeModel for FsModel<P> {
    fn column_count(&self) -> usize {
        HEADERS.len()
    }

    fn header_label(&self, column: usize) -> String {
        HEADERS.get(column).map(|h| h.to_string()).unwrap_or_default()
    }

    fn cell_value(&self, entry: &Entry, column: usize) -> String {
        match column {
            0 => entry.name.clone(),
            1 => type_label(entry),
            2 => entry.modified.map(modified_label).unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn children(&self, entry: &Entry) -> Vec<Entry> {
        let mut children = self.unordered_children(entry);
        sort_entries(&mut children);
        children
    }

    fn unordered_children(&self, entry: &Entry) -> Vec<Entry> {
        if !entry.is_dir() {
            return Vec::new();
        }
        self.provider.children(&entry.path).unwrap_or_else(|e| {
            trace!("treating {} as empty: {}", entry.path.display(), e);
            Vec::new()
        })
    }

    fn sort_key(&self, entry: &Entry, column: usize) -> SortKey {
        match column {
            2 => SortKey::Time(entry.modified),
            _ => SortKey::Text(self.cell_value(entry, column).to_lowercase()),
        }
    }

    fn entry(&self, path: &Path) -> Option<Entry> {
        self.provider.attributes(path).ok()
    }
}

fn type_label(entry: &Entry) -> String {
    if entry.is_dir() {
        return "Folder".to_string();
    }
    match entry.extension() {
        Some(ext) if !ext.is_empty() => format!("{} File", ext.to_uppercase()),
        _ => "File".to_string(),
    }
}

fn modified_label(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Directories first, then case-insensitive by name.
fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by_cached_key(|e| (Reverse(e.is_dir()), e.name.to_lowercase(), e.name.clone()));
}
