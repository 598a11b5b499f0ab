//! Column-oriented projection of a tree provider.
//!
//! A [`TreeModel`] turns [`Entry`] values into display rows. Models stack:
//! [`FsModel`] is the base projection and [`SizedModel`] wraps any model
//! to inject a computed size column.

mod fs_model;
mod sized;

pub use fs_model::FsModel;
pub use sized::SizedModel;

use crate::provider::Entry;
use std::path::Path;
use std::time::SystemTime;

/// Comparable value of one cell. A column always yields the same variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Text(String),
    Bytes(u64),
    Time(Option<SystemTime>),
}

pub trait TreeModel {
    fn column_count(&self) -> usize;

    fn header_label(&self, column: usize) -> String;

    /// Text shown for `entry` in `column`. Out-of-range columns are empty.
    fn cell_value(&self, entry: &Entry, column: usize) -> String;

    /// Child rows of `entry` in display order.
    ///
    /// Files and directories that cannot be enumerated have no children;
    /// this never fails.
    fn children(&self, entry: &Entry) -> Vec<Entry>;

    /// Same rows as [`TreeModel::children`] without display ordering, for
    /// walks that only aggregate.
    fn unordered_children(&self, entry: &Entry) -> Vec<Entry> {
        self.children(entry)
    }

    /// Resolve a path to its row, if it still exists.
    fn entry(&self, path: &Path) -> Option<Entry>;

    /// Key used when rows are sorted by `column`. Text compares case-insensitively.
    fn sort_key(&self, entry: &Entry, column: usize) -> SortKey {
        SortKey::Text(self.cell_value(entry, column).to_lowercase())
    }

    /// The text filters match against.
    fn display_text(&self, entry: &Entry) -> String {
        self.cell_value(entry, 0)
    }
}
