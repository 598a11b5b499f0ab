use crate::provider::Entry;

/// One row of the browsed tree, stored in a flat arena.
///
/// `children_indices` is `None` until the directory is first expanded.
#[derive(Debug, Clone)]
pub struct TreeItem {
    pub entry: Entry,
    pub is_expanded: bool,
    pub children_indices: Option<Vec<usize>>,
    pub parent_index: Option<usize>,
}

impl TreeItem {
    pub fn new(entry: Entry, parent_index: Option<usize>) -> Self {
        TreeItem {
            entry,
            is_expanded: false,
            children_indices: None,
            parent_index,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.entry.is_dir()
    }
}

/// A row that passed the filter, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct VisibleRow {
    pub(super) index: usize,
    pub(super) prefix: String,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(super) enum AppMode {
    Normal,
    Filtering,
}

/// Column the rows of every directory are ordered by.
///
/// Directories stay ahead of files in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) struct SortOrder {
    pub(super) column: usize,
    pub(super) descending: bool,
}

impl SortOrder {
    /// Move to the next column, wrapping, and start ascending.
    pub(super) fn next_column(self, column_count: usize) -> Self {
        SortOrder {
            column: (self.column + 1) % column_count.max(1),
            descending: false,
        }
    }

    pub(super) fn reversed(self) -> Self {
        SortOrder {
            descending: !self.descending,
            ..self
        }
    }

    pub(super) fn indicator(&self) -> &'static str {
        if self.descending { "▼" } else { "▲" }
    }
}
