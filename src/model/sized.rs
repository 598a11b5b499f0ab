use super::{SortKey, TreeModel};
use crate::provider::{Entry, EntryKind};
use crate::utils::human_readable;
use std::cmp::Ordering;
use std::path::Path;

/// Where [`SizedModel`] injects its column.
pub const SIZE_COLUMN: usize = 1;

const SIZE_HEADER: &str = "Size";

/// Computes the byte total shown for a directory row.
pub trait DirSizer {
    fn directory_size<M: TreeModel + ?Sized>(&self, model: &M, dir: &Entry) -> u64;
}

/// Walks the whole subtree on every call. Nothing is cached.
///
/// Hidden entries count. Nested symlinked directories are not followed and
/// unreadable subdirectories contribute nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecursiveSizer;

impl DirSizer for RecursiveSizer {
    fn directory_size<M: TreeModel + ?Sized>(&self, model: &M, dir: &Entry) -> u64 {
        model
            .unordered_children(dir)
            .iter()
            .map(|child| match child.kind {
                EntryKind::File => child.size,
                EntryKind::Directory if child.is_symlink => 0,
                EntryKind::Directory => self.directory_size(model, child),
            })
            .fold(0u64, u64::saturating_add)
    }
}

/// Wraps a model and adds a human-readable "Size" column at [`SIZE_COLUMN`].
///
/// Columns of the inner model at or after that index shift right by one.
#[derive(Debug, Default)]
pub struct SizedModel<M, S = RecursiveSizer> {
    inner: M,
    sizer: S,
}

impl<M: TreeModel> SizedModel<M> {
    pub fn new(inner: M) -> Self {
        SizedModel::with_sizer(inner, RecursiveSizer)
    }
}

impl<M: TreeModel, S: DirSizer> SizedModel<M, S> {
    pub fn with_sizer(inner: M, sizer: S) -> Self {
        SizedModel { inner, sizer }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Bytes for a file, or the subtree total for a directory.
    pub fn size_of(&self, entry: &Entry) -> u64 {
        match entry.kind {
            EntryKind::File => entry.size,
            EntryKind::Directory => self.sizer.directory_size(&self.inner, entry),
        }
    }
}

impl<M: TreeModel, S: DirSizer> TreeModel for SizedModel<M, S> {
    fn column_count(&self) -> usize {
        self.inner.column_count() + 1
    }

    fn header_label(&self, column: usize) -> String {
        match column.cmp(&SIZE_COLUMN) {
            Ordering::Less => self.inner.header_label(column),
            Ordering::Equal => SIZE_HEADER.to_string(),
            Ordering::Greater => self.inner.header_label(column - 1),
        }
    }

    fn cell_value(&self, entry: &Entry, column: usize) -> String {
        match column.cmp(&SIZE_COLUMN) {
            Ordering::Less => self.inner.cell_value(entry, column),
            Ordering::Equal => human_readable(self.size_of(entry)),
            Ordering::Greater => self.inner.cell_value(entry, column - 1),
        }
    }

    fn children(&self, entry: &Entry) -> Vec<Entry> {
        self.inner.children(entry)
    }

    fn unordered_children(&self, entry: &Entry) -> Vec<Entry> {
        self.inner.unordered_children(entry)
    }

    fn sort_key(&self, entry: &Entry, column: usize) -> SortKey {
        match column.cmp(&SIZE_COLUMN) {
            Ordering::Less => self.inner.sort_key(entry, column),
            Ordering::Equal => SortKey::Bytes(self.size_of(entry)),
            Ordering::Greater => self.inner.sort_key(entry, column - 1),
        }
    }

    fn entry(&self, path: &Path) -> Option<Entry> {
        self.inner.entry(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FsModel;
    use crate::provider::FsProvider;
    use crate::provider::memory::MemoryProvider;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    fn sized(provider: MemoryProvider) -> SizedModel<FsModel<MemoryProvider>> {
        SizedModel::new(FsModel::new(provider))
    }

    #[test]
    fn adds_one_column_named_size() {
        let model = sized(MemoryProvider::new());
        assert_eq!(model.column_count(), model.inner().column_count() + 1);
        assert_eq!(model.header_label(0), "Name");
        assert_eq!(model.header_label(SIZE_COLUMN), "Size");
        assert_eq!(model.header_label(2), "Type");
        assert_eq!(model.header_label(3), "Date Modified");
    }

    #[test]
    fn other_columns_delegate_unchanged() {
        let model = sized(MemoryProvider::new().with_file("/docs/report.pdf", 10));
        let entry = model.inner().provider().entry("/docs/report.pdf");
        assert_eq!(model.cell_value(&entry, 0), "report.pdf");
        assert_eq!(model.cell_value(&entry, 2), "PDF File");
        assert_eq!(model.display_text(&entry), "report.pdf");
    }

    #[test]
    fn file_size_is_formatted() {
        let model = sized(MemoryProvider::new().with_file("/f", 1536));
        let entry = model.inner().provider().entry("/f");
        assert_eq!(model.cell_value(&entry, SIZE_COLUMN), "1.50 KB");
    }

    #[test]
    fn directory_size_sums_nested_files() {
        let model = sized(
            MemoryProvider::new()
                .with_file("/A/f1", 100)
                .with_file("/A/B/f2", 924),
        );
        let a = model.inner().provider().entry("/A");
        assert_eq!(model.size_of(&a), 1024);
        assert_eq!(model.cell_value(&a, SIZE_COLUMN), "1.00 KB");
    }

    #[test]
    fn directory_size_includes_hidden_and_deep_entries() {
        let model = sized(
            MemoryProvider::new()
                .with_file("/d/.hidden", 1)
                .with_file("/d/.git/objects/pack/p", 10)
                .with_file("/d/x/y/z/w/leaf", 100),
        );
        let d = model.inner().provider().entry("/d");
        assert_eq!(model.size_of(&d), 111);
    }

    #[test]
    fn unreadable_subdirectory_counts_as_zero() {
        let model = sized(
            MemoryProvider::new()
                .with_file("/d/ok", 7)
                .with_unreadable_dir("/d/locked"),
        );
        let d = model.inner().provider().entry("/d");
        let locked = model.inner().provider().entry("/d/locked");
        assert_eq!(model.size_of(&d), 7);
        assert_eq!(model.cell_value(&locked, SIZE_COLUMN), "0.00 B");
    }

    #[test]
    fn empty_directory_is_zero_bytes() {
        let model = sized(MemoryProvider::new().with_dir("/empty"));
        let empty = model.inner().provider().entry("/empty");
        assert_eq!(model.cell_value(&empty, SIZE_COLUMN), "0.00 B");
    }

    #[test]
    fn size_is_recomputed_on_every_read() {
        let model = sized(MemoryProvider::new().with_file("/d/a", 10));
        let d = model.inner().provider().entry("/d");
        assert_eq!(model.size_of(&d), 10);

        model.inner().provider().add_file("/d/b", 20);
        assert_eq!(model.size_of(&d), 30);

        model.inner().provider().remove("/d/a");
        assert_eq!(model.size_of(&d), 20);
    }

    #[derive(Default)]
    struct CountingSizer {
        calls: Cell<usize>,
    }

    impl DirSizer for CountingSizer {
        fn directory_size<M: TreeModel + ?Sized>(&self, _model: &M, _dir: &Entry) -> u64 {
            self.calls.set(self.calls.get() + 1);
            42
        }
    }

    #[test]
    fn sizer_can_be_substituted() {
        let provider = MemoryProvider::new().with_dir("/d");
        let model = SizedModel::with_sizer(FsModel::new(provider), CountingSizer::default());
        let d = model.inner().provider().entry("/d");
        assert_eq!(model.cell_value(&d, SIZE_COLUMN), "42.00 B");
        assert_eq!(model.sizer.calls.get(), 1);
    }

    #[test]
    fn size_sorts_by_bytes_not_text() {
        let model = sized(
            MemoryProvider::new()
                .with_file("/d/small", 900)
                .with_file("/d/big/f", 2048),
        );
        let p = model.inner().provider();
        let small = model.sort_key(&p.entry("/d/small"), SIZE_COLUMN);
        let big = model.sort_key(&p.entry("/d/big"), SIZE_COLUMN);
        assert_eq!(big, SortKey::Bytes(2048));
        // "900.00 B" sorts after "2.00 KB" as text.
        assert!(small < big);
        assert_eq!(
            model.sort_key(&p.entry("/d/small"), 2),
            SortKey::Text("file".into())
        );
    }

    /// Panics if anything asks for display-ordered children.
    struct AggregateOnly(FsModel<MemoryProvider>);

    impl TreeModel for AggregateOnly {
        fn column_count(&self) -> usize {
            self.0.column_count()
        }
        fn header_label(&self, column: usize) -> String {
            self.0.header_label(column)
        }
        fn cell_value(&self, entry: &Entry, column: usize) -> String {
            self.0.cell_value(entry, column)
        }
        fn children(&self, _entry: &Entry) -> Vec<Entry> {
            panic!("aggregate walks must not sort");
        }
        fn unordered_children(&self, entry: &Entry) -> Vec<Entry> {
            self.0.unordered_children(entry)
        }
        fn entry(&self, path: &Path) -> Option<Entry> {
            self.0.entry(path)
        }
    }

    #[test]
    fn recursive_size_walks_unordered_children() {
        let model = SizedModel::new(AggregateOnly(FsModel::new(
            MemoryProvider::new()
                .with_file("/d/a", 1)
                .with_file("/d/x/b", 2)
                .with_file("/d/x/y/c", 3),
        )));
        let d = model.inner().0.provider().entry("/d");
        assert_eq!(model.size_of(&d), 6);
    }

    #[test]
    fn sizes_real_directory_tree() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("A");
        fs::create_dir_all(a.join("B")).unwrap();
        fs::write(a.join("f1"), vec![0u8; 100]).unwrap();
        fs::write(a.join("B/f2"), vec![0u8; 924]).unwrap();

        let model = SizedModel::new(FsModel::new(FsProvider));
        let entry = model.entry(&a).unwrap();
        assert_eq!(model.cell_value(&entry, SIZE_COLUMN), "1.00 KB");
    }

    #[cfg(unix)]
    #[test]
    fn nested_symlinked_directories_are_not_followed() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("data"), vec![0u8; 64]).unwrap();
        std::os::unix::fs::symlink(&root, root.join("loop")).unwrap();

        let model = SizedModel::new(FsModel::new(FsProvider));
        let entry = model.entry(&root).unwrap();
        assert_eq!(model.size_of(&entry), 64);
    }
}
