/// Build the tree-guide prefix for one row.
///
/// * `ancestors_last[d]` is true when the ancestor at depth `d` is the last
///   visible child of *its* parent; it decides between `"│  "` and `"   "`.
/// * `is_last` is true when the row itself is the last visible sibling.
///
/// Top-level rows get a branch too, since the start directory is not shown.
pub fn tree_prefix(ancestors_last: &[bool], is_last: bool) -> String {
    let mut prefix = String::with_capacity((ancestors_last.len() + 1) * 3);
    for &ancestor_is_last in ancestors_last {
        prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
    }
    prefix.push_str(if is_last { "└─ " } else { "├─ " });
    prefix
}
