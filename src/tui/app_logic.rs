use super::app_state::{AppMode, SortOrder, TreeItem, VisibleRow};
use crate::filter::RecursiveFilter;
use crate::model::{SortKey, TreeModel};
use crate::provider::Entry;
use crate::tree_builder::tree_prefix;
use crate::watcher::{DirWatcher, WatchMessage};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Arena index of the start directory. It is never displayed itself.
const ROOT: usize = 0;

pub struct TuiApp<M> {
    pub(super) model: M,
    pub(super) filter: RecursiveFilter,
    pub(super) items: Vec<TreeItem>,
    // Detached arena slots, reused before the arena grows.
    free_slots: Vec<usize>,
    pub(super) sort: SortOrder,
    pub(super) visible: Vec<VisibleRow>,
    visible_dirty: bool,
    pub(super) current_selection_idx: Option<usize>,
    pub(super) scroll_offset: usize,
    pub(super) quit: bool,
    pub(super) mode: AppMode,
    pub(super) filter_input: String,
    // Byte offset into `filter_input`.
    pub(super) filter_cursor_pos: usize,
    pub(super) list_viewport_height: usize,
    pub(super) custom_dir_icons: bool,
    watcher: Option<DirWatcher>,
}

impl<M: TreeModel> TuiApp<M> {
    pub fn new(
        model: M,
        root: Entry,
        watcher: Option<DirWatcher>,
        custom_dir_icons: bool,
    ) -> Self {
        let mut root_item = TreeItem::new(root, None);
        root_item.is_expanded = true;

        let mut app = TuiApp {
            model,
            filter: RecursiveFilter::default(),
            items: vec![root_item],
            free_slots: Vec::new(),
            sort: SortOrder::default(),
            visible: Vec::new(),
            visible_dirty: true,
            current_selection_idx: None,
            scroll_offset: 0,
            quit: false,
            mode: AppMode::Normal,
            filter_input: String::new(),
            filter_cursor_pos: 0,
            list_viewport_height: 0, // Updated by ui_renderer
            custom_dir_icons,
            watcher,
        };
        app.reload_children(ROOT);
        app.watch_dir(ROOT);
        app.ensure_selection_is_visible();
        app
    }

    pub fn root_path(&self) -> &Path {
        &self.items[ROOT].entry.path
    }

    pub(super) fn selected_entry(&self) -> Option<&Entry> {
        self.current_selection_idx.map(|idx| &self.items[idx].entry)
    }

    // --- Visibility ---

    /// Rows that pass the filter under expanded ancestors, recomputed lazily.
    pub(super) fn visible_rows(&mut self) -> &[VisibleRow] {
        if self.visible_dirty {
            self.refresh_visible();
        }
        &self.visible
    }

    pub(super) fn refresh_visible(&mut self) {
        let mut rows = Vec::new();
        if let Some(children) = &self.items[ROOT].children_indices {
            self.push_visible_children(children, &mut Vec::new(), &mut rows);
        }
        self.visible = rows;
        self.visible_dirty = false;
    }

    fn push_visible_children(
        &self,
        children: &[usize],
        ancestors_last: &mut Vec<bool>,
        rows: &mut Vec<VisibleRow>,
    ) {
        let accepted: Vec<usize> = children
            .iter()
            .copied()
            .filter(|&idx| self.filter.accepts(&self.model, &self.items[idx].entry))
            .collect();

        for (pos, &idx) in accepted.iter().enumerate() {
            let is_last = pos + 1 == accepted.len();
            rows.push(VisibleRow {
                index: idx,
                prefix: tree_prefix(ancestors_last, is_last),
            });
            let item = &self.items[idx];
            if item.is_expanded {
                if let Some(grandchildren) = &item.children_indices {
                    ancestors_last.push(is_last);
                    self.push_visible_children(grandchildren, ancestors_last, rows);
                    ancestors_last.pop();
                }
            }
        }
    }

    fn mark_dirty(&mut self) {
        self.visible_dirty = true;
    }

    pub(super) fn selected_position(&mut self) -> Option<usize> {
        let selected = self.current_selection_idx?;
        self.visible_rows().iter().position(|row| row.index == selected)
    }

    // --- Loading ---

    /// Re-enumerate the children of `idx`, keeping existing rows (and their
    /// expansion state) for paths that are still present.
    pub(super) fn reload_children(&mut self, idx: usize) {
        if !self.items[idx].is_dir() {
            self.drop_children(idx);
            return;
        }
        let entries = self.model.children(&self.items[idx].entry);

        let mut previous: HashMap<PathBuf, usize> = self.items[idx]
            .children_indices
            .iter()
            .flatten()
            .map(|&child| (self.items[child].entry.path.clone(), child))
            .collect();

        let mut indices = Vec::with_capacity(entries.len());
        for entry in entries {
            match previous.remove(&entry.path) {
                Some(existing) => {
                    self.items[existing].entry = entry;
                    if !self.items[existing].is_dir() {
                        if self.items[existing].is_expanded {
                            self.items[existing].is_expanded = false;
                            self.unwatch_dir(existing);
                        }
                        self.drop_children(existing);
                    }
                    indices.push(existing);
                }
                None => indices.push(self.alloc_item(TreeItem::new(entry, Some(idx)))),
            }
        }

        for (_, removed) in previous {
            self.detach_subtree(removed, idx);
        }
        self.sort_children(&mut indices);
        self.items[idx].children_indices = Some(indices);
        self.mark_dirty();
    }

    fn drop_children(&mut self, idx: usize) {
        for child in self.items[idx].children_indices.take().unwrap_or_default() {
            self.detach_subtree(child, idx);
        }
    }

    fn alloc_item(&mut self, item: TreeItem) -> usize {
        match self.free_slots.pop() {
            Some(slot) => {
                self.items[slot] = item;
                slot
            }
            None => {
                self.items.push(item);
                self.items.len() - 1
            }
        }
    }

    /// Forget a row that left the tree along with everything below it.
    /// Its slots are freed, and a selection inside it moves to `parent`.
    fn detach_subtree(&mut self, idx: usize, parent: usize) {
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if self.items[current].is_expanded {
                self.items[current].is_expanded = false;
                self.unwatch_dir(current);
            }
            if let Some(children) = self.items[current].children_indices.take() {
                stack.extend(children);
            }
            if self.current_selection_idx == Some(current) {
                self.current_selection_idx = (parent != ROOT).then_some(parent);
            }
            self.items[current].parent_index = None;
            self.free_slots.push(current);
        }
    }

    /// Expanded with every ancestor expanded too, so its rows can be shown.
    fn is_open(&self, idx: usize) -> bool {
        let mut current = Some(idx);
        while let Some(i) = current {
            if !self.items[i].is_expanded {
                return false;
            }
            current = self.items[i].parent_index;
        }
        true
    }

    /// Expanded directories below `idx`, parents before children.
    fn expanded_descendants(&self, idx: usize) -> Vec<usize> {
        let mut found = Vec::new();
        let mut stack: Vec<usize> = self.items[idx].children_indices.clone().unwrap_or_default();
        while let Some(current) = stack.pop() {
            let item = &self.items[current];
            if item.is_expanded {
                found.push(current);
                stack.extend(item.children_indices.iter().flatten());
            }
        }
        found
    }

    // --- Sorting ---

    fn sort_children(&self, indices: &mut [usize]) {
        let column = self.sort.column;
        let mut keyed: Vec<(bool, SortKey, usize)> = indices
            .iter()
            .map(|&i| {
                let entry = &self.items[i].entry;
                (!entry.is_dir(), self.model.sort_key(entry, column), i)
            })
            .collect();
        // Stable, so equal keys keep the model's name order.
        keyed.sort_by(|a, b| {
            a.0.cmp(&b.0).then_with(|| {
                let order = a.1.cmp(&b.1);
                if self.sort.descending { order.reverse() } else { order }
            })
        });
        for (slot, (_, _, i)) in indices.iter_mut().zip(keyed) {
            *slot = i;
        }
    }

    fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        debug!("sorting by column {} (descending: {})", sort.column, sort.descending);
        for idx in 0..self.items.len() {
            if let Some(mut indices) = self.items[idx].children_indices.take() {
                self.sort_children(&mut indices);
                self.items[idx].children_indices = Some(indices);
            }
        }
        self.mark_dirty();
        self.ensure_selection_is_visible();
    }

    pub(super) fn cycle_sort_column(&mut self) {
        self.set_sort(self.sort.next_column(self.model.column_count()));
    }

    pub(super) fn reverse_sort(&mut self) {
        self.set_sort(self.sort.reversed());
    }

    pub(super) fn reload_all(&mut self) {
        if let Some(root) = self.model.entry(self.root_path()) {
            self.items[ROOT].entry = root;
        }
        let expanded: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.children_indices.is_some())
            .map(|(idx, _)| idx)
            .filter(|&idx| self.is_open(idx))
            .collect();
        debug!("reloading {} expanded directories", expanded.len());
        for idx in expanded {
            // An earlier reload may have detached this one.
            if self.is_open(idx) {
                self.reload_children(idx);
            }
        }
        self.ensure_selection_is_visible();
    }

    pub fn handle_watch_message(&mut self, message: WatchMessage) {
        match message {
            WatchMessage::Changed(paths) => {
                let mut dirs: HashSet<PathBuf> = HashSet::new();
                for path in paths {
                    if let Some(parent) = path.parent() {
                        dirs.insert(parent.to_path_buf());
                    }
                    dirs.insert(path);
                }
                let targets: Vec<usize> = self
                    .items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| {
                        item.children_indices.is_some() && dirs.contains(&item.entry.path)
                    })
                    .map(|(idx, _)| idx)
                    .filter(|&idx| self.is_open(idx))
                    .collect();
                for idx in targets {
                    if self.is_open(idx) {
                        debug!("reloading {}", self.items[idx].entry.path.display());
                        self.reload_children(idx);
                    }
                }
                // Anything may have moved, including rows that only match via descendants.
                self.mark_dirty();
                self.ensure_selection_is_visible();
            }
            WatchMessage::Error(e) => warn!("watcher error: {}", e),
        }
    }

    fn watch_dir(&mut self, idx: usize) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };
        let path = &self.items[idx].entry.path;
        if let Err(e) = watcher.watch(path) {
            warn!("not watching {}: {}", path.display(), e);
        }
    }

    fn unwatch_dir(&mut self, idx: usize) {
        if idx == ROOT {
            return;
        }
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.unwatch(&self.items[idx].entry.path);
        }
    }

    // --- Expansion ---

    pub(super) fn expand(&mut self, idx: usize) {
        if idx == ROOT || !self.items[idx].is_dir() {
            return;
        }
        self.reload_children(idx);
        self.items[idx].is_expanded = true;
        self.watch_dir(idx);

        // Nested folders left expanded by an earlier collapse were not watched
        // while hidden, so refresh them before they are shown again.
        let mut stack: Vec<usize> = self.items[idx].children_indices.clone().unwrap_or_default();
        while let Some(child) = stack.pop() {
            if self.items[child].is_expanded {
                self.reload_children(child);
                self.watch_dir(child);
                stack.extend(self.items[child].children_indices.iter().flatten());
            }
        }
        self.mark_dirty();
    }

    /// Hide the children of `idx`. Expanded folders below it keep their state
    /// but stop being watched.
    pub(super) fn collapse(&mut self, idx: usize) {
        if idx == ROOT || !self.items[idx].is_expanded {
            return;
        }
        self.items[idx].is_expanded = false;
        self.unwatch_dir(idx);
        for nested in self.expanded_descendants(idx) {
            self.unwatch_dir(nested);
        }
        self.mark_dirty();
    }

    pub(super) fn toggle_expansion_and_adjust_selection(&mut self) {
        let Some(idx) = self.current_selection_idx else {
            return;
        };
        if self.items[idx].is_expanded {
            self.collapse(idx);
        } else {
            self.expand(idx);
        }
        self.ensure_selection_is_visible();
    }

    pub(super) fn expand_current(&mut self) {
        if let Some(idx) = self.current_selection_idx {
            self.expand(idx);
            self.ensure_selection_is_visible();
        }
    }

    /// Collapse the selected directory, or move to its parent if it is already closed.
    pub(super) fn collapse_current_or_select_parent(&mut self) {
        let Some(idx) = self.current_selection_idx else {
            return;
        };
        if self.items[idx].is_expanded {
            self.collapse(idx);
        } else if let Some(parent) = self.items[idx].parent_index.filter(|&p| p != ROOT) {
            self.current_selection_idx = Some(parent);
        }
        self.ensure_selection_is_visible();
    }

    pub(super) fn collapse_all_directories(&mut self) {
        for idx in 1..self.items.len() {
            self.collapse(idx);
        }
        self.ensure_selection_is_visible();
    }

    // --- Selection ---

    pub(super) fn select_next_visible_item(&mut self) {
        self.move_selection_in_visible_list(1);
    }

    pub(super) fn select_previous_visible_item(&mut self) {
        self.move_selection_in_visible_list(-1);
    }

    pub(super) fn move_selection_in_visible_list(&mut self, delta: i32) {
        let current = self.selected_position();
        let visible = self.visible_rows();
        if visible.is_empty() {
            return;
        }
        let new_pos = match current {
            Some(pos) => (pos as i32 + delta).rem_euclid(visible.len() as i32) as usize,
            None if delta > 0 => 0,
            None => visible.len() - 1,
        };
        let target = visible[new_pos].index;
        self.current_selection_idx = Some(target);
        self.ensure_selection_is_visible_in_viewport();
    }

    /// Move by `delta` rows without wrapping.
    pub(super) fn move_selection_clamped(&mut self, delta: isize) {
        let current = self.selected_position().unwrap_or(0);
        let visible = self.visible_rows();
        if visible.is_empty() {
            return;
        }
        let new_pos = current.saturating_add_signed(delta).min(visible.len() - 1);
        let target = visible[new_pos].index;
        self.current_selection_idx = Some(target);
        self.ensure_selection_is_visible_in_viewport();
    }

    pub(super) fn select_first(&mut self) {
        self.move_selection_clamped(isize::MIN);
    }

    pub(super) fn select_last(&mut self) {
        self.move_selection_clamped(isize::MAX);
    }

    /// Keep the selection on a visible row: the selected row itself, else its
    /// nearest visible ancestor, else the first visible row.
    pub(super) fn ensure_selection_is_visible(&mut self) {
        let visible_indices: HashSet<usize> =
            self.visible_rows().iter().map(|row| row.index).collect();

        let mut candidate = self.current_selection_idx;
        while let Some(idx) = candidate {
            if idx == ROOT {
                break;
            }
            if visible_indices.contains(&idx) {
                self.current_selection_idx = Some(idx);
                self.ensure_selection_is_visible_in_viewport();
                return;
            }
            candidate = self.items[idx].parent_index;
        }

        self.current_selection_idx = self.visible.first().map(|row| row.index);
        self.scroll_offset = 0;
        self.ensure_selection_is_visible_in_viewport();
    }

    pub(super) fn ensure_selection_is_visible_in_viewport(&mut self) {
        let list_height = self.list_viewport_height;
        if list_height == 0 {
            return;
        }
        let position = self.selected_position();
        let num_visible_items = self.visible_rows().len();

        if let Some(pos) = position {
            if pos < self.scroll_offset {
                self.scroll_offset = pos;
            } else if pos >= self.scroll_offset + list_height {
                self.scroll_offset = pos + 1 - list_height;
            }
        }

        if num_visible_items <= list_height {
            self.scroll_offset = 0;
        } else {
            self.scroll_offset = self.scroll_offset.min(num_visible_items - list_height);
        }
    }

    // --- Filtering ---

    fn apply_filter_input(&mut self) {
        self.filter.set_pattern(&self.filter_input);
        debug!("filter set to {:?}", self.filter_input);
        self.mark_dirty();
        self.ensure_selection_is_visible();
    }

    pub(super) fn clear_filter(&mut self) {
        self.filter_input.clear();
        self.filter_cursor_pos = 0;
        self.apply_filter_input();
    }

    // --- Event handling sub-methods ---

    pub(super) fn handle_key(&mut self, key_event: KeyEvent) {
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            self.quit = true;
            return;
        }
        match self.mode {
            AppMode::Normal => self.handle_normal_mode_input(key_event),
            AppMode::Filtering => self.handle_filtering_mode_input(key_event),
        }
    }

    pub(super) fn handle_normal_mode_input(&mut self, key_event: KeyEvent) {
        let page = self.list_viewport_height.max(1) as isize;
        match key_event.code {
            KeyCode::Char('/') => {
                self.mode = AppMode::Filtering;
            }
            KeyCode::Esc if self.filter.is_active() => self.clear_filter(),
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.select_next_visible_item(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous_visible_item(),
            KeyCode::PageDown => self.move_selection_clamped(page),
            KeyCode::PageUp => self.move_selection_clamped(-page),
            KeyCode::Home | KeyCode::Char('g') => self.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.select_last(),
            KeyCode::Right | KeyCode::Char('l') => self.expand_current(),
            KeyCode::Left | KeyCode::Char('h') => self.collapse_current_or_select_parent(),
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('o') | KeyCode::Tab => {
                self.toggle_expansion_and_adjust_selection()
            }
            KeyCode::Char('-') => self.collapse_all_directories(),
            KeyCode::Char('r') => self.reload_all(),
            KeyCode::Char('s') => self.cycle_sort_column(),
            KeyCode::Char('S') => self.reverse_sort(),
            _ => {}
        }
    }

    pub(super) fn handle_filtering_mode_input(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Enter => {
                self.mode = AppMode::Normal;
            }
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.clear_filter();
            }
            KeyCode::Down => self.select_next_visible_item(),
            KeyCode::Up => self.select_previous_visible_item(),
            KeyCode::Char(c) => {
                self.filter_input.insert(self.filter_cursor_pos, c);
                self.filter_cursor_pos += c.len_utf8();
                self.apply_filter_input();
            }
            KeyCode::Backspace => {
                if let Some((prev, _)) = self.filter_input[..self.filter_cursor_pos]
                    .char_indices()
                    .next_back()
                {
                    self.filter_input.remove(prev);
                    self.filter_cursor_pos = prev;
                    self.apply_filter_input();
                }
            }
            KeyCode::Left => {
                if let Some((prev, _)) = self.filter_input[..self.filter_cursor_pos]
                    .char_indices()
                    .next_back()
                {
                    self.filter_cursor_pos = prev;
                }
            }
            KeyCode::Right => {
                if let Some(c) = self.filter_input[self.filter_cursor_pos..].chars().next() {
                    self.filter_cursor_pos += c.len_utf8();
                }
            }
            _ => {}
        }
    }
}
