//! Filesystem change notifications.
//!
//! Uses [`notify`] with debouncing. Each expanded directory is watched
//! non-recursively; the UI thread receives [`WatchMessage`]s over a channel
//! and reloads the affected directories itself.

use crate::error::BrowseResult;
use notify_debouncer_mini::{DebouncedEventKind, Debouncer, new_debouncer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Duration;

const DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub enum WatchMessage {
    /// Paths that changed. Their parent directories need reloading.
    Changed(Vec<PathBuf>),
    Error(String),
}

pub struct DirWatcher {
    debouncer: Debouncer<notify::RecommendedWatcher>,
    watched: HashSet<PathBuf>,
}

impl DirWatcher {
    pub fn new(tx: Sender<WatchMessage>) -> BrowseResult<Self> {
        let debouncer = new_debouncer(
            DEBOUNCE,
            move |result: Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>| {
                let message = match result {
                    Ok(events) => {
                        let paths: Vec<PathBuf> = events
                            .into_iter()
                            .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                            .map(|e| e.path)
                            .collect();
                        if paths.is_empty() {
                            return;
                        }
                        WatchMessage::Changed(paths)
                    }
                    Err(e) => WatchMessage::Error(e.to_string()),
                };
                let _ = tx.send(message);
            },
        )?;

        Ok(DirWatcher {
            debouncer,
            watched: HashSet::new(),
        })
    }

    /// Start watching `dir`. Watching an already watched directory is a no-op.
    pub fn watch(&mut self, dir: &Path) -> BrowseResult<()> {
        if self.watched.contains(dir) {
            return Ok(());
        }
        self.debouncer
            .watcher()
            .watch(dir, notify::RecursiveMode::NonRecursive)?;
        self.watched.insert(dir.to_path_buf());
        tracing::debug!("watching {}", dir.display());
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn is_watching(&self, dir: &Path) -> bool {
        self.watched.contains(dir)
    }

    pub fn unwatch(&mut self, dir: &Path) {
        if self.watched.remove(dir) {
            // The directory may already be gone.
            let _ = self.debouncer.watcher().unwatch(dir);
            tracing::debug!("stopped watching {}", dir.display());
        }
    }
}
