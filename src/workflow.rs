use crate::cli::Cli;
use crate::error::{BrowseError, BrowseResult};
use crate::model::{FsModel, SizedModel};
use crate::provider::{Entry, FsProvider, TreeProvider};
use crate::tui::{self, TuiApp};
use crate::utils;
use crate::watcher::DirWatcher;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::{info, warn};

/// Everything the command line controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub start_dir: PathBuf,
    pub custom_dir_icons: bool,
    pub watch: bool,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        let start_dir = cli
            .directory
            .clone()
            .or_else(utils::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Settings {
            start_dir,
            custom_dir_icons: !cli.no_custom_dir_icons,
            watch: !cli.no_watch,
        }
    }
}

/// Canonicalize `requested` and check that it names a directory.
pub fn resolve_start_dir<P: TreeProvider>(provider: &P, requested: &Path) -> BrowseResult<Entry> {
    let canonical = requested
        .canonicalize()
        .map_err(|e| BrowseError::from_io(requested, e))?;
    let entry = provider.attributes(&canonical)?;
    if !entry.is_dir() {
        return Err(BrowseError::NotADirectory(canonical));
    }
    Ok(entry)
}

// Main orchestrator: resolve the start directory, stack the models and run the UI.
pub fn run_dirview(cli_args: Cli) -> Result<()> {
    let settings = Settings::from_cli(&cli_args);
    info!(?settings, "starting");

    let model = SizedModel::new(FsModel::new(FsProvider));
    let root = resolve_start_dir(model.inner().provider(), &settings.start_dir)?;

    let (watcher, changes) = if settings.watch {
        let (tx, rx) = mpsc::channel();
        match DirWatcher::new(tx) {
            Ok(watcher) => (Some(watcher), Some(rx)),
            Err(e) => {
                warn!("change watching disabled: {}", e);
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let app = TuiApp::new(model, root, watcher, settings.custom_dir_icons);
    tui::run_tui(app, changes)
}
