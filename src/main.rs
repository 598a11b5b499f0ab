mod cli;
mod error;
mod filter;
mod icons;
mod model;
mod provider;
mod tree_builder;
mod tui;
mod utils;
mod watcher;
mod workflow;

use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Mutex;

const LOG_FILE_NAME: &str = "dirview.log";

/// Log to a file so output never lands on the alternate screen.
/// Logging is skipped if the file cannot be opened.
fn init_logging() {
    let path = std::env::temp_dir().join(LOG_FILE_NAME);
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
}

fn main() -> Result<()> {
    let cli_args = cli::Cli::parse();
    init_logging();

    // Delegate the main application logic to the workflow module
    workflow::run_dirview(cli_args)
}
