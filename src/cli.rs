use clap::Parser;
use std::path::PathBuf;

/// dirview – browse a directory tree with a live filter and folder sizes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The directory to start in (defaults to your home directory)
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Use the plain folder icon for every directory
    #[arg(short = 'c', long)]
    pub no_custom_dir_icons: bool,

    /// Do not watch expanded directories for changes
    #[arg(short = 'w', long)]
    pub no_watch: bool,
}
