use std::path::PathBuf;

use clap::Parser;

/// Command-line surface for the deployment engine.
///
/// A single flat command: scan `source`, mirror its structure into
/// `destination`, and replace every accepted file with an absolute symlink
/// back into `source`.
#[derive(Parser, Debug)]
#[command(
    name = "dotdeploy",
    about = "Deploy a dotfile tree into a destination directory as symlinks",
    long_about = None,
    version
)]
pub struct Cli {
    /// Root directory containing the files to deploy
    #[arg(default_value = ".")]
    pub source: PathBuf,

    /// Root directory where symlinks are created (default: home directory)
    pub destination: Option<PathBuf>,

    /// Override the username matched against variant tags
    #[arg(long)]
    pub username: Option<String>,

    /// Override the hostname matched against variant tags
    #[arg(long)]
    pub hostname: Option<String>,

    /// Ignore-spec file; relative paths resolve against the source root
    #[arg(long, value_name = "PATH")]
    pub ignorefile: Option<PathBuf>,

    /// Report every planned/performed action
    #[arg(short, long)]
    pub verbose: bool,

    /// Report intended actions without touching the filesystem
    #[arg(short = 'n', long = "dry")]
    pub dry: bool,

    /// Overwrite pre-existing destination entries
    #[arg(long)]
    pub force: bool,
}
