use anyhow::Result;
use clap::Parser;

use dotdeploy::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let log = logging::Logger::new(args.verbose);
    commands::run(&args, &log)
}
