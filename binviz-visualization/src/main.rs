//! Entry point for the binviz command line tool.

use anyhow::{Context, Result};
use binviz_visualization::{show_file, Args, ViewerConfig};
use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;

fn run(config: ViewerConfig) -> Result<()> {
    let path = config.path.clone();
    show_file(config).with_context(|| format!("binviz failed on {}", path.display()))
}

fn main() -> ExitCode {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(ViewerConfig::from(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
