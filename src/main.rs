use clap::Parser;
use lmc::cli::{self, Cli};
use lmc::log::{self, Level};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose {
        log::set_level(Level::Info);
    }

    match cli::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            lmc::error!("{}, halting...", e);
            ExitCode::FAILURE
        }
    }
}
