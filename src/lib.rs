// Hembygd - Artifact catalogue for a local heritage museum
// Module declarations

use clap::Parser;
use env_logger::Env;
use std::process::ExitCode;

pub mod commands;
pub mod config;
pub mod report;
pub mod state;

pub fn run() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let cli = commands::Cli::parse();
    match commands::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.message());
            ExitCode::FAILURE
        }
    }
}
