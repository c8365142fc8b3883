use std::process::ExitCode;

use clap::Parser;
use log::error;
use rucks_engine::cli::{
    self,
    messages::error_message,
    parsers::{CliMode, CliParser},
};
use rucks_engine::config::EngineConfig;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = CliParser::parse();

    let config = match EngineConfig::load(args.config.as_deref()).and_then(|mut config| {
        config.merge_overrides(args.overrides())?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", error_message(&err));
            return ExitCode::FAILURE;
        }
    };

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match args.mode {
        CliMode::Client => cli::run_client(&config),
        CliMode::Tables => cli::run_tables(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("{}", error_message(&err));
            ExitCode::FAILURE
        }
    }
}
