#![allow(clippy::cargo_common_metadata)]
use anyhow::Result;
use std::process::ExitCode;
use subverbs::{cli, config::Config, setup_logging};

const ENV_PREFIX: &str = "NAVAL";

fn main() -> Result<ExitCode> {
    // Initialize configuration
    let config = Config::from_env(ENV_PREFIX)?;

    // Setup logging based on debug flag
    setup_logging(config.debug, ENV_PREFIX)?;

    let argv: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    // Dispatch to the matching subcommand
    let mut dispatcher = cli::naval_dispatcher(config)?;
    let outcome = dispatcher.dispatch(&argv)?;

    Ok(ExitCode::from(u8::try_from(outcome.exit_code).unwrap_or(1)))
}
