//! # Subverbs
//!
//! A multi-level verb dispatcher for command-line tools. Subcommands are
//! registered under literal verb paths (`ship new`, `mine set`); the
//! dispatcher picks the one whose verbs prefix the process arguments,
//! hands the remaining tokens to its option grammar, validates and runs it,
//! and reports a single exit code. A built-in completion subcommand serves
//! Bash completion for the registered verbs.
//!
//! ## Features
//!
//! - Prefix matching of verb paths against process arguments
//! - Registry checks at startup (duplicates, prefix collisions)
//! - parse, validate, exec lifecycle with errors reduced to exit codes
//! - Verb listing when nothing matched
//! - Bash completion script and completion queries
//!
//! ## Example
//!
//! ```no_run
//! use subverbs::{cli::Init, config::Config, core::Dispatcher};
//!
//! let mut dispatcher = Dispatcher::builder(Config::default())
//!     .command(Init::new())
//!     .build()?;
//! let argv: Vec<String> = std::env::args().collect();
//! let outcome = dispatcher.dispatch(&argv)?;
//! std::process::exit(outcome.exit_code);
//! # Ok::<(), subverbs::error::VerbError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
///
/// `<PREFIX>_LOG` overrides the level filter. Output goes to stderr;
/// stdout is reserved for command output and completion candidates.
pub fn setup_logging(debug: bool, prefix: &str) -> Result<()> {
    let filter = EnvFilter::try_from_env(utils::EnvUtils::prefixed(prefix, "LOG")).unwrap_or_else(
        |_| {
            if debug {
                EnvFilter::new("debug")
            } else {
                EnvFilter::new("info")
            }
        },
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
