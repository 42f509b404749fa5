//! Error types for the verb dispatcher
//!
//! Parse-layer failures, subcommand validation failures and registry
//! construction failures all funnel through [`VerbError`].

use thiserror::Error;

/// Main error type for the dispatcher
#[derive(Error, Debug)]
pub enum VerbError {
    /// The option grammar rejected the arguments following the verbs
    #[error("invalid options for `{verbs}`: {message}")]
    Parse {
        verbs: String,
        message: String,
        #[source]
        source: clap::Error,
    },

    /// A subcommand's semantic checks rejected the parsed options
    #[error("{verbs}: {message}")]
    Validation { verbs: String, message: String },

    /// The help flag was present; carries the rendered help text
    #[error("help requested")]
    HelpRequested { help: String },

    /// The registry violates a construction invariant
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Writing to an output stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Registry construction failures, detected before any dispatch happens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("subcommand `{description}` has an empty verb path")]
    EmptyVerbPath { description: String },

    #[error("verb path `{verbs}` contains a blank or whitespace-carrying token")]
    InvalidToken { verbs: String },

    #[error("verb path `{verbs}` is registered more than once")]
    Duplicate { verbs: String },

    #[error("verb path `{shorter}` is a prefix of `{longer}`")]
    PrefixCollision { shorter: String, longer: String },

    #[error("verb path `{verbs}` does not fit the {width}-column listing")]
    TooWide { verbs: String, width: usize },
}

impl VerbError {
    /// Create a parse error from a clap rejection, keeping only the headline
    pub fn parse(verbs: impl Into<String>, source: clap::Error) -> Self {
        let rendered = source.to_string();
        let message = rendered
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("malformed options")
            .trim()
            .trim_start_matches("error:")
            .trim()
            .to_string();

        Self::Parse {
            verbs: verbs.into(),
            message,
            source,
        }
    }

    /// Create a new validation error
    pub fn validation(verbs: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            verbs: verbs.into(),
            message: message.into(),
        }
    }

    /// Create a help short-circuit carrying the rendered help text
    pub fn help(help: impl Into<String>) -> Self {
        Self::HelpRequested { help: help.into() }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, VerbError>;
