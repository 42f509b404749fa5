//! Configuration management for the dispatcher
//!
//! Centralizes dispatch options and provides validation.

use crate::{error::VerbError, utils::EnvUtils};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// Width of the verb column in the "no command" listing
    pub listing_width: usize,
    /// Leading spaces on every listing line
    pub listing_indent: usize,
    /// Exit code reported when no subcommand matched
    pub no_command_code: i32,
    /// Reserved verb the completion provider is bound to
    pub completion_verb: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            listing_width: 24,
            listing_indent: 4,
            no_command_code: 1,
            completion_verb: "completion".to_string(),
        }
    }
}

impl Config {
    /// Create configuration from `<PREFIX>_*` environment variables
    pub fn from_env(prefix: &str) -> Result<Self, VerbError> {
        Self::from_lookup(prefix, EnvUtils::get_var)
    }

    /// Create configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, VerbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| lookup(&EnvUtils::prefixed(prefix, key));

        if let Some(raw) = var("DEBUG") {
            config.debug = EnvUtils::parse_bool(&raw);
        }

        if let Some(raw) = var("LISTING_WIDTH") {
            config.listing_width = EnvUtils::parse_value("LISTING_WIDTH", &raw).ok_or_else(|| {
                VerbError::config(format!("listing width must be a positive integer, got '{raw}'"))
            })?;
        }

        if let Some(raw) = var("NO_COMMAND_CODE") {
            config.no_command_code =
                EnvUtils::parse_value("NO_COMMAND_CODE", &raw).ok_or_else(|| {
                    VerbError::config(format!("no-command code must be an integer, got '{raw}'"))
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), VerbError> {
        if self.listing_width == 0 {
            return Err(VerbError::config("listing width must be at least 1"));
        }

        if !(1..=255).contains(&self.no_command_code) {
            return Err(VerbError::config(format!(
                "no-command code must be between 1 and 255, got {}",
                self.no_command_code
            )));
        }

        if self.completion_verb.is_empty()
            || self.completion_verb.chars().any(char::is_whitespace)
        {
            return Err(VerbError::config(format!(
                "completion verb must be a single non-blank token, got '{}'",
                self.completion_verb
            )));
        }

        Ok(())
    }
}
