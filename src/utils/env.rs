//! Environment variable helpers
//!
//! Process environment reads and parsing of raw variable values.

use std::env;
use std::str::FromStr;
use tracing::debug;

/// Environment variable utilities
pub struct EnvUtils;

impl EnvUtils {
    /// Get environment variable
    pub fn get_var(key: &str) -> Option<String> {
        env::var(key).ok()
    }

    /// Parse a raw value, logging when it is present but malformed
    pub fn parse_value<T: FromStr>(key: &str, raw: &str) -> Option<T> {
        let parsed = raw.trim().parse().ok();
        if parsed.is_none() {
            debug!("Ignoring malformed value for {}: '{}'", key, raw);
        }
        parsed
    }

    /// Interpret a raw value as a boolean switch
    pub fn parse_bool(raw: &str) -> bool {
        matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    }

    /// Build a prefixed variable name (`NAVAL` + `DEBUG` -> `NAVAL_DEBUG`)
    pub fn prefixed(prefix: &str, key: &str) -> String {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}_{}", prefix.to_ascii_uppercase(), key)
        }
    }
}
