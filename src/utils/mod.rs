//! Utility modules for common functionality
//!
//! Provides environment handling shared by the configuration layer.

pub mod env;

pub use env::EnvUtils;
