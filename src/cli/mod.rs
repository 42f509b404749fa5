//! Command-line interface module
//!
//! Provides the subcommands of the `naval` tool.

pub mod commands;

pub use commands::{DevAdd, Init, MineSet, ShipMove, ShipNew, ShipShoot, naval_dispatcher};
