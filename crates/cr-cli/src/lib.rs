//! Call-activity reconciliation CLI library.
//!
//! This crate provides the CLI interface for the reconciliation engine:
//! configuration, table loading, and report rendering.

mod cli;
pub mod commands;
mod config;
pub mod loader;
pub mod render;

pub use cli::{Cli, Commands};
pub use config::{Config, DeskOrder};
