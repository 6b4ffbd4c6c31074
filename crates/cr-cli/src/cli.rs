//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Call-activity reconciliation.
///
/// Reconciles call exports from several telephony vendors into one
/// per-agent performance view for the Conversion and Retention departments.
#[derive(Debug, Parser)]
#[command(name = "cr", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile activity tables against the roster and print the report.
    Report {
        /// Path to the roster file (overrides config).
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Directory of activity tables, one JSON file per source (overrides config).
        #[arg(long)]
        tables: Option<PathBuf>,

        /// Emit machine-readable JSON instead of the human report.
        #[arg(long)]
        json: bool,
    },

    /// List the registered source schemas.
    Sources {
        /// Emit machine-readable JSON instead of the table.
        #[arg(long)]
        json: bool,
    },
}
