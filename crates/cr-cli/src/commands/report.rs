//! Report command: reconcile activity tables and render the result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use cr_core::{SchemaRegistry, reconcile};

use crate::config::Config;
use crate::{loader, render};

/// Runs the report command.
///
/// Explicit path arguments override the configured locations. Target goals
/// are validated up front: a bad goal aborts before any table is read.
pub fn run(
    config: &Config,
    roster: Option<PathBuf>,
    tables: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    config
        .targets
        .validate()
        .context("invalid target configuration")?;

    let roster_path = roster.unwrap_or_else(|| config.roster_path.clone());
    let tables_dir = tables.unwrap_or_else(|| config.tables_dir.clone());

    let roster = loader::load_roster(&roster_path)?;
    let tables = loader::load_tables(&tables_dir)?;
    tracing::debug!(
        agents = roster.len(),
        tables = tables.len(),
        "inputs loaded"
    );

    let outcome = reconcile(&tables, &SchemaRegistry::builtin(), &roster)?;

    if json {
        let output =
            render::format_report_json(&outcome, &config.targets, &config.desk_order, Utc::now())?;
        println!("{output}");
    } else {
        let output = render::format_report(&outcome, &config.targets, &config.desk_order)?;
        print!("{output}");
    }

    Ok(())
}
