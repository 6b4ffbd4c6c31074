//! Table loading.
//!
//! The engine only sees in-memory tables; this module is the collaborator
//! that produces them. The roster is one JSON array of rows; activity tables
//! live in a directory with one JSON file per source, named `<source id>.json`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cr_core::{RawRecord, Roster, RosterRow, SourceId, SourceTable};

/// Loads and canonicalizes the roster.
pub fn load_roster(path: &Path) -> Result<Roster> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster file {}", path.display()))?;
    let rows: Vec<RosterRow> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse roster file {}", path.display()))?;
    tracing::debug!(rows = rows.len(), "roster loaded");
    let roster = Roster::from_rows(rows)?;
    Ok(roster)
}

/// Loads every `*.json` activity table in the directory, in filename order.
///
/// The file stem names the source. Which sources are actually understood is
/// the schema registry's concern, not the loader's.
pub fn load_tables(dir: &Path) -> Result<Vec<SourceTable>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read tables directory {}", dir.display()))?;

    let mut paths: Vec<_> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping table with unreadable name");
            continue;
        };
        let source_id = SourceId::new(stem)
            .with_context(|| format!("invalid source name for {}", path.display()))?;

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read table {}", path.display()))?;
        let records: Vec<RawRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse table {}", path.display()))?;

        tracing::debug!(source = %source_id, rows = records.len(), "table loaded");
        tables.push(SourceTable::new(source_id, records));
    }

    Ok(tables)
}
