//! Record classification and extraction.
//!
//! Turns one source's raw table into normalized contributions, applying the
//! source's status filter, duration convention and identity shape as declared
//! in its schema. Row-level problems are collected as [`DataIssue`] values and
//! never abort the source; a table missing a declared column is skipped whole
//! via [`SchemaMismatch`].

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use crate::duration::parse_seconds;
use crate::identity;
use crate::record::{RawRecord, SourceTable};
use crate::schema::{AgentField, AttemptsRule, SourceSchema, StatusFilter, UniqueRule};
use crate::types::{AgentKey, SourceId};

/// A source's expected column is absent from the table; the source is skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("source {source_id}: required column {column:?} is missing")]
pub struct SchemaMismatch {
    pub source_id: SourceId,
    pub column: String,
}

/// What went wrong with one field of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataIssueKind {
    /// Duration was absent or unparseable; zero seconds was substituted.
    BadDuration { value: String },
    /// A count column held a non-numeric value; zero was substituted.
    BadCount { value: String },
}

/// A recoverable data-quality problem found during extraction.
///
/// Issues are surfaced to the caller alongside the extracted contributions so
/// downstream consumers can decide how much to trust the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataIssue {
    pub source_id: SourceId,
    /// Zero-based row index within the source table.
    pub row: usize,
    pub column: String,
    pub kind: DataIssueKind,
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DataIssueKind::BadDuration { value } => write!(
                f,
                "{} row {}: invalid duration {:?} in {:?}, counted as 0 s",
                self.source_id, self.row, value, self.column
            ),
            DataIssueKind::BadCount { value } => write!(
                f,
                "{} row {}: non-numeric count {:?} in {:?}, counted as 0",
                self.source_id, self.row, value, self.column
            ),
        }
    }
}

/// One retained row's contribution: every listed agent is credited the row's
/// seconds and attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContribution {
    pub agents: Vec<AgentKey>,
    pub seconds: u64,
    pub attempts: u64,
}

/// Everything extracted from one source table.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source_id: SourceId,
    pub rows: Vec<RowContribution>,
    /// Per-agent unique-contact counts, pre-aggregated over the whole source.
    pub uniques: Vec<(AgentKey, u64)>,
    pub issues: Vec<DataIssue>,
}

/// Extracts normalized contributions from a raw table per its schema.
///
/// An empty table extracts to an empty batch without schema checks, since a
/// rowless export carries no column information.
pub fn extract(table: &SourceTable, schema: &SourceSchema) -> Result<SourceBatch, SchemaMismatch> {
    if !table.records.is_empty() {
        for column in schema.required_columns() {
            if !table.has_column(column) {
                return Err(SchemaMismatch {
                    source_id: table.source_id.clone(),
                    column: column.to_string(),
                });
            }
        }
    }

    let mut rows = Vec::new();
    let mut issues = Vec::new();
    let mut distinct: BTreeMap<AgentKey, BTreeSet<String>> = BTreeMap::new();
    let mut reported: BTreeMap<AgentKey, u64> = BTreeMap::new();

    for (row_index, record) in table.records.iter().enumerate() {
        if !passes_status_filter(record, schema.status_filter.as_ref()) {
            continue;
        }

        let agents = agent_keys(record, &schema.agent_field);
        if agents.is_empty() {
            continue;
        }

        let seconds = row_seconds(table, record, row_index, schema, &mut issues);
        let attempts = row_attempts(table, record, row_index, &schema.attempts, &mut issues);

        match &schema.unique {
            UniqueRule::None => {}
            UniqueRule::DistinctValues { column } => {
                if let Some(contact) = record.text(column) {
                    let contact = contact.into_owned();
                    for agent in &agents {
                        distinct.entry(agent.clone()).or_default().insert(contact.clone());
                    }
                }
            }
            UniqueRule::Reported { column } => {
                let unique = count_field(table, record, row_index, column, &mut issues);
                for agent in &agents {
                    // Pre-aggregated per agent: the first reported value wins.
                    reported.entry(agent.clone()).or_insert(unique);
                }
            }
        }

        rows.push(RowContribution {
            agents,
            seconds,
            attempts,
        });
    }

    let uniques = match &schema.unique {
        UniqueRule::None => Vec::new(),
        UniqueRule::DistinctValues { .. } => distinct
            .into_iter()
            .map(|(agent, contacts)| (agent, contacts.len() as u64))
            .collect(),
        UniqueRule::Reported { .. } => reported.into_iter().collect(),
    };

    Ok(SourceBatch {
        source_id: table.source_id.clone(),
        rows,
        uniques,
        issues,
    })
}

fn passes_status_filter(record: &RawRecord, filter: Option<&StatusFilter>) -> bool {
    filter.is_none_or(|f| record.text(&f.column).as_deref() == Some(f.accept.as_str()))
}

/// Normalized, non-empty agent keys credited by one record.
fn agent_keys(record: &RawRecord, field: &AgentField) -> Vec<AgentKey> {
    let labels = match field {
        AgentField::Scalar { column } => record
            .text(column)
            .map(|raw| vec![identity::normalize(&raw)])
            .unwrap_or_default(),
        AgentField::List { column, delimiter } => record
            .text(column)
            .map(|raw| identity::split_list(&raw, delimiter))
            .unwrap_or_default(),
    };
    labels
        .into_iter()
        .filter_map(|label| AgentKey::new(label).ok())
        .collect()
}

fn row_seconds(
    table: &SourceTable,
    record: &RawRecord,
    row_index: usize,
    schema: &SourceSchema,
    issues: &mut Vec<DataIssue>,
) -> u64 {
    let raw = record.text(&schema.duration_field);
    let parsed = raw
        .as_deref()
        .ok_or(crate::duration::DurationParseError::Empty)
        .and_then(|value| parse_seconds(value, schema.duration_style));
    match parsed {
        Ok(seconds) => seconds,
        Err(error) => {
            let issue = DataIssue {
                source_id: table.source_id.clone(),
                row: row_index,
                column: schema.duration_field.clone(),
                kind: DataIssueKind::BadDuration {
                    value: raw.map(Cow::into_owned).unwrap_or_default(),
                },
            };
            tracing::warn!(%issue, %error, "duration defaulted to 0");
            issues.push(issue);
            0
        }
    }
}

fn row_attempts(
    table: &SourceTable,
    record: &RawRecord,
    row_index: usize,
    rule: &AttemptsRule,
    issues: &mut Vec<DataIssue>,
) -> u64 {
    match rule {
        AttemptsRule::CountRows => 1,
        AttemptsRule::Column { column } => count_field(table, record, row_index, column, issues),
    }
}

/// Reads a pre-aggregated count column. Absent values are zero; present but
/// non-numeric values are zero with a recorded issue.
fn count_field(
    table: &SourceTable,
    record: &RawRecord,
    row_index: usize,
    column: &str,
    issues: &mut Vec<DataIssue>,
) -> u64 {
    if let Some(count) = record.count(column) {
        return count;
    }
    if let Some(raw) = record.text(column) {
        let issue = DataIssue {
            source_id: table.source_id.clone(),
            row: row_index,
            column: column.to_string(),
            kind: DataIssueKind::BadCount {
                value: raw.into_owned(),
            },
        };
        tracing::warn!(%issue, "count defaulted to 0");
        issues.push(issue);
    }
    0
}
