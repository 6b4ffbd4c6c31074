//! The reconciliation pipeline.
//!
//! Runs the full single pass over a batch of loaded tables: extraction per
//! source (in parallel — accumulation is associative and commutative, so
//! source order cannot affect totals), aggregation, and roster matching.
//! Row- and source-level problems are collected into the outcome; only
//! configuration errors abort the run.

use std::fmt;

use rayon::prelude::*;

use crate::aggregate::Aggregates;
use crate::extract::{self, DataIssue, SourceBatch};
use crate::record::SourceTable;
use crate::roster::{AgentAggregate, MatchOutcome, Roster, UnmatchedAgents};
use crate::schema::SchemaRegistry;
use crate::types::{ConfigError, SourceId};

/// Why a whole source was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The registry has no schema for the source.
    UnknownSource,
    /// The table lacks a column the schema declares.
    MissingColumn { column: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSource => write!(f, "no schema registered"),
            Self::MissingColumn { column } => write!(f, "required column {column:?} is missing"),
        }
    }
}

/// A source that was skipped whole, with its diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub source_id: SourceId,
    pub reason: SkipReason,
}

/// Everything the reconciliation pass produces.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    /// Department 1 agents with their totals, in key order.
    pub conversion: Vec<AgentAggregate>,
    /// Department 2 agents with their totals, in key order.
    pub retention: Vec<AgentAggregate>,
    /// Activity keys with no roster match, grouped by source.
    pub unmatched: UnmatchedAgents,
    /// Row-level data-quality problems, in table order.
    pub issues: Vec<DataIssue>,
    /// Sources skipped whole, in table order.
    pub skipped: Vec<SkippedSource>,
}

enum Step {
    Extracted(SourceBatch),
    Skipped(SkippedSource),
}

/// Reconciles a batch of loaded tables against the roster.
///
/// Tables may arrive in any order. Submitting the same source twice is a
/// fatal [`ConfigError::DuplicateSource`].
pub fn reconcile(
    tables: &[SourceTable],
    registry: &SchemaRegistry,
    roster: &Roster,
) -> Result<ReconcileOutcome, ConfigError> {
    let steps: Vec<Step> = tables
        .par_iter()
        .map(|table| extract_step(table, registry))
        .collect();

    let mut aggregates = Aggregates::new();
    let mut issues = Vec::new();
    let mut skipped = Vec::new();

    for step in steps {
        match step {
            Step::Extracted(batch) => {
                issues.extend(batch.issues.iter().cloned());
                aggregates.apply_batch(&batch)?;
            }
            Step::Skipped(skip) => skipped.push(skip),
        }
    }

    let MatchOutcome {
        conversion,
        retention,
        unmatched,
    } = crate::roster::match_roster(&aggregates, roster);

    tracing::debug!(
        sources = aggregates.sources().count(),
        conversion = conversion.len(),
        retention = retention.len(),
        unmatched = unmatched.len(),
        issues = issues.len(),
        "reconciliation pass complete"
    );

    Ok(ReconcileOutcome {
        conversion,
        retention,
        unmatched,
        issues,
        skipped,
    })
}

fn extract_step(table: &SourceTable, registry: &SchemaRegistry) -> Step {
    let Some(schema) = registry.get(&table.source_id) else {
        tracing::warn!(source = %table.source_id, "no schema registered, source skipped");
        return Step::Skipped(SkippedSource {
            source_id: table.source_id.clone(),
            reason: SkipReason::UnknownSource,
        });
    };
    match extract::extract(table, schema) {
        Ok(batch) => Step::Extracted(batch),
        Err(mismatch) => {
            tracing::warn!(%mismatch, "schema mismatch, source skipped");
            Step::Skipped(SkippedSource {
                source_id: mismatch.source_id,
                reason: SkipReason::MissingColumn {
                    column: mismatch.column,
                },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;
    use crate::roster::RosterRow;
    use crate::types::AgentKey;
    use serde_json::json;

    fn table(source: &str, rows: serde_json::Value) -> SourceTable {
        let records: Vec<RawRecord> = serde_json::from_value(rows).unwrap();
        SourceTable::new(SourceId::new(source).unwrap(), records)
    }

    fn roster() -> Roster {
        Roster::from_rows(vec![
            RosterRow {
                agent: "Jane Doe".to_string(),
                desk: "Team A".to_string(),
                department: 1,
            },
            RosterRow {
                agent: "Ann Onymous".to_string(),
                desk: "Japan Team".to_string(),
                department: 2,
            },
        ])
        .unwrap()
    }

    fn sample_tables() -> Vec<SourceTable> {
        vec![
            table(
                "coperato-traling",
                json!([
                    {"Name": "jane doe - 9", "Duration": "45:00", "Call Attempts": 3, "Unique": 5, "Disposition": "ANSWERED"}
                ]),
            ),
            table(
                "voiso-traling",
                json!([
                    {"Agent(s)": "Ann Onymous; Jane Doe", "Talk time": "1:00", "DNIS/To": "555-0001"},
                    {"Agent(s)": "Nobody We Know", "Talk time": "2:00", "DNIS/To": "555-0002"}
                ]),
            ),
            table(
                "voicespin",
                json!([
                    {"AGENT": "Ann Onymous - 12", "BILLSEC": "1:30:00", "CALL ID": "c-1", "CALL STATUS": "ANSWERED"}
                ]),
            ),
        ]
    }

    #[test]
    fn end_to_end_scenario_credits_the_rostered_agent() {
        let outcome = reconcile(
            &sample_tables()[..1],
            &SchemaRegistry::builtin(),
            &roster(),
        )
        .unwrap();

        let jane = outcome
            .conversion
            .iter()
            .find(|a| a.key.as_str() == "jane doe")
            .unwrap();
        assert_eq!(jane.total_seconds, 2700);
        assert_eq!(jane.total_attempts, 3);
        assert_eq!(jane.total_unique, 5);
        assert_eq!(jane.desk, "Team A");
    }

    #[test]
    fn table_order_does_not_change_the_outcome() {
        let registry = SchemaRegistry::builtin();
        let roster = roster();
        let mut tables = sample_tables();

        let forward = reconcile(&tables, &registry, &roster).unwrap();
        tables.reverse();
        let reverse = reconcile(&tables, &registry, &roster).unwrap();

        assert_eq!(forward.conversion, reverse.conversion);
        assert_eq!(forward.retention, reverse.retention);
        assert_eq!(forward.unmatched, reverse.unmatched);
    }

    #[test]
    fn unknown_keys_surface_per_source_and_never_in_buckets() {
        let outcome = reconcile(&sample_tables(), &SchemaRegistry::builtin(), &roster()).unwrap();

        let unmatched: Vec<_> = outcome.unmatched.iter().collect();
        assert_eq!(unmatched.len(), 1);
        let (source, keys) = &unmatched[0];
        assert_eq!(source.as_str(), "voiso-traling");
        assert!(keys.contains(&AgentKey::new("nobody we know").unwrap()));
        assert!(
            outcome
                .conversion
                .iter()
                .chain(&outcome.retention)
                .all(|a| a.key.as_str() != "nobody we know")
        );
    }

    #[test]
    fn a_mismatched_source_is_skipped_without_affecting_others() {
        let mut tables = sample_tables();
        // Strip the duration column from the voicespin table.
        tables[2] = table(
            "voicespin",
            json!([
                {"AGENT": "Ann Onymous - 12", "CALL ID": "c-1", "CALL STATUS": "ANSWERED"}
            ]),
        );
        let outcome = reconcile(&tables, &SchemaRegistry::builtin(), &roster()).unwrap();

        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].source_id.as_str(), "voicespin");
        assert_eq!(
            outcome.skipped[0].reason,
            SkipReason::MissingColumn {
                column: "BILLSEC".to_string()
            }
        );
        // The other sources still contributed.
        let jane = outcome
            .conversion
            .iter()
            .find(|a| a.key.as_str() == "jane doe")
            .unwrap();
        assert_eq!(jane.total_seconds, 2760);
    }

    #[test]
    fn unregistered_sources_are_skipped_with_a_diagnostic() {
        let tables = vec![table(
            "mystery-dialer",
            json!([{"Agent": "Jane Doe", "Duration": "1:00"}]),
        )];
        let outcome = reconcile(&tables, &SchemaRegistry::builtin(), &roster()).unwrap();

        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].reason, SkipReason::UnknownSource);
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn duplicate_tables_for_one_source_abort_the_run() {
        let tables = vec![sample_tables().remove(0), sample_tables().remove(0)];
        let error = reconcile(&tables, &SchemaRegistry::builtin(), &roster()).unwrap_err();
        assert!(matches!(error, ConfigError::DuplicateSource { .. }));
    }

    #[test]
    fn issues_from_all_sources_are_collected() {
        let tables = vec![
            table(
                "voiso-traling",
                json!([{"Agent(s)": "Jane Doe", "Talk time": "bogus", "DNIS/To": "555-0001"}]),
            ),
            table(
                "voicespin",
                json!([
                    {"AGENT": "Jane Doe", "BILLSEC": "??", "CALL ID": "c-1", "CALL STATUS": "ANSWERED"}
                ]),
            ),
        ];
        let outcome = reconcile(&tables, &SchemaRegistry::builtin(), &roster()).unwrap();

        assert_eq!(outcome.issues.len(), 2);
        let jane = outcome
            .conversion
            .iter()
            .find(|a| a.key.as_str() == "jane doe")
            .unwrap();
        assert_eq!(jane.total_seconds, 0);
        assert_eq!(jane.total_attempts, 2);
    }

    #[test]
    fn zero_activity_roster_agents_still_report() {
        let outcome = reconcile(&[], &SchemaRegistry::builtin(), &roster()).unwrap();
        assert_eq!(outcome.conversion.len(), 1);
        assert_eq!(outcome.retention.len(), 1);
        assert_eq!(outcome.retention[0].total_seconds, 0);
    }
}
