//! Core reconciliation logic for call-activity reports.
//!
//! This crate contains the fundamental types and logic for:
//! - Duration parsing: vendor clock strings to whole seconds
//! - Identity normalization: vendor agent labels to canonical keys
//! - Extraction: raw tables to normalized contributions via per-source schemas
//! - Aggregation: per-agent, per-source accumulation
//! - Roster matching: department buckets and unmatched-identity reporting
//! - Target achievement: uncapped percentage-of-goal per metric

pub mod aggregate;
pub mod duration;
pub mod extract;
pub mod identity;
pub mod pipeline;
pub mod record;
pub mod roster;
pub mod schema;
pub mod target;
pub mod types;

pub use aggregate::{AgentActivity, Aggregates, SourceTotals};
pub use duration::{DurationParseError, DurationStyle, parse_seconds};
pub use extract::{DataIssue, DataIssueKind, SchemaMismatch, SourceBatch, extract};
pub use pipeline::{ReconcileOutcome, SkipReason, SkippedSource, reconcile};
pub use record::{RawRecord, SourceTable};
pub use roster::{AgentAggregate, MatchOutcome, Roster, RosterRow, UnmatchedAgents, match_roster};
pub use schema::{
    AgentField, AttemptsRule, SchemaRegistry, SourceSchema, StatusFilter, UniqueRule,
};
pub use target::{Metric, MetricTargets, TargetResult, Targets, achievement};
pub use types::{AgentKey, ConfigError, Department, SourceId, ValidationError};
