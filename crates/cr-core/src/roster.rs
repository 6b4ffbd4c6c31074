//! Roster loading and agent matching.
//!
//! The roster is the authoritative list of known agents: display name, desk,
//! and numeric department code. It is loaded once per run and read-only
//! afterwards. Matching against aggregated activity is exact equality on
//! canonical keys — no fuzzy or partial matching.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::aggregate::{AgentActivity, Aggregates, SourceTotals};
use crate::identity;
use crate::types::{AgentKey, ConfigError, Department, SourceId};

/// One roster row as the loading collaborator hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    /// Agent display name; canonicalized on load.
    pub agent: String,
    pub desk: String,
    /// Numeric department code; codes outside {1, 2} leave the agent in
    /// neither department.
    pub department: i64,
}

/// A known agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub key: AgentKey,
    pub desk: String,
    /// `None` for department codes that name no department; such agents are
    /// known (never unmatched) but belong to no bucket.
    pub department: Option<Department>,
}

/// The loaded roster, keyed by canonical agent key.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: BTreeMap<AgentKey, RosterEntry>,
}

impl Roster {
    /// Builds a roster from raw rows, canonicalizing display names.
    ///
    /// Rows whose name canonicalizes to the empty string are rejected the
    /// same way duplicates are: both indicate a broken roster file.
    pub fn from_rows(rows: impl IntoIterator<Item = RosterRow>) -> Result<Self, ConfigError> {
        let mut entries = BTreeMap::new();
        for row in rows {
            let key = AgentKey::new(identity::normalize(&row.agent)).map_err(|_| {
                ConfigError::BlankRosterName {
                    name: row.agent.clone(),
                }
            })?;
            let entry = RosterEntry {
                key: key.clone(),
                desk: row.desk.trim().to_string(),
                department: Department::from_code(row.department),
            };
            if entries.insert(key.clone(), entry).is_some() {
                return Err(ConfigError::DuplicateRosterKey { key });
            }
        }
        Ok(Self { entries })
    }

    /// Looks up a canonical key.
    #[must_use]
    pub fn get(&self, key: &AgentKey) -> Option<&RosterEntry> {
        self.entries.get(key)
    }

    /// Whether the key names a known agent.
    #[must_use]
    pub fn contains(&self, key: &AgentKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.values()
    }

    /// Number of roster entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A finalized per-agent view: roster attributes plus accumulated activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentAggregate {
    pub key: AgentKey,
    pub desk: String,
    pub department: Department,
    pub total_seconds: u64,
    pub total_attempts: u64,
    pub total_unique: u64,
    pub per_source: BTreeMap<SourceId, SourceTotals>,
}

/// Canonical keys that had activity but no roster match, grouped by source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnmatchedAgents {
    by_source: BTreeMap<SourceId, BTreeSet<AgentKey>>,
}

impl UnmatchedAgents {
    /// Records a key as unmatched within one source.
    pub fn insert(&mut self, source: SourceId, key: AgentKey) {
        self.by_source.entry(source).or_default().insert(key);
    }

    /// Iterates sources and their unmatched keys in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, &BTreeSet<AgentKey>)> {
        self.by_source.iter()
    }

    /// Whether any source has unmatched keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    /// Total number of unmatched keys across sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_source.values().map(BTreeSet::len).sum()
    }
}

/// Department buckets plus the unmatched set.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Department 1 agents, in key order.
    pub conversion: Vec<AgentAggregate>,
    /// Department 2 agents, in key order.
    pub retention: Vec<AgentAggregate>,
    pub unmatched: UnmatchedAgents,
}

/// Partitions aggregated activity into department buckets and unmatched keys.
///
/// Every roster agent with a department appears in its bucket even with zero
/// activity. Keys absent from the roster land in [`UnmatchedAgents`] for each
/// source where they contributed anything nonzero.
#[must_use]
pub fn match_roster(aggregates: &Aggregates, roster: &Roster) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    for entry in roster.iter() {
        let Some(department) = entry.department else {
            continue;
        };
        let activity = aggregates.get(&entry.key);
        let aggregate = AgentAggregate {
            key: entry.key.clone(),
            desk: entry.desk.clone(),
            department,
            total_seconds: activity.map_or(0, |a| a.total_seconds),
            total_attempts: activity.map_or(0, |a| a.total_attempts),
            total_unique: activity.map_or(0, AgentActivity::total_unique),
            per_source: activity.map_or_else(BTreeMap::new, |a| a.per_source.clone()),
        };
        match department {
            Department::Conversion => outcome.conversion.push(aggregate),
            Department::Retention => outcome.retention.push(aggregate),
        }
    }

    for (key, activity) in aggregates.iter() {
        if roster.contains(key) {
            continue;
        }
        for (source, totals) in &activity.per_source {
            if !totals.is_zero() {
                outcome.unmatched.insert(source.clone(), key.clone());
            }
        }
    }

    outcome
}
