//! Per-agent accumulation across sources.
//!
//! Folds extraction batches into per-agent, per-source running totals.
//! Accumulation is associative and commutative, so sources may be applied in
//! any order — or aggregated independently and merged — without changing the
//! final totals. Each source must be applied exactly once per run; the store
//! enforces this.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::extract::SourceBatch;
use crate::types::{AgentKey, ConfigError, SourceId};

/// Running totals for one agent within one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceTotals {
    pub seconds: u64,
    pub attempts: u64,
    pub unique: u64,
}

impl SourceTotals {
    /// Whether this contribution is entirely zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.seconds == 0 && self.attempts == 0 && self.unique == 0
    }
}

/// Accumulated activity for one agent across all sources seen so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentActivity {
    pub total_seconds: u64,
    pub total_attempts: u64,
    pub per_source: BTreeMap<SourceId, SourceTotals>,
}

impl AgentActivity {
    /// Sum of per-source unique-contact counts.
    #[must_use]
    pub fn total_unique(&self) -> u64 {
        self.per_source.values().map(|totals| totals.unique).sum()
    }
}

/// The accumulation store: one [`AgentActivity`] per canonical agent key.
///
/// The aggregator is the only writer in the pipeline; everything downstream
/// of it reads a finished store.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    activity: BTreeMap<AgentKey, AgentActivity>,
    seen_sources: BTreeSet<SourceId>,
}

impl Aggregates {
    /// An empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            activity: BTreeMap::new(),
            seen_sources: BTreeSet::new(),
        }
    }

    /// Folds one source's batch into the store.
    ///
    /// Applying the same source twice is a [`ConfigError::DuplicateSource`]:
    /// it would double-count every contribution.
    pub fn apply_batch(&mut self, batch: &SourceBatch) -> Result<(), ConfigError> {
        if !self.seen_sources.insert(batch.source_id.clone()) {
            return Err(ConfigError::DuplicateSource {
                source: batch.source_id.clone(),
            });
        }

        for row in &batch.rows {
            for agent in &row.agents {
                let activity = self.activity.entry(agent.clone()).or_default();
                activity.total_seconds += row.seconds;
                activity.total_attempts += row.attempts;
                let per_source = activity.per_source.entry(batch.source_id.clone()).or_default();
                per_source.seconds += row.seconds;
                per_source.attempts += row.attempts;
            }
        }

        // Unique counts arrive pre-aggregated per (agent, source) and are set
        // once, never added across rows.
        for (agent, unique) in &batch.uniques {
            let activity = self.activity.entry(agent.clone()).or_default();
            let per_source = activity.per_source.entry(batch.source_id.clone()).or_default();
            per_source.unique = *unique;
        }

        Ok(())
    }

    /// Merges two stores built from disjoint source sets.
    ///
    /// Used to reduce independent per-source partial aggregates into one
    /// store. Overlapping source sets are a [`ConfigError::DuplicateSource`].
    pub fn merge(mut self, other: Self) -> Result<Self, ConfigError> {
        if let Some(source) = self.seen_sources.intersection(&other.seen_sources).next() {
            return Err(ConfigError::DuplicateSource {
                source: source.clone(),
            });
        }
        self.seen_sources.extend(other.seen_sources);

        for (agent, incoming) in other.activity {
            let activity = self.activity.entry(agent).or_default();
            activity.total_seconds += incoming.total_seconds;
            activity.total_attempts += incoming.total_attempts;
            for (source, totals) in incoming.per_source {
                // Sources are disjoint, so each per-source entry exists on
                // exactly one side.
                activity.per_source.insert(source, totals);
            }
        }
        Ok(self)
    }

    /// Looks up one agent's accumulated activity.
    #[must_use]
    pub fn get(&self, agent: &AgentKey) -> Option<&AgentActivity> {
        self.activity.get(agent)
    }

    /// Iterates agents and their activity in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&AgentKey, &AgentActivity)> {
        self.activity.iter()
    }

    /// Sources applied so far, in ID order.
    pub fn sources(&self) -> impl Iterator<Item = &SourceId> {
        self.seen_sources.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RowContribution;

    fn key(name: &str) -> AgentKey {
        AgentKey::new(name).unwrap()
    }

    fn source(id: &str) -> SourceId {
        SourceId::new(id).unwrap()
    }

    fn batch(id: &str, rows: Vec<RowContribution>, uniques: Vec<(AgentKey, u64)>) -> SourceBatch {
        SourceBatch {
            source_id: source(id),
            rows,
            uniques,
            issues: Vec::new(),
        }
    }

    fn row(agents: &[&str], seconds: u64, attempts: u64) -> RowContribution {
        RowContribution {
            agents: agents.iter().map(|a| key(a)).collect(),
            seconds,
            attempts,
        }
    }

    fn sample_batches() -> Vec<SourceBatch> {
        vec![
            batch(
                "voiso-traling",
                vec![row(&["ann", "bob"], 90, 1), row(&["ann"], 60, 1)],
                vec![(key("ann"), 2), (key("bob"), 1)],
            ),
            batch(
                "coperato-signix",
                vec![row(&["ann"], 600, 4)],
                vec![(key("ann"), 3)],
            ),
            batch("voicespin", vec![row(&["bob"], 30, 1)], vec![(key("bob"), 1)]),
        ]
    }

    #[test]
    fn totals_accumulate_across_rows_and_sources() {
        let mut aggregates = Aggregates::new();
        for batch in sample_batches() {
            aggregates.apply_batch(&batch).unwrap();
        }

        let ann = aggregates.get(&key("ann")).unwrap();
        assert_eq!(ann.total_seconds, 750);
        assert_eq!(ann.total_attempts, 6);
        assert_eq!(ann.total_unique(), 5);
        assert_eq!(ann.per_source[&source("voiso-traling")].seconds, 150);
        assert_eq!(ann.per_source[&source("coperato-signix")].attempts, 4);

        let bob = aggregates.get(&key("bob")).unwrap();
        assert_eq!(bob.total_seconds, 120);
        assert_eq!(bob.total_attempts, 2);
        assert_eq!(bob.total_unique(), 2);
    }

    #[test]
    fn duplicate_agents_in_one_row_are_each_credited() {
        let mut aggregates = Aggregates::new();
        aggregates
            .apply_batch(&batch(
                "voiso-traling",
                vec![row(&["ann", "bob", "ann"], 90, 1)],
                Vec::new(),
            ))
            .unwrap();

        assert_eq!(aggregates.get(&key("ann")).unwrap().total_seconds, 180);
        assert_eq!(aggregates.get(&key("ann")).unwrap().total_attempts, 2);
        assert_eq!(aggregates.get(&key("bob")).unwrap().total_seconds, 90);
    }

    #[test]
    fn source_order_does_not_change_totals() {
        let batches = sample_batches();

        let mut forward = Aggregates::new();
        for batch in &batches {
            forward.apply_batch(batch).unwrap();
        }

        let mut reverse = Aggregates::new();
        for batch in batches.iter().rev() {
            reverse.apply_batch(batch).unwrap();
        }

        let forward_view: Vec<_> = forward.iter().collect();
        let reverse_view: Vec<_> = reverse.iter().collect();
        assert_eq!(forward_view, reverse_view);
    }

    #[test]
    fn merging_partial_aggregates_matches_sequential_application() {
        let batches = sample_batches();

        let mut sequential = Aggregates::new();
        for batch in &batches {
            sequential.apply_batch(batch).unwrap();
        }

        let merged = batches
            .iter()
            .map(|batch| {
                let mut partial = Aggregates::new();
                partial.apply_batch(batch).unwrap();
                partial
            })
            .try_fold(Aggregates::new(), Aggregates::merge)
            .unwrap();

        assert_eq!(
            sequential.iter().collect::<Vec<_>>(),
            merged.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn applying_a_source_twice_is_rejected() {
        let mut aggregates = Aggregates::new();
        let batch = batch("voicespin", vec![row(&["ann"], 10, 1)], Vec::new());
        aggregates.apply_batch(&batch).unwrap();

        let error = aggregates.apply_batch(&batch).unwrap_err();
        assert_eq!(
            error,
            ConfigError::DuplicateSource {
                source: source("voicespin")
            }
        );
    }

    #[test]
    fn merging_overlapping_source_sets_is_rejected() {
        let batch = batch("voicespin", vec![row(&["ann"], 10, 1)], Vec::new());
        let mut left = Aggregates::new();
        left.apply_batch(&batch).unwrap();
        let mut right = Aggregates::new();
        right.apply_batch(&batch).unwrap();

        assert!(left.merge(right).is_err());
    }

    #[test]
    fn unique_counts_are_set_not_added() {
        let mut aggregates = Aggregates::new();
        aggregates
            .apply_batch(&batch(
                "voiso-traling",
                vec![row(&["ann"], 60, 1), row(&["ann"], 60, 1)],
                vec![(key("ann"), 2)],
            ))
            .unwrap();

        let ann = aggregates.get(&key("ann")).unwrap();
        assert_eq!(ann.per_source[&source("voiso-traling")].unique, 2);
        assert_eq!(ann.total_unique(), 2);
    }
}
