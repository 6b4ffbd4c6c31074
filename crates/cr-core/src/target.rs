//! Target achievement calculation.
//!
//! Targets are configuration data: one fixed goal per department per metric.
//! Achievement is the plain ratio of actual to target, uncapped — agents over
//! target report percentages above 100.

use serde::{Deserialize, Serialize};

use crate::roster::AgentAggregate;
use crate::types::{AgentKey, ConfigError, Department};

/// The metrics agents are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Total call duration in seconds.
    TalkTime,
    /// Total call attempts.
    Attempts,
    /// Total unique contacts reached.
    UniqueContacts,
}

impl Metric {
    /// All metrics, in reporting order.
    pub const ALL: [Self; 3] = [Self::TalkTime, Self::Attempts, Self::UniqueContacts];

    /// String representation for display and diagnostics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TalkTime => "talk time",
            Self::Attempts => "attempts",
            Self::UniqueContacts => "unique contacts",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Goal values for one department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTargets {
    /// Talk-time goal in seconds.
    pub talk_seconds: u64,
    /// Call-attempt goal.
    pub attempts: u64,
    /// Unique-contact goal.
    pub unique_contacts: u64,
}

impl MetricTargets {
    /// The goal value for one metric.
    #[must_use]
    pub const fn target_for(&self, metric: Metric) -> u64 {
        match metric {
            Metric::TalkTime => self.talk_seconds,
            Metric::Attempts => self.attempts,
            Metric::UniqueContacts => self.unique_contacts,
        }
    }
}

/// Per-department goal configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets {
    pub conversion: MetricTargets,
    pub retention: MetricTargets,
}

impl Default for Targets {
    /// The production goals: Conversion agents owe 2 h 30 m of talk time and
    /// 300 unique contacts, Retention agents 4 h and 20 unique contacts, and
    /// both departments 250 call attempts.
    fn default() -> Self {
        Self {
            conversion: MetricTargets {
                talk_seconds: 9_000,
                attempts: 250,
                unique_contacts: 300,
            },
            retention: MetricTargets {
                talk_seconds: 14_400,
                attempts: 250,
                unique_contacts: 20,
            },
        }
    }
}

impl Targets {
    /// The goals that apply to one department.
    #[must_use]
    pub const fn for_department(&self, department: Department) -> &MetricTargets {
        match department {
            Department::Conversion => &self.conversion,
            Department::Retention => &self.retention,
        }
    }

    /// Rejects zero goals before any division happens.
    ///
    /// A zero target is an internal inconsistency, not a data anomaly, and
    /// aborts the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for department in [Department::Conversion, Department::Retention] {
            for metric in Metric::ALL {
                if self.for_department(department).target_for(metric) == 0 {
                    return Err(ConfigError::ZeroTarget {
                        department,
                        metric: metric.as_str(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// One agent's achievement against one metric's goal.
///
/// Derived on demand from a finalized aggregate; never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetResult {
    pub agent: AgentKey,
    pub metric: Metric,
    pub actual: u64,
    pub target: u64,
    /// Percentage of target achieved; not capped at 100.
    pub percentage: f64,
}

/// Computes one metric's achievement for a finalized aggregate.
pub fn achievement(
    aggregate: &AgentAggregate,
    metric: Metric,
    targets: &Targets,
) -> Result<TargetResult, ConfigError> {
    let actual = match metric {
        Metric::TalkTime => aggregate.total_seconds,
        Metric::Attempts => aggregate.total_attempts,
        Metric::UniqueContacts => aggregate.total_unique,
    };
    let target = targets.for_department(aggregate.department).target_for(metric);
    if target == 0 {
        return Err(ConfigError::ZeroTarget {
            department: aggregate.department,
            metric: metric.as_str(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let percentage = (actual as f64 / target as f64) * 100.0;
    Ok(TargetResult {
        agent: aggregate.key.clone(),
        metric,
        actual,
        target,
        percentage,
    })
}
