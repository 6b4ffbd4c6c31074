//! Source schema registry.
//!
//! Each vendor export uses its own column names and conventions. A
//! [`SourceSchema`] declares, for one source, which columns play which role;
//! the [`SchemaRegistry`] maps source IDs to their schemas. Supporting a new
//! vendor means registering one more schema — no extraction or aggregation
//! code changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::duration::DurationStyle;
use crate::identity::LIST_DELIMITER;
use crate::types::SourceId;

/// Where a record's agent identity lives, and its shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum AgentField {
    /// A single agent label per record.
    Scalar { column: String },
    /// Several agent labels joined by a delimiter, each credited once.
    List { column: String, delimiter: String },
}

impl AgentField {
    /// The column holding the agent identity.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Scalar { column } | Self::List { column, .. } => column,
        }
    }
}

/// How call attempts are counted for a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptsRule {
    /// One row is one attempt.
    CountRows,
    /// The source reports pre-aggregated attempt counts in a column.
    Column { column: String },
}

/// How unique contact counts are derived for a source, if at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UniqueRule {
    /// The source carries no unique-contact information.
    None,
    /// Count distinct values of a contact-identifier column per agent.
    DistinctValues { column: String },
    /// The source reports a pre-aggregated unique count in a column.
    Reported { column: String },
}

/// Keeps only rows whose status column equals the accepted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFilter {
    pub column: String,
    pub accept: String,
}

/// Column roles and conventions for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSchema {
    pub id: SourceId,
    pub agent_field: AgentField,
    pub duration_field: String,
    pub duration_style: DurationStyle,
    pub attempts: AttemptsRule,
    pub unique: UniqueRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_filter: Option<StatusFilter>,
}

impl SourceSchema {
    /// Every column this schema requires a table to have.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.agent_field.column(), self.duration_field.as_str()];
        if let AttemptsRule::Column { column } = &self.attempts {
            columns.push(column);
        }
        match &self.unique {
            UniqueRule::DistinctValues { column } | UniqueRule::Reported { column } => {
                columns.push(column);
            }
            UniqueRule::None => {}
        }
        if let Some(filter) = &self.status_filter {
            columns.push(&filter.column);
        }
        columns
    }
}

/// Lookup table from source ID to schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaRegistry {
    schemas: BTreeMap<SourceId, SourceSchema>,
}

impl SchemaRegistry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            schemas: BTreeMap::new(),
        }
    }

    /// The registry describing the production sources.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for tenant in ["summitlife", "traling", "24x"] {
            registry.insert(voiso_schema(&format!("voiso-{tenant}")));
        }
        for tenant in ["traling", "signix", "24x"] {
            registry.insert(coperato_schema(&format!("coperato-{tenant}")));
        }
        registry.insert(voicespin_schema());
        registry
    }

    /// Registers a schema, replacing any previous schema with the same ID.
    pub fn insert(&mut self, schema: SourceSchema) {
        self.schemas.insert(schema.id.clone(), schema);
    }

    /// Looks up the schema for a source.
    #[must_use]
    pub fn get(&self, id: &SourceId) -> Option<&SourceSchema> {
        self.schemas.get(id)
    }

    /// Iterates schemas in source-ID order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceSchema> {
        self.schemas.values()
    }

    /// Number of registered sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry has no schemas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn source_id(id: &str) -> SourceId {
    SourceId::new(id).expect("builtin source IDs are non-empty")
}

/// Dialer exports credit every agent on the call in one `Agent(s)` field and
/// carry no status column; every exported row is a completed attempt.
fn voiso_schema(id: &str) -> SourceSchema {
    SourceSchema {
        id: source_id(id),
        agent_field: AgentField::List {
            column: "Agent(s)".to_string(),
            delimiter: LIST_DELIMITER.to_string(),
        },
        duration_field: "Talk time".to_string(),
        duration_style: DurationStyle::ClockTime,
        attempts: AttemptsRule::CountRows,
        unique: UniqueRule::DistinctValues {
            column: "DNIS/To".to_string(),
        },
        status_filter: None,
    }
}

/// PBX exports are pre-aggregated per agent: attempts and uniques arrive as
/// columns, and only `ANSWERED` dispositions count.
fn coperato_schema(id: &str) -> SourceSchema {
    SourceSchema {
        id: source_id(id),
        agent_field: AgentField::Scalar {
            column: "Name".to_string(),
        },
        duration_field: "Duration".to_string(),
        duration_style: DurationStyle::ClockTime,
        attempts: AttemptsRule::Column {
            column: "Call Attempts".to_string(),
        },
        unique: UniqueRule::Reported {
            column: "Unique".to_string(),
        },
        status_filter: Some(StatusFilter {
            column: "Disposition".to_string(),
            accept: "ANSWERED".to_string(),
        }),
    }
}

/// Per-call export with hyphenated agent extensions and the trailing-zero
/// duration quirk; only answered calls count.
fn voicespin_schema() -> SourceSchema {
    SourceSchema {
        id: source_id("voicespin"),
        agent_field: AgentField::Scalar {
            column: "AGENT".to_string(),
        },
        duration_field: "BILLSEC".to_string(),
        duration_style: DurationStyle::TrailingZeroQuirk,
        attempts: AttemptsRule::CountRows,
        unique: UniqueRule::DistinctValues {
            column: "CALL ID".to_string(),
        },
        status_filter: Some(StatusFilter {
            column: "CALL STATUS".to_string(),
            accept: "ANSWERED".to_string(),
        }),
    }
}
