//! Sources command: list the registered source schemas.

use anyhow::Result;
use cr_core::{AgentField, AttemptsRule, SchemaRegistry, SourceSchema, UniqueRule};

/// Runs the sources command.
pub fn run(json: bool) -> Result<()> {
    let registry = SchemaRegistry::builtin();

    if json {
        let schemas: Vec<&SourceSchema> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    for schema in registry.iter() {
        let agent = match &schema.agent_field {
            AgentField::Scalar { column } => format!("{column} (scalar)"),
            AgentField::List { column, .. } => format!("{column} (list)"),
        };
        let attempts = match &schema.attempts {
            AttemptsRule::CountRows => "one per row".to_string(),
            AttemptsRule::Column { column } => format!("column {column}"),
        };
        let unique = match &schema.unique {
            UniqueRule::None => "none".to_string(),
            UniqueRule::DistinctValues { column } => format!("distinct {column}"),
            UniqueRule::Reported { column } => format!("column {column}"),
        };
        println!("{}", schema.id);
        println!("  agent:    {agent}");
        println!("  duration: {}", schema.duration_field);
        println!("  attempts: {attempts}");
        println!("  unique:   {unique}");
        if let Some(filter) = &schema.status_filter {
            println!("  filter:   {} = {}", filter.column, filter.accept);
        }
    }

    Ok(())
}
