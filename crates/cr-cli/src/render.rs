//! Report rendering.
//!
//! Formats a reconciliation outcome as a human-readable text report or as
//! JSON for machine consumers. Rows group by desk in the configured display
//! order and sort by talk-time achievement within each desk.

use std::collections::BTreeMap;
use std::fmt::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use cr_core::{
    AgentAggregate, Metric, ReconcileOutcome, SourceTotals, TargetResult, Targets, achievement,
};
use serde::Serialize;

use crate::config::DeskOrder;

// ========== Value Formatting ==========

/// Formats whole seconds as an `H h M m S s` style duration, eliding leading
/// zero units.
#[must_use]
pub fn format_seconds(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours} h {minutes} m {seconds} s")
    } else if minutes > 0 {
        format!("{minutes} m {seconds} s")
    } else {
        format!("{seconds} s")
    }
}

/// Formats an achievement percentage with two decimals.
#[must_use]
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.2}%")
}

/// Title-cases a canonical agent key for display.
#[must_use]
pub fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ========== Row Scoring ==========

/// One agent with its three achievement results, ready for display.
struct ScoredAgent<'a> {
    aggregate: &'a AgentAggregate,
    talk: TargetResult,
    attempts: TargetResult,
    unique: TargetResult,
}

/// Computes achievements and sorts rows by desk order, then talk-time
/// achievement descending, then key.
fn score_department<'a>(
    agents: &'a [AgentAggregate],
    targets: &Targets,
    desk_order: &[String],
) -> Result<Vec<ScoredAgent<'a>>> {
    let mut scored = Vec::with_capacity(agents.len());
    for aggregate in agents {
        scored.push(ScoredAgent {
            aggregate,
            talk: achievement(aggregate, Metric::TalkTime, targets)?,
            attempts: achievement(aggregate, Metric::Attempts, targets)?,
            unique: achievement(aggregate, Metric::UniqueContacts, targets)?,
        });
    }
    scored.sort_by(|a, b| {
        DeskOrder::rank(desk_order, &a.aggregate.desk)
            .cmp(&DeskOrder::rank(desk_order, &b.aggregate.desk))
            .then_with(|| a.aggregate.desk.cmp(&b.aggregate.desk))
            .then_with(|| b.talk.percentage.total_cmp(&a.talk.percentage))
            .then_with(|| a.aggregate.key.cmp(&b.aggregate.key))
    });
    Ok(scored)
}

// ========== Human-Readable Report ==========

fn write_department(
    output: &mut String,
    heading: &str,
    agents: &[AgentAggregate],
    targets: &Targets,
    desk_order: &[String],
) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "{heading}")?;
    writeln!(output, "{}", "─".repeat(heading.len()))?;

    if agents.is_empty() {
        writeln!(output, "(no agents)")?;
        return Ok(());
    }

    let scored = score_department(agents, targets, desk_order)?;
    let mut current_desk: Option<&str> = None;

    for row in &scored {
        let desk = row.aggregate.desk.as_str();
        if current_desk != Some(desk) {
            writeln!(output, "{desk}")?;
            current_desk = Some(desk);
        }

        writeln!(
            output,
            "  {:<24}talk {} ({})  attempts {} ({})  unique {} ({})",
            title_case(row.aggregate.key.as_str()),
            format_seconds(row.talk.actual),
            format_percentage(row.talk.percentage),
            row.attempts.actual,
            format_percentage(row.attempts.percentage),
            row.unique.actual,
            format_percentage(row.unique.percentage),
        )?;

        if !row.aggregate.per_source.is_empty() {
            let breakdown = row
                .aggregate
                .per_source
                .iter()
                .map(|(source, totals)| {
                    format!(
                        "{source}: {} s / {} att / {} uniq",
                        totals.seconds, totals.attempts, totals.unique
                    )
                })
                .collect::<Vec<_>>()
                .join("; ");
            writeln!(output, "    sources: {breakdown}")?;
        }
    }
    Ok(())
}

/// Formats the human-readable report.
pub fn format_report(
    outcome: &ReconcileOutcome,
    targets: &Targets,
    desk_order: &DeskOrder,
) -> Result<String> {
    let mut output = String::new();
    writeln!(output, "CALL ACTIVITY REPORT")?;

    write_department(
        &mut output,
        "CONVERSION",
        &outcome.conversion,
        targets,
        &desk_order.conversion,
    )?;
    write_department(
        &mut output,
        "RETENTION",
        &outcome.retention,
        targets,
        &desk_order.retention,
    )?;

    writeln!(output)?;
    writeln!(output, "UNMATCHED AGENTS")?;
    writeln!(output, "────────────────")?;
    if outcome.unmatched.is_empty() {
        writeln!(output, "(none)")?;
    } else {
        for (source, keys) in outcome.unmatched.iter() {
            let names = keys
                .iter()
                .map(|key| title_case(key.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(output, "{source}: {names}")?;
        }
    }

    if !outcome.issues.is_empty() || !outcome.skipped.is_empty() {
        writeln!(output)?;
        writeln!(output, "DATA QUALITY")?;
        writeln!(output, "────────────")?;
        for skip in &outcome.skipped {
            writeln!(output, "skipped {}: {}", skip.source_id, skip.reason)?;
        }
        for issue in &outcome.issues {
            writeln!(output, "{issue}")?;
        }
    }

    Ok(output)
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub generated_at: String,
    pub conversion: Vec<JsonAgent>,
    pub retention: Vec<JsonAgent>,
    pub unmatched: BTreeMap<String, Vec<String>>,
    pub issues: Vec<String>,
    pub skipped: Vec<JsonSkippedSource>,
}

#[derive(Debug, Serialize)]
pub struct JsonAgent {
    pub agent: String,
    pub desk: String,
    pub total_seconds: u64,
    pub total_attempts: u64,
    pub total_unique: u64,
    pub talk_time: TargetResult,
    pub attempts: TargetResult,
    pub unique_contacts: TargetResult,
    pub per_source: BTreeMap<String, SourceTotals>,
}

#[derive(Debug, Serialize)]
pub struct JsonSkippedSource {
    pub source: String,
    pub reason: String,
}

fn json_agents(
    agents: &[AgentAggregate],
    targets: &Targets,
    desk_order: &[String],
) -> Result<Vec<JsonAgent>> {
    let scored = score_department(agents, targets, desk_order)?;
    Ok(scored
        .into_iter()
        .map(|row| JsonAgent {
            agent: row.aggregate.key.as_str().to_string(),
            desk: row.aggregate.desk.clone(),
            total_seconds: row.aggregate.total_seconds,
            total_attempts: row.aggregate.total_attempts,
            total_unique: row.aggregate.total_unique,
            talk_time: row.talk,
            attempts: row.attempts,
            unique_contacts: row.unique,
            per_source: row
                .aggregate
                .per_source
                .iter()
                .map(|(source, totals)| (source.as_str().to_string(), *totals))
                .collect(),
        })
        .collect())
}

/// Formats the report as pretty-printed JSON.
pub fn format_report_json(
    outcome: &ReconcileOutcome,
    targets: &Targets,
    desk_order: &DeskOrder,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let report = JsonReport {
        generated_at: generated_at.to_rfc3339(),
        conversion: json_agents(&outcome.conversion, targets, &desk_order.conversion)?,
        retention: json_agents(&outcome.retention, targets, &desk_order.retention)?,
        unmatched: outcome
            .unmatched
            .iter()
            .map(|(source, keys)| {
                (
                    source.as_str().to_string(),
                    keys.iter().map(|key| key.as_str().to_string()).collect(),
                )
            })
            .collect(),
        issues: outcome.issues.iter().map(ToString::to_string).collect(),
        skipped: outcome
            .skipped
            .iter()
            .map(|skip| JsonSkippedSource {
                source: skip.source_id.as_str().to_string(),
                reason: skip.reason.to_string(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
