//! Agent identity normalization.
//!
//! Every vendor labels agents differently: plain display names, names with a
//! numeric extension appended after a hyphen ("Jane Doe - 104"), or several
//! names joined into one field. Normalization reduces all of them to the
//! canonical lowercase key the roster is matched against.

use std::sync::LazyLock;

use regex::Regex;

/// Delimiter used by sources that credit several agents in one field.
pub const LIST_DELIMITER: &str = "; ";

/// Pre-compiled regex for a trailing run of digits and preceding whitespace.
static TRAILING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d+\s*$").expect("valid trailing-digits regex"));

/// Normalizes a raw agent label into a canonical key.
///
/// Trims whitespace, keeps only the text before the first hyphen, strips one
/// trailing run of digits (and the whitespace before it), and lowercases.
/// The result may be empty — callers must filter empty keys out rather than
/// aggregate them.
///
/// Normalization is idempotent: `normalize(normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let before_hyphen = trimmed.split('-').next().unwrap_or(trimmed).trim();
    let stripped = TRAILING_DIGITS_RE.replace(before_hyphen, "");
    stripped.trim().to_lowercase()
}

/// Splits a delimiter-joined multi-agent field and normalizes each element.
///
/// Order is preserved and duplicates are kept: each element represents one
/// name credited for the record. Elements that normalize to the empty string
/// are included as-is for the caller to filter.
#[must_use]
pub fn split_list(raw: &str, delimiter: &str) -> Vec<String> {
    raw.split(delimiter).map(normalize).collect()
}
