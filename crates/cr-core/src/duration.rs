//! Duration string parsing.
//!
//! Vendor exports encode call durations as colon-delimited clock strings, but
//! disagree on the details. The generic convention is two tokens for `MM:SS`
//! and three for `HH:MM:SS`. One vendor occasionally appends a spurious
//! trailing zero-seconds token to an `MM:SS` value, which
//! [`DurationStyle::TrailingZeroQuirk`] compensates for.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which vendor duration convention applies to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationStyle {
    /// Two tokens are `MM:SS`, three tokens are `HH:MM:SS`.
    ClockTime,
    /// As [`ClockTime`](Self::ClockTime), except a three-token value ending in
    /// the literal token `00` drops that token and re-parses as `MM:SS`.
    ///
    /// A three-token value whose final token is anything other than `00` is
    /// taken as a genuine `HH:MM:SS`. Earlier revisions of the upstream export
    /// handling always collapsed three tokens to `MM:SS`; the behavior kept
    /// here matches the revision that shipped last.
    TrailingZeroQuirk,
}

/// Failure to parse a duration value.
///
/// Always recoverable: callers substitute zero seconds and record a
/// data-quality issue rather than aborting the source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    /// The value was absent or contained only whitespace.
    #[error("empty duration value")]
    Empty,

    /// The value did not have a recognized token count.
    #[error("unexpected duration format: {value:?}")]
    Format { value: String },

    /// A token was not an unsigned integer.
    #[error("non-numeric duration token in {value:?}")]
    NonNumeric { value: String },
}

/// Parses a duration string into whole seconds under the given style.
pub fn parse_seconds(raw: &str, style: DurationStyle) -> Result<u64, DurationParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut tokens: Vec<&str> = raw.split(':').collect();

    if style == DurationStyle::TrailingZeroQuirk && tokens.len() == 3 && tokens[2] == "00" {
        tokens.pop();
    }

    let parse_token = |token: &str| {
        token
            .trim()
            .parse::<u64>()
            .map_err(|_| DurationParseError::NonNumeric {
                value: raw.to_string(),
            })
    };

    match tokens.as_slice() {
        [minutes, seconds] => Ok(parse_token(minutes)? * 60 + parse_token(seconds)?),
        [hours, minutes, seconds] => {
            Ok(parse_token(hours)? * 3600 + parse_token(minutes)? * 60 + parse_token(seconds)?)
        }
        _ => Err(DurationParseError::Format {
            value: raw.to_string(),
        }),
    }
}
