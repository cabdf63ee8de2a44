//! Raw item -> [`Signal`] normalization.
//!
//! Shape and range violations are rejected, never coerced.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use ssn_schemas::{RawSignalItem, Signal, Tag};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum MalformedSignalError {
    EmptySourceId,
    /// `publishedAt` matched none of the accepted formats.
    UnparsableTimestamp { source_id: String, raw: String },
    /// `rawSeverity` outside `[0, 1]` (NaN included).
    SeverityOutOfRange { source_id: String, value: f64 },
}

impl fmt::Display for MalformedSignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedSignalError::EmptySourceId => write!(f, "signal sourceId is empty"),
            MalformedSignalError::UnparsableTimestamp { source_id, raw } => {
                write!(f, "signal '{source_id}': unparsable publishedAt '{raw}'")
            }
            MalformedSignalError::SeverityOutOfRange { source_id, value } => {
                write!(
                    f,
                    "signal '{source_id}': rawSeverity must be in [0, 1], got {value}"
                )
            }
        }
    }
}

impl std::error::Error for MalformedSignalError {}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Validate and normalize one raw item. Deterministic.
pub fn normalize_signal(raw: &RawSignalItem) -> Result<Signal, MalformedSignalError> {
    let source_id = raw.source_id.trim();
    if source_id.is_empty() {
        return Err(MalformedSignalError::EmptySourceId);
    }

    let published_at = parse_published_at(&raw.published_at).ok_or_else(|| {
        MalformedSignalError::UnparsableTimestamp {
            source_id: source_id.to_string(),
            raw: raw.published_at.clone(),
        }
    })?;

    if !(0.0..=1.0).contains(&raw.raw_severity) {
        return Err(MalformedSignalError::SeverityOutOfRange {
            source_id: source_id.to_string(),
            value: raw.raw_severity,
        });
    }

    Ok(Signal {
        source_id: source_id.to_string(),
        headline: raw.headline.trim().to_string(),
        published_at,
        affected_industries: tags(&raw.affected_industries),
        affected_regions: tags(&raw.affected_regions),
        raw_severity: raw.raw_severity,
    })
}

fn tags(raw: &[String]) -> BTreeSet<Tag> {
    raw.iter().map(Tag::new).filter(|t| !t.is_empty()).collect()
}

/// Accepted forms, in order: RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC),
/// `YYYY-MM-DDTHH:MM:SS` (UTC), bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
