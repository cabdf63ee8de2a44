use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::Tag;

/// Raw crisis / news item as delivered by the geopolitical signal source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSignalItem {
    #[serde(alias = "source_id")]
    pub source_id: String,
    pub headline: String,
    /// RFC 3339 preferred; `YYYY-MM-DD HH:MM:SS` (UTC) and bare dates are accepted.
    #[serde(alias = "published_at")]
    pub published_at: String,
    #[serde(default, alias = "affected_industries")]
    pub affected_industries: Vec<String>,
    #[serde(default, alias = "affected_regions")]
    pub affected_regions: Vec<String>,
    #[serde(alias = "raw_severity")]
    pub raw_severity: f64,
}

/// Normalized geopolitical signal. Immutable once inside the window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub source_id: String,
    pub headline: String,
    pub published_at: DateTime<Utc>,
    pub affected_industries: BTreeSet<Tag>,
    pub affected_regions: BTreeSet<Tag>,
    /// In `[0, 1]`.
    pub raw_severity: f64,
}

/// A signal paired with its recency-decayed severity at a given `now`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveSignal {
    pub signal: Signal,
    pub effective_severity: f64,
}

/// What an assessment cites as its correlated event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalRef {
    pub source_id: String,
    pub headline: String,
    pub published_at: DateTime<Utc>,
    pub effective_severity: f64,
    /// The loan attribute that matched (industry tag, or region tag).
    pub matched_on: MatchedOn,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tag", rename_all = "snake_case")]
pub enum MatchedOn {
    Industry(Tag),
    Region(Tag),
}

impl MatchedOn {
    pub fn tag(&self) -> &Tag {
        match self {
            MatchedOn::Industry(t) | MatchedOn::Region(t) => t,
        }
    }
}

impl SignalRef {
    pub fn from_active(active: &ActiveSignal, matched_on: MatchedOn) -> Self {
        Self {
            source_id: active.signal.source_id.clone(),
            headline: active.signal.headline.clone(),
            published_at: active.signal.published_at,
            effective_severity: active.effective_severity,
            matched_on,
        }
    }
}
