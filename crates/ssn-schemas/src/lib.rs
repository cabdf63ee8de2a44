//! ssn-schemas
//!
//! Interchange value objects for the risk correlation & escalation engine.
//!
//! Everything here is a plain value owned by the caller. The engine crates
//! never mutate these records; they only produce new ones.
//!
//! Units:
//! - Money is integer micros (1 currency unit = 1_000_000 micros).
//! - Timestamps are UTC.

mod assessment;
mod loan;
mod signal;

pub use assessment::*;
pub use loan::*;
pub use signal::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// 1e-6 fixed-point scale for money fields.
pub const MICROS_SCALE: i64 = 1_000_000;

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// Normalized industry / region tag.
///
/// Adapters send free-form labels ("Emerging-Market Sovereigns", "energy ").
/// Tags are folded to lowercase snake form so set intersection is exact:
/// `"Emerging-Market Sovereigns"` and `"emerging_market_sovereigns"` compare equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let mut out = String::new();
        let mut pending_sep = false;
        for c in raw.as_ref().trim().chars() {
            if c.is_whitespace() || c == '-' || c == '_' {
                pending_sep = !out.is_empty();
                continue;
            }
            if pending_sep {
                out.push('_');
                pending_sep = false;
            }
            out.extend(c.to_lowercase());
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human form used in explanation strings (`emerging_market_sovereigns` -> `emerging market sovereigns`).
    pub fn display_name(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Tag::new(s)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Tag::new(s)
    }
}

impl From<Tag> for String {
    fn from(t: Tag) -> Self {
        t.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
