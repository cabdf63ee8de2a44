//! Consumed-key registry and unused-key report.
//!
//! Every JSON pointer [`crate::EngineConfig::from_config_json`] reads is
//! listed here. A leaf outside every listed pointer is a typo or a stale key.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::leaf_pointers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// The registry this report was checked against (sorted).
    pub consumed_prefixes: Vec<String>,
    /// Leaves covered by no registry entry (sorted).
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Pointers read by the engine. List-valued keys cover their items.
pub fn consumed_pointers() -> &'static [&'static str] {
    &[
        "/assessor/default",
        "/assessor/large_exposure",
        "/assessor/probability_bump_threshold",
        "/classifier/balloon_ratio",
        "/classifier/high_risk_sectors",
        "/correlation/bump_threshold",
        "/correlation/match_regions",
        "/escalation/cooldown_minutes",
        "/escalation/cooldown_scope",
        "/signals/decay/half_life_hours",
        "/signals/decay/kind",
        "/signals/epsilon",
        "/signals/horizon_hours",
    ]
}

/// Compare the leaves of `config_json` against [`consumed_pointers`].
///
/// `Fail` turns a non-empty report into a `CONFIG_UNUSED_KEYS` error.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut consumed: Vec<String> = consumed_pointers().iter().map(|p| p.to_string()).collect();
    consumed.sort();

    let unused_leaf_pointers: Vec<String> = leaf_pointers(config_json)
        .into_iter()
        .filter(|leaf| !consumed.iter().any(|c| covers(c, leaf)))
        .collect();

    let report = UnusedKeyReport {
        consumed_prefixes: consumed,
        unused_leaf_pointers,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        let shown: Vec<&str> = report
            .unused_leaf_pointers
            .iter()
            .take(12)
            .map(String::as_str)
            .collect();
        bail!(
            "CONFIG_UNUSED_KEYS: {} config key(s) are not read by the engine: {}",
            report.unused_leaf_pointers.len(),
            shown.join(", ")
        );
    }
    Ok(report)
}

/// `/a/b` covers `/a/b` and `/a/b/...`, never `/a/bc`.
fn covers(prefix: &str, leaf: &str) -> bool {
    match leaf.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
