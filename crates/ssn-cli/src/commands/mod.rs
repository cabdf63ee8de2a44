//! Command handler modules for ssn-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod analyze;
pub mod classify;
pub mod journal;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ssn_config::{EngineConfig, LoadedConfig, UnusedKeyPolicy};
use ssn_schemas::AssessorKind;
use tracing::{info, warn};

/// Env var holding comma-separated config paths when `--config` is absent.
pub const ENV_CONFIG_PATHS: &str = "SSN_CONFIG";

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Parse a CLI `--assessor` string into an [`AssessorKind`].
pub fn parse_assessor(s: &str) -> Result<AssessorKind> {
    AssessorKind::parse(s).with_context(|| {
        format!(
            "invalid --assessor '{}'. expected one of: rule_based | exposure_weighted",
            s
        )
    })
}

/// Parse `--now`, defaulting to the wall clock.
pub fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => {
            let t = DateTime::parse_from_rfc3339(s.trim())
                .with_context(|| format!("invalid --now '{}'. expected RFC 3339", s))?;
            Ok(t.with_timezone(&Utc))
        }
        None => Ok(Utc::now()),
    }
}

/// Explicit `--config` paths win; otherwise `SSN_CONFIG`; otherwise built-in defaults.
pub fn resolve_config_paths(explicit: &[String]) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    std::env::var(ENV_CONFIG_PATHS)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Load the layered config and its validated engine view.
///
/// No paths means built-in defaults; the hash is then the hash of `{}`.
pub fn load_engine_config(
    explicit: &[String],
    strict: bool,
) -> Result<(LoadedConfig, EngineConfig)> {
    let paths = resolve_config_paths(explicit);
    let loaded = if paths.is_empty() {
        ssn_config::load_layered_yaml_from_strings(&[])?
    } else {
        let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
        ssn_config::load_layered_yaml(&path_refs)?
    };

    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = ssn_config::report_unused_keys(&loaded.config_json, policy)?;
    for ptr in &report.unused_leaf_pointers {
        warn!(pointer = %ptr, "config key not read by the engine");
    }

    let engine_cfg = loaded.engine_config()?;
    info!(config_hash = %loaded.config_hash, layers = paths.len(), "config loaded");
    Ok((loaded, engine_cfg))
}
