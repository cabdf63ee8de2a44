//! ssn-config
//!
//! Layered YAML configuration. Layers are merged in order, the result is
//! canonicalized and hashed so every decision can name the exact config that
//! produced it, and the merged document is screened for secrets and for keys
//! nothing reads. [`EngineConfig`] is the typed, validated view the engine
//! crates consume.

mod consumption;
mod engine;
mod secrets;

pub use consumption::{consumed_pointers, report_unused_keys, UnusedKeyPolicy, UnusedKeyReport};
pub use engine::*;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;

// ---------------------------------------------------------------------------
// Layered loading
// ---------------------------------------------------------------------------

/// Merged config plus its identity.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// SHA-256 (hex) of `canonical_json`.
    pub config_hash: String,
    /// Key-sorted compact JSON of the merged document.
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Typed, validated engine view of this config.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigurationError> {
        EngineConfig::from_config_json(&self.config_json)
    }
}

/// Read and merge YAML files, base first.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let docs = paths
        .iter()
        .map(|p| fs::read_to_string(p).with_context(|| format!("read config layer: {p}")))
        .collect::<Result<Vec<String>>>()?;
    let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&refs)
}

/// Merge in-memory YAML documents, base first. An empty document is a no-op layer.
pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Map::new());
    for (layer, raw) in yaml_docs.iter().enumerate() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("config layer {layer}: invalid yaml"))?;
        reject_non_finite(&yaml).with_context(|| format!("config layer {layer}"))?;
        let overlay = serde_json::to_value(yaml)
            .with_context(|| format!("config layer {layer}: not representable as json"))?;
        if !overlay.is_null() {
            merge_into(&mut merged, overlay);
        }
    }

    secrets::reject_secret_literals(&merged)?;

    // serde_json's default map is ordered, so this is key-sorted at every depth.
    let canonical_json = serde_json::to_string(&merged).context("canonical json serialize")?;
    let config_hash = hex::encode(Sha256::digest(canonical_json.as_bytes()));
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// JSON has no NaN or infinity; serde_json would turn them into null.
fn reject_non_finite(doc: &serde_yaml::Value) -> Result<()> {
    use serde_yaml::Value as Yaml;

    let mut stack: Vec<(String, &Yaml)> = vec![(String::new(), doc)];
    while let Some((at, node)) = stack.pop() {
        match node {
            Yaml::Number(n) if n.as_f64().is_some_and(|f| !f.is_finite()) => {
                let at = if at.is_empty() { "/" } else { at.as_str() };
                bail!("CONFIG_INVALID {at}: must be a finite number, got {n}");
            }
            Yaml::Mapping(map) => {
                for (k, child) in map {
                    let key = match k {
                        Yaml::String(s) => s.replace('~', "~0").replace('/', "~1"),
                        other => serde_yaml::to_string(other)
                            .map(|s| s.trim().to_string())
                            .unwrap_or_default(),
                    };
                    stack.push((format!("{at}/{key}"), child));
                }
            }
            Yaml::Sequence(items) => {
                for (i, child) in items.iter().enumerate() {
                    stack.push((format!("{at}/{i}"), child));
                }
            }
            Yaml::Tagged(tagged) => stack.push((at, &tagged.value)),
            _ => {}
        }
    }
    Ok(())
}

/// Objects merge key by key; anything else in `overlay` replaces `base`.
fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_into(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

// ---------------------------------------------------------------------------
// JSON pointer helpers
// ---------------------------------------------------------------------------

/// Pointers of every scalar leaf in `v` (arrays index by position). The root
/// scalar, if `v` is not a container, is `"/"`.
pub(crate) fn leaf_pointers(v: &Value) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack: Vec<(String, &Value)> = vec![(String::new(), v)];
    while let Some((at, node)) = stack.pop() {
        match node {
            Value::Object(map) => {
                for (k, child) in map {
                    stack.push((format!("{at}/{}", k.replace('~', "~0").replace('/', "~1")), child));
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    stack.push((format!("{at}/{i}"), child));
                }
            }
            _ if at.is_empty() => out.push("/".to_string()),
            _ => out.push(at),
        }
    }
    out.sort();
    out
}
