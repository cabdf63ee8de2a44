//! Config hash stability
//!
//! GREEN when:
//! - `load_layered_yaml_from_strings` called twice on the same inputs returns
//!   identical config_hash.
//! - Reordering keys within YAML doesn't change the hash (canonicalization).
//! - An overlay that changes a value changes the hash.

use ssn_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
signals:
  horizon_hours: 72
  epsilon: 0.05
  decay:
    kind: exponential
    half_life_hours: 12
classifier:
  balloon_ratio: 1.1
  high_risk_sectors: [energy, shipping, commodities]
escalation:
  cooldown_minutes: 60
  cooldown_scope: global
"#;

const BASE_YAML_REORDERED: &str = r#"
escalation:
  cooldown_scope: global
  cooldown_minutes: 60
classifier:
  high_risk_sectors: [energy, shipping, commodities]
  balloon_ratio: 1.1
signals:
  decay:
    half_life_hours: 12
    kind: exponential
  epsilon: 0.05
  horizon_hours: 72
"#;

const OVERLAY_YAML: &str = r#"
escalation:
  cooldown_minutes: 15
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
    assert_eq!(a.config_hash.len(), 64, "sha256 hex digest");
}

#[test]
fn reordered_keys_produce_same_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(
        a.config_hash, b.config_hash,
        "reordering keys in YAML must not change the hash"
    );
}

#[test]
fn overlay_changes_hash_and_value() {
    let base = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let merged = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(base.config_hash, merged.config_hash);

    let cfg = merged.engine_config().unwrap();
    assert_eq!(cfg.escalation.cooldown, chrono::Duration::minutes(15));
    // Untouched base keys survive the merge.
    assert_eq!(cfg.signals.horizon, chrono::Duration::hours(72));
}
