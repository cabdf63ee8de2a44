use ssn_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};

/// scenario_unused_keys_warn_or_fail
///
/// Validates:
/// 1) Unused keys are detected in WARN mode but do not error.
/// 2) Unused keys cause failure in FAIL mode.
/// 3) Keys under consumed prefixes (including list items) are not flagged.
/// 4) Deterministic ordering of unused pointers.

const YAML: &str = r#"
signals:
  epsilon: 0.05
  typo_horizon: 48
classifier:
  high_risk_sectors: [energy, shipping]
unused_section:
  foo: 123
  bar: 456
"#;

#[test]
fn warn_mode_reports_unused_keys_without_error() {
    let loaded = load_layered_yaml_from_strings(&[YAML]).expect("config load must succeed");
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)
        .expect("warn mode must not error");

    assert!(!report.is_clean());
    assert_eq!(
        report.unused_leaf_pointers,
        vec![
            "/signals/typo_horizon".to_string(),
            "/unused_section/bar".to_string(),
            "/unused_section/foo".to_string(),
        ]
    );
}

#[test]
fn fail_mode_errors_on_unused_keys() {
    let loaded = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let err = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap_err();
    assert!(err.to_string().contains("CONFIG_UNUSED_KEYS"));
}

#[test]
fn fully_consumed_config_is_clean() {
    let yaml = r#"
signals:
  horizon_hours: 48
  decay:
    kind: linear
correlation:
  bump_threshold: 0.7
  match_regions: true
assessor:
  default: exposure_weighted
  large_exposure: "25000000"
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
}
