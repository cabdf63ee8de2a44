//! Invalid thresholds fail at construction
//!
//! GREEN when:
//! - Out-of-range thresholds, unknown enum values and wrong types all surface
//!   as `ConfigurationError` naming the offending pointer.
//! - Durations chrono cannot hold are `OutOfRange`, not a panic.
//! - An explicit null or a non-finite number never falls back to a default.
//! - Valid overrides are reflected in the typed view.

use ssn_config::{
    load_layered_yaml_from_strings, ConfigurationError, CooldownScope, DecayConfig, EngineConfig,
};
use ssn_schemas::{AssessorKind, Tag, MICROS_SCALE};

fn engine_config(yaml: &str) -> Result<EngineConfig, ConfigurationError> {
    load_layered_yaml_from_strings(&[yaml])
        .expect("yaml must load")
        .engine_config()
}

#[test]
fn bump_threshold_above_one_is_rejected() {
    let err = engine_config("correlation:\n  bump_threshold: 1.5\n").unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::OutOfRange {
            pointer: "/correlation/bump_threshold",
            ..
        }
    ));
}

#[test]
fn balloon_ratio_below_one_is_rejected() {
    let err = engine_config("classifier:\n  balloon_ratio: 0.9\n").unwrap_err();
    assert!(err.to_string().contains("/classifier/balloon_ratio"));
}

#[test]
fn empty_sector_set_is_rejected() {
    let err = engine_config("classifier:\n  high_risk_sectors: []\n").unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::OutOfRange {
            pointer: "/classifier/high_risk_sectors",
            ..
        }
    ));
}

#[test]
fn unknown_scope_and_wrong_types_are_rejected() {
    let err = engine_config("escalation:\n  cooldown_scope: desk\n").unwrap_err();
    assert!(matches!(err, ConfigurationError::UnknownVariant { .. }));

    let err = engine_config("signals:\n  epsilon: high\n").unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::WrongType {
            pointer: "/signals/epsilon",
            expected: "number",
        }
    );

    let err = engine_config("correlation:\n  match_regions: \"yes\"\n").unwrap_err();
    assert!(matches!(err, ConfigurationError::WrongType { .. }));
}

#[test]
fn negative_horizon_is_rejected() {
    let err = engine_config("signals:\n  horizon_hours: -1\n").unwrap_err();
    assert!(err.to_string().starts_with("CONFIG_INVALID /signals/horizon_hours"));
}

#[test]
fn oversized_durations_are_rejected() {
    let err = engine_config("escalation:\n  cooldown_minutes: 1.0e300\n").unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::OutOfRange {
            pointer: "/escalation/cooldown_minutes",
            reason: "too large".to_string(),
        }
    );

    let err = engine_config("signals:\n  horizon_hours: 1.0e18\n").unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::OutOfRange {
            pointer: "/signals/horizon_hours",
            ..
        }
    ));

    let err = engine_config("signals:\n  decay:\n    half_life_hours: 1.0e18\n").unwrap_err();
    assert!(err.to_string().starts_with("CONFIG_INVALID /signals/decay/half_life_hours"));
}

#[test]
fn explicit_null_is_not_a_default() {
    let err = engine_config("signals:\n  epsilon: ~\n").unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::WrongType {
            pointer: "/signals/epsilon",
            expected: "number",
        }
    );

    let err = engine_config("escalation:\n  cooldown_scope: null\n").unwrap_err();
    assert!(matches!(err, ConfigurationError::WrongType { .. }));
}

#[test]
fn non_finite_thresholds_fail_at_load() {
    for yaml in [
        "signals:\n  epsilon: .nan\n",
        "correlation:\n  bump_threshold: .inf\n",
        "escalation:\n  cooldown_minutes: -.inf\n",
    ] {
        let err = load_layered_yaml_from_strings(&[yaml]).unwrap_err();
        assert!(format!("{err:#}").contains("must be a finite number"), "{err:#}");
    }
}

#[test]
fn valid_overrides_are_applied() {
    let cfg = engine_config(
        r#"
signals:
  decay:
    kind: linear
classifier:
  balloon_ratio: 1.25
  high_risk_sectors: ["Oil & Gas", "Shipping"]
correlation:
  match_regions: true
assessor:
  default: exposure-weighted
  large_exposure: 2500000.50
escalation:
  cooldown_minutes: 30
  cooldown_scope: borrower
"#,
    )
    .unwrap();

    assert_eq!(cfg.signals.decay, DecayConfig::Linear);
    assert_eq!(cfg.classifier.balloon_ratio_bps, 12_500);
    assert!(cfg.classifier.high_risk_sectors.contains(&Tag::new("shipping")));
    assert!(cfg.classifier.high_risk_sectors.contains(&Tag::new("oil & gas")));
    assert!(cfg.correlation.match_regions);
    assert_eq!(cfg.default_assessor, AssessorKind::ExposureWeighted);
    assert_eq!(cfg.scoring.large_exposure_micros, 2_500_000 * MICROS_SCALE + 500_000);
    assert_eq!(cfg.escalation.cooldown, chrono::Duration::minutes(30));
    assert_eq!(cfg.escalation.scope, CooldownScope::Borrower);
}
