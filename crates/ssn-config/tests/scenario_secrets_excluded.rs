//! Secrets stay out of config files
//!
//! GREEN when:
//! - A literal API key anywhere in the merged document fails the load with
//!   CONFIG_SECRET_DETECTED and the value is not echoed.
//! - Env var NAMES are accepted.

use ssn_config::load_layered_yaml_from_strings;

const YAML_WITH_SECRET: &str = r#"
sources:
  news:
    api_key: "sk-live-abc123secretvalue"
"#;

const YAML_WITH_ENV_NAMES: &str = r#"
sources:
  news:
    api_key_env: "NEWS_API_KEY"
"#;

#[test]
fn literal_secret_is_rejected() {
    let err = load_layered_yaml_from_strings(&[YAML_WITH_SECRET]).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("CONFIG_SECRET_DETECTED"), "got: {msg}");
    assert!(!msg.contains("abc123secretvalue"), "secret must be redacted");
}

#[test]
fn secret_in_overlay_layer_is_rejected() {
    let err = load_layered_yaml_from_strings(&[YAML_WITH_ENV_NAMES, YAML_WITH_SECRET]).unwrap_err();
    assert!(format!("{err:#}").contains("CONFIG_SECRET_DETECTED"));
}

#[test]
fn env_var_names_are_accepted() {
    let loaded = load_layered_yaml_from_strings(&[YAML_WITH_ENV_NAMES]).unwrap();
    assert_eq!(
        loaded
            .config_json
            .pointer("/sources/news/api_key_env")
            .and_then(|v| v.as_str()),
        Some("NEWS_API_KEY")
    );
}
