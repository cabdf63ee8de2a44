//! Secrets belong in the environment.
//!
//! API keys for the news feed, the accounting platforms and the payment
//! processor are read from env vars named in config, never from config values.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::leaf_pointers;

/// Prefixes of credentials the collaborators issue.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",
    "sk_live",
    "sk_test",
    "rk_live",
    "pk_live",
    "AKIA",
    "ghp_",
    "xoxb-",
    "xoxp-",
    "-----BEGIN",
];

/// Fail with `CONFIG_SECRET_DETECTED` on the first string leaf that looks
/// like a credential. The value is never echoed.
pub(crate) fn reject_secret_literals(doc: &Value) -> Result<()> {
    for ptr in leaf_pointers(doc) {
        let Some(s) = doc.pointer(&ptr).and_then(Value::as_str) else {
            continue;
        };
        if looks_like_secret(s) {
            bail!("CONFIG_SECRET_DETECTED leaf={ptr} value=REDACTED");
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let s = s.trim();
    s.len() >= 8 && SECRET_PREFIXES.iter().any(|p| s.starts_with(p))
}
