//! Typed engine configuration.
//!
//! Every section has conservative defaults; a missing key takes the default, a
//! present-but-invalid key is a [`ConfigurationError`]. Validation runs once at
//! construction so no engine call can observe a bad threshold.

use chrono::Duration;
use serde_json::Value;
use ssn_schemas::{AssessorKind, Tag, MICROS_SCALE};
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Invalid threshold / sector-set configuration. Raised at construction only.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A key is present but has the wrong JSON type.
    WrongType {
        pointer: &'static str,
        expected: &'static str,
    },
    /// A key is present with a value outside its legal range.
    OutOfRange {
        pointer: &'static str,
        reason: String,
    },
    /// An enumerated key has an unknown value.
    UnknownVariant {
        pointer: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::WrongType { pointer, expected } => {
                write!(f, "CONFIG_INVALID {pointer}: expected {expected}")
            }
            ConfigurationError::OutOfRange { pointer, reason } => {
                write!(f, "CONFIG_INVALID {pointer}: {reason}")
            }
            ConfigurationError::UnknownVariant {
                pointer,
                value,
                expected,
            } => write!(
                f,
                "CONFIG_INVALID {pointer}: unknown value '{value}', expected one of: {expected}"
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}

fn out_of_range(pointer: &'static str, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::OutOfRange {
        pointer,
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Shape of the recency decay applied to raw signal severity.
#[derive(Clone, Debug, PartialEq)]
pub enum DecayConfig {
    /// `0.5 ^ (age / half_life)`, forced to 0 beyond the horizon.
    Exponential { half_life: Duration },
    /// `1 - age / horizon`.
    Linear,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignalsConfig {
    /// Signals older than this contribute nothing and are evicted.
    pub horizon: Duration,
    /// Active-signal cut-off on effective severity (strictly greater than).
    pub epsilon: f64,
    pub decay: DecayConfig,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            horizon: Duration::hours(72),
            epsilon: 0.05,
            decay: DecayConfig::Exponential {
                half_life: Duration::hours(12),
            },
        }
    }
}

impl SignalsConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.horizon <= Duration::zero() {
            return Err(out_of_range("/signals/horizon_hours", "must be > 0"));
        }
        if !(0.0..1.0).contains(&self.epsilon) {
            return Err(out_of_range("/signals/epsilon", "must be in [0, 1)"));
        }
        if let DecayConfig::Exponential { half_life } = &self.decay {
            if *half_life <= Duration::zero() {
                return Err(out_of_range("/signals/decay/half_life_hours", "must be > 0"));
            }
        }
        Ok(())
    }
}

/// Default high-risk sectors for the PIK sector rule.
pub const DEFAULT_HIGH_RISK_SECTORS: &[&str] = &[
    "energy",
    "shipping",
    "commodities",
    "emerging_market_sovereigns",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Balloon threshold as basis points of principal (11_000 = 1.1x).
    pub balloon_ratio_bps: u32,
    pub high_risk_sectors: BTreeSet<Tag>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            balloon_ratio_bps: 11_000,
            high_risk_sectors: DEFAULT_HIGH_RISK_SECTORS.iter().map(Tag::new).collect(),
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.balloon_ratio_bps < 10_000 {
            return Err(out_of_range("/classifier/balloon_ratio", "must be >= 1.0"));
        }
        if self.high_risk_sectors.is_empty() || self.high_risk_sectors.iter().any(Tag::is_empty) {
            return Err(out_of_range(
                "/classifier/high_risk_sectors",
                "must be a non-empty list of non-empty sector names",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationConfig {
    /// Correlation strength at or above which the assessor bumps one tier.
    pub bump_threshold: f64,
    /// Also match signals on the loan's region.
    pub match_regions: bool,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            bump_threshold: 0.6,
            match_regions: false,
        }
    }
}

impl CorrelationConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.bump_threshold > 0.0 && self.bump_threshold <= 1.0) {
            return Err(out_of_range("/correlation/bump_threshold", "must be in (0, 1]"));
        }
        Ok(())
    }
}

/// Knobs for the exposure-weighted (shadow-default probability) assessor.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringConfig {
    pub large_exposure_micros: i64,
    pub probability_bump_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            large_exposure_micros: 10_000_000 * MICROS_SCALE,
            probability_bump_threshold: 0.60,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.large_exposure_micros <= 0 {
            return Err(out_of_range("/assessor/large_exposure", "must be > 0"));
        }
        if !(self.probability_bump_threshold > 0.0 && self.probability_bump_threshold <= 0.95) {
            return Err(out_of_range(
                "/assessor/probability_bump_threshold",
                "must be in (0, 0.95]",
            ));
        }
        Ok(())
    }
}

/// What a prior hedge suppresses during its cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CooldownScope {
    /// Any hedge within the window suppresses the next hedge.
    Global,
    /// Suppressed only if every critical borrower was already hedged.
    Borrower,
    /// Suppressed only if every critical loan was already hedged.
    Loan,
}

impl CooldownScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            CooldownScope::Global => "global",
            CooldownScope::Borrower => "borrower",
            CooldownScope::Loan => "loan",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EscalationConfig {
    pub cooldown: Duration,
    pub scope: CooldownScope,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::hours(1),
            scope: CooldownScope::Global,
        }
    }
}

impl EscalationConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.cooldown < Duration::zero() {
            return Err(out_of_range("/escalation/cooldown_minutes", "must be >= 0"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Default)]
pub struct EngineConfig {
    pub signals: SignalsConfig,
    pub classifier: ClassifierConfig,
    pub correlation: CorrelationConfig,
    pub scoring: ScoringConfig,
    pub escalation: EscalationConfig,
    pub default_assessor: AssessorKind,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.signals.validate()?;
        self.classifier.validate()?;
        self.correlation.validate()?;
        self.scoring.validate()?;
        self.escalation.validate()?;
        Ok(())
    }

    /// Read the engine view out of a merged config document and validate it.
    ///
    /// Pointers read here must stay in sync with [`crate::consumed_pointers`].
    pub fn from_config_json(v: &Value) -> Result<Self, ConfigurationError> {
        let mut cfg = EngineConfig::default();

        // signals
        if let Some(h) = read_f64(v, "/signals/horizon_hours")? {
            cfg.signals.horizon = hours(h, "/signals/horizon_hours")?;
        }
        if let Some(e) = read_f64(v, "/signals/epsilon")? {
            cfg.signals.epsilon = e;
        }
        let half_life = match read_f64(v, "/signals/decay/half_life_hours")? {
            Some(h) => hours(h, "/signals/decay/half_life_hours")?,
            None => Duration::hours(12),
        };
        cfg.signals.decay = match read_str(v, "/signals/decay/kind")? {
            None | Some("exponential") => DecayConfig::Exponential { half_life },
            Some("linear") => DecayConfig::Linear,
            Some(other) => {
                return Err(ConfigurationError::UnknownVariant {
                    pointer: "/signals/decay/kind",
                    value: other.to_string(),
                    expected: "exponential | linear",
                })
            }
        };

        // classifier
        if let Some(r) = read_f64(v, "/classifier/balloon_ratio")? {
            if !(1.0..=100.0).contains(&r) {
                return Err(out_of_range("/classifier/balloon_ratio", "must be in [1.0, 100.0]"));
            }
            cfg.classifier.balloon_ratio_bps = (r * 10_000.0).round() as u32;
        }
        if let Some(sectors) = v.pointer("/classifier/high_risk_sectors") {
            let arr = sectors.as_array().ok_or(ConfigurationError::WrongType {
                pointer: "/classifier/high_risk_sectors",
                expected: "list of strings",
            })?;
            let mut set = BTreeSet::new();
            for s in arr {
                let s = s.as_str().ok_or(ConfigurationError::WrongType {
                    pointer: "/classifier/high_risk_sectors",
                    expected: "list of strings",
                })?;
                set.insert(Tag::new(s));
            }
            cfg.classifier.high_risk_sectors = set;
        }

        // correlation
        if let Some(t) = read_f64(v, "/correlation/bump_threshold")? {
            cfg.correlation.bump_threshold = t;
        }
        if let Some(m) = v.pointer("/correlation/match_regions") {
            cfg.correlation.match_regions = m.as_bool().ok_or(ConfigurationError::WrongType {
                pointer: "/correlation/match_regions",
                expected: "bool",
            })?;
        }

        // assessor
        if let Some(kind) = read_str(v, "/assessor/default")? {
            cfg.default_assessor =
                AssessorKind::parse(kind).ok_or_else(|| ConfigurationError::UnknownVariant {
                    pointer: "/assessor/default",
                    value: kind.to_string(),
                    expected: "rule_based | exposure_weighted",
                })?;
        }
        if let Some(raw) = v.pointer("/assessor/large_exposure") {
            let text = match raw {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => {
                    return Err(ConfigurationError::WrongType {
                        pointer: "/assessor/large_exposure",
                        expected: "decimal amount",
                    })
                }
            };
            cfg.scoring.large_exposure_micros = decimal_to_micros(&text).ok_or_else(|| {
                out_of_range(
                    "/assessor/large_exposure",
                    format!("not a decimal amount: '{text}'"),
                )
            })?;
        }
        if let Some(t) = read_f64(v, "/assessor/probability_bump_threshold")? {
            cfg.scoring.probability_bump_threshold = t;
        }

        // escalation
        if let Some(m) = read_f64(v, "/escalation/cooldown_minutes")? {
            cfg.escalation.cooldown = seconds(m * 60.0, "/escalation/cooldown_minutes")?;
        }
        if let Some(scope) = read_str(v, "/escalation/cooldown_scope")? {
            cfg.escalation.scope = match scope {
                "global" => CooldownScope::Global,
                "borrower" => CooldownScope::Borrower,
                "loan" => CooldownScope::Loan,
                other => {
                    return Err(ConfigurationError::UnknownVariant {
                        pointer: "/escalation/cooldown_scope",
                        value: other.to_string(),
                        expected: "global | borrower | loan",
                    })
                }
            };
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

// An explicit null is a present key without a usable value, never a default.
// Non-finite YAML numbers also arrive here as null.
fn read_f64(v: &Value, pointer: &'static str) -> Result<Option<f64>, ConfigurationError> {
    match v.pointer(pointer) {
        None => Ok(None),
        Some(x) => x.as_f64().map(Some).ok_or(ConfigurationError::WrongType {
            pointer,
            expected: "number",
        }),
    }
}

fn read_str<'a>(v: &'a Value, pointer: &'static str) -> Result<Option<&'a str>, ConfigurationError> {
    match v.pointer(pointer) {
        None => Ok(None),
        Some(x) => x.as_str().map(Some).ok_or(ConfigurationError::WrongType {
            pointer,
            expected: "string",
        }),
    }
}

fn hours(h: f64, pointer: &'static str) -> Result<Duration, ConfigurationError> {
    seconds(h * 3600.0, pointer)
}

/// Whole seconds, rejecting anything chrono cannot represent.
fn seconds(secs: f64, pointer: &'static str) -> Result<Duration, ConfigurationError> {
    if !secs.is_finite() {
        return Err(out_of_range(pointer, "must be finite"));
    }
    let secs = secs.round();
    // i64::MAX as f64 rounds up, so the bound is exclusive.
    if secs.abs() >= i64::MAX as f64 {
        return Err(out_of_range(pointer, "too large"));
    }
    Duration::try_seconds(secs as i64).ok_or_else(|| out_of_range(pointer, "too large"))
}

/// Whole-unit or up-to-6-decimal amount to micros, no floats.
fn decimal_to_micros(s: &str) -> Option<i64> {
    let s = s.trim();
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    if int_part.is_empty() || frac_part.len() > 6 {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let int_val: i64 = int_part.parse().ok()?;
    let frac_val: i64 = format!("{frac_part:0<6}").parse().ok()?;
    int_val.checked_mul(MICROS_SCALE)?.checked_add(frac_val)
}
