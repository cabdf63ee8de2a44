//! Recency decay strategies.
//!
//! A curve maps signal age to a factor in `[0, 1]`. Contract for every curve:
//! - factor is monotonically non-increasing in age
//! - age <= 0 (future-dated or brand new) has factor 1
//! - age beyond the horizon has factor 0

use chrono::Duration;
use ssn_config::{DecayConfig, SignalsConfig};
use std::sync::Arc;

pub trait DecayCurve: Send + Sync + std::fmt::Debug {
    /// Decay factor for a signal of the given `age`, with `horizon` as the hard cut-off.
    fn factor(&self, age: Duration, horizon: Duration) -> f64;
}

/// `0.5 ^ (age / half_life)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExponentialDecay {
    pub half_life: Duration,
}

impl Default for ExponentialDecay {
    fn default() -> Self {
        Self {
            half_life: Duration::hours(12),
        }
    }
}

impl DecayCurve for ExponentialDecay {
    fn factor(&self, age: Duration, horizon: Duration) -> f64 {
        if age > horizon {
            return 0.0;
        }
        let age_ms = age.num_milliseconds().max(0) as f64;
        let half_life_ms = self.half_life.num_milliseconds().max(1) as f64;
        0.5_f64.powf(age_ms / half_life_ms)
    }
}

/// `1 - age / horizon`, reaching 0 exactly at the horizon.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearDecay;

impl DecayCurve for LinearDecay {
    fn factor(&self, age: Duration, horizon: Duration) -> f64 {
        if age > horizon {
            return 0.0;
        }
        let age_ms = age.num_milliseconds().max(0) as f64;
        let horizon_ms = horizon.num_milliseconds().max(1) as f64;
        (1.0 - age_ms / horizon_ms).clamp(0.0, 1.0)
    }
}

pub fn curve_from_config(cfg: &SignalsConfig) -> Arc<dyn DecayCurve> {
    match &cfg.decay {
        DecayConfig::Exponential { half_life } => Arc::new(ExponentialDecay {
            half_life: *half_life,
        }),
        DecayConfig::Linear => Arc::new(LinearDecay),
    }
}
