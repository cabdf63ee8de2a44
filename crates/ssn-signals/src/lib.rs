//! ssn-signals
//!
//! Event feed normalizer: raw crisis / news items become [`Signal`] records,
//! held in a rolling [`SignalWindow`] and scored with a pluggable
//! [`DecayCurve`].
//!
//! Pure deterministic logic. No IO, no wall-clock. Callers pass `now`.
//!
//! [`Signal`]: ssn_schemas::Signal

mod decay;
mod normalizer;
mod window;

pub use decay::{curve_from_config, DecayCurve, ExponentialDecay, LinearDecay};
pub use normalizer::{normalize_signal, parse_published_at, MalformedSignalError};
pub use window::{rank_active, SignalWindow};
