//! ssn-escalation
//!
//! Escalation policy: reduce one batch of assessments to a single
//! none / alert / hedge decision, with cooldown hysteresis on hedges.
//!
//! Pure deterministic logic. No IO, no wall-clock. The prior decision and
//! `now` are explicit inputs; persisting "last decision" is the caller's job.

mod policy;

pub use policy::{decide, evaluate, sort_triggering, EscalationReason, PolicyOutcome};
