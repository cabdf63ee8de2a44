//! ssn-runtime
//!
//! Cycle orchestration: owns the signal window, runs classify -> correlate ->
//! assess over a loan batch and reduces it to one escalation decision. Also
//! hosts the executor boundary that callers use to act on decisions at most
//! once.
//!
//! Still no IO and no wall-clock: callers pass `now` and the prior decision.

mod dispatch;
mod engine;
mod error;

pub use dispatch::{ActionExecutor, DecisionDispatcher, DispatchOutcome, LoggingExecutor};
pub use engine::{AnalysisCycle, Engine, PortfolioSummary};
pub use error::EngineError;
