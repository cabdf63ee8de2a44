//! Executor boundary.
//!
//! The engine only emits decisions. Acting on them belongs to the caller, and
//! must happen at most once per `decision_id`.

use std::collections::BTreeSet;

use anyhow::Result;
use ssn_schemas::{EscalationAction, EscalationDecision};
use tracing::{info, warn};
use uuid::Uuid;

/// Side-effecting collaborator (hedge desk, pager, chat webhook ...).
pub trait ActionExecutor {
    fn execute_hedge(&mut self, decision: &EscalationDecision) -> Result<()>;
    fn send_alert(&mut self, decision: &EscalationDecision) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Executed(EscalationAction),
    AlreadyExecuted,
    NoAction,
}

/// Routes decisions to an executor, deduplicating on `decision_id`.
///
/// A failed execution is not recorded, so the caller may dispatch the same
/// decision again.
pub struct DecisionDispatcher<E: ActionExecutor> {
    executor: E,
    executed: BTreeSet<Uuid>,
}

impl<E: ActionExecutor> DecisionDispatcher<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            executed: BTreeSet::new(),
        }
    }

    /// Resume with ids already executed in an earlier process (e.g. from the journal).
    pub fn with_executed(executor: E, executed: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            executor,
            executed: executed.into_iter().collect(),
        }
    }

    pub fn dispatch(&mut self, decision: &EscalationDecision) -> Result<DispatchOutcome> {
        if decision.action == EscalationAction::None {
            return Ok(DispatchOutcome::NoAction);
        }
        if self.executed.contains(&decision.decision_id) {
            info!(decision_id = %decision.decision_id, "decision already executed; skipping");
            return Ok(DispatchOutcome::AlreadyExecuted);
        }

        match decision.action {
            EscalationAction::Hedge => self.executor.execute_hedge(decision)?,
            EscalationAction::Alert => self.executor.send_alert(decision)?,
            EscalationAction::None => return Ok(DispatchOutcome::NoAction),
        }
        self.executed.insert(decision.decision_id);
        Ok(DispatchOutcome::Executed(decision.action))
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }
}

/// Executor that only reports through `tracing`. Used by the CLI, where the
/// real hedge desk is out of reach.
#[derive(Debug, Default)]
pub struct LoggingExecutor {
    pub hedges: usize,
    pub alerts: usize,
}

impl ActionExecutor for LoggingExecutor {
    fn execute_hedge(&mut self, decision: &EscalationDecision) -> Result<()> {
        self.hedges += 1;
        warn!(
            decision_id = %decision.decision_id,
            triggering = decision.triggering_assessments.len(),
            reason = %decision.reason,
            "HEDGE TRIGGER"
        );
        Ok(())
    }

    fn send_alert(&mut self, decision: &EscalationDecision) -> Result<()> {
        self.alerts += 1;
        info!(
            decision_id = %decision.decision_id,
            triggering = decision.triggering_assessments.len(),
            reason = %decision.reason,
            "ALERT"
        );
        Ok(())
    }
}
