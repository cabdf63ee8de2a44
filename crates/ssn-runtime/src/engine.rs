use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ssn_config::{ConfigurationError, EngineConfig};
use ssn_escalation::evaluate;
use ssn_risk::{assess_portfolio, rank_assessments};
use ssn_schemas::{
    AssessorKind, EscalationAction, EscalationDecision, Loan, RawSignalItem, RiskAssessment,
    RiskLevel, Signal,
};
use ssn_signals::{normalize_signal, SignalWindow};
use tracing::{debug, info, warn};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_loans: usize,
    /// Assessments at high or critical.
    pub flagged_count: usize,
    pub critical_count: usize,
    pub total_flagged_exposure_micros: i64,
}

impl PortfolioSummary {
    fn from_assessments(assessments: &[RiskAssessment]) -> Self {
        let mut s = PortfolioSummary {
            total_loans: assessments.len(),
            ..Default::default()
        };
        for a in assessments.iter().filter(|a| a.is_flagged()) {
            s.flagged_count += 1;
            s.total_flagged_exposure_micros =
                s.total_flagged_exposure_micros.saturating_add(a.outstanding_micros);
            if a.risk_level == RiskLevel::Critical {
                s.critical_count += 1;
            }
        }
        s
    }
}

/// Everything one analysis produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisCycle {
    pub analyzed_at: DateTime<Utc>,
    pub assessor: AssessorKind,
    pub active_signal_count: usize,
    pub summary: PortfolioSummary,
    /// All assessments, ranked: level desc, correlation desc, exposure desc, loan id.
    pub assessments: Vec<RiskAssessment>,
    /// The high / critical subset of `assessments`, same order.
    pub flagged: Vec<RiskAssessment>,
    pub decision: EscalationDecision,
    /// A critical batch was downgraded to alert by a prior hedge's cooldown.
    pub hedge_suppressed: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Validated configuration plus the process-lifetime signal window.
///
/// Stateless across `analyze` calls apart from the window; the prior decision
/// is always passed in.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    window: Arc<SignalWindow>,
}

impl Engine {
    /// Validate `config` and build an engine with a fresh window.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let window = Arc::new(SignalWindow::new(&config.signals));
        Ok(Self { config, window })
    }

    /// Build around an injected (possibly shared) window.
    ///
    /// The window's horizon and epsilon must equal `config.signals`. Its decay
    /// curve is its own and may differ from `config.signals.decay`.
    pub fn with_window(config: EngineConfig, window: Arc<SignalWindow>) -> Result<Self, EngineError> {
        config.validate()?;
        if window.horizon() != config.signals.horizon {
            return Err(ConfigurationError::OutOfRange {
                pointer: "/signals/horizon_hours",
                reason: format!(
                    "injected window horizon {}s differs from configured {}s",
                    window.horizon().num_seconds(),
                    config.signals.horizon.num_seconds()
                ),
            }
            .into());
        }
        if window.epsilon() != config.signals.epsilon {
            return Err(ConfigurationError::OutOfRange {
                pointer: "/signals/epsilon",
                reason: format!(
                    "injected window epsilon {} differs from configured {}",
                    window.epsilon(),
                    config.signals.epsilon
                ),
            }
            .into());
        }
        Ok(Self { config, window })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn window(&self) -> &Arc<SignalWindow> {
        &self.window
    }

    pub fn ingest(&self, raw: &RawSignalItem) -> Result<Signal, EngineError> {
        Ok(self.window.ingest(raw)?)
    }

    /// Validate the whole feed first, then append it. A malformed item leaves
    /// the window untouched. Returns the window size afterwards.
    pub fn ingest_batch(&self, raw: &[RawSignalItem]) -> Result<usize, EngineError> {
        let signals = raw
            .iter()
            .map(normalize_signal)
            .collect::<Result<Vec<_>, _>>()?;
        for s in signals {
            self.window.insert(s);
        }
        Ok(self.window.len())
    }

    /// One analysis cycle over `loans` at `now`.
    pub fn analyze(
        &self,
        loans: &[Loan],
        prior: Option<&EscalationDecision>,
        now: DateTime<Utc>,
        assessor: AssessorKind,
    ) -> Result<AnalysisCycle, EngineError> {
        let active = self.window.active_signals(now);

        let mut assessments = assess_portfolio(loans, &active, &self.config, assessor, now)?;
        for a in &assessments {
            debug!(
                loan_id = %a.loan_id,
                structural_tier = %a.structural_tier,
                risk_level = %a.risk_level,
                correlation = a.correlation_strength,
                "loan assessed"
            );
        }

        let outcome = evaluate(&self.config.escalation, &assessments, prior, now);
        if outcome.hedge_suppressed() {
            warn!(
                cooldown_minutes = self.config.escalation.cooldown.num_minutes(),
                scope = self.config.escalation.scope.as_str(),
                "hedge suppressed by cooldown; downgraded to alert"
            );
        }

        rank_assessments(&mut assessments);
        let flagged: Vec<RiskAssessment> =
            assessments.iter().filter(|a| a.is_flagged()).cloned().collect();
        let summary = PortfolioSummary::from_assessments(&assessments);

        info!(
            loans = summary.total_loans,
            flagged = summary.flagged_count,
            critical = summary.critical_count,
            active_signals = active.len(),
            assessor = assessor.as_str(),
            action = outcome.decision.action.as_str(),
            code = outcome.code.as_str(),
            "analysis cycle complete"
        );

        Ok(AnalysisCycle {
            analyzed_at: now,
            assessor,
            active_signal_count: active.len(),
            summary,
            assessments,
            flagged,
            hedge_suppressed: outcome.hedge_suppressed(),
            decision: outcome.decision,
        })
    }

    /// [`Engine::analyze`] with the configured default assessor.
    pub fn analyze_default(
        &self,
        loans: &[Loan],
        prior: Option<&EscalationDecision>,
        now: DateTime<Utc>,
    ) -> Result<AnalysisCycle, EngineError> {
        self.analyze(loans, prior, now, self.config.default_assessor)
    }
}

impl AnalysisCycle {
    pub fn action(&self) -> EscalationAction {
        self.decision.action
    }
}
