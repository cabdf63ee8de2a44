use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use ssn_config::{CooldownScope, EscalationConfig};
use ssn_schemas::{EscalationAction, EscalationDecision, RiskAssessment, RiskLevel};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscalationReason {
    /// A critical assessment and no hedge in cooldown.
    CriticalExposure,
    /// Critical exposure, but a prior hedge still covers it; downgraded to alert.
    HedgeCoolingDown,
    /// High (or suppressed critical) exposure.
    ElevatedExposure,
    NoElevatedRisk,
}

impl EscalationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationReason::CriticalExposure => "CRITICAL_EXPOSURE",
            EscalationReason::HedgeCoolingDown => "HEDGE_COOLING_DOWN",
            EscalationReason::ElevatedExposure => "ELEVATED_EXPOSURE",
            EscalationReason::NoElevatedRisk => "NO_ELEVATED_RISK",
        }
    }
}

/// Decision plus the machine-readable reason behind it.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyOutcome {
    pub decision: EscalationDecision,
    pub code: EscalationReason,
}

impl PolicyOutcome {
    pub fn hedge_suppressed(&self) -> bool {
        self.code == EscalationReason::HedgeCoolingDown
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Reduce `assessments` to one decision.
///
/// - hedge iff some assessment is critical and no prior hedge covers it
/// - else alert iff some assessment is high or critical
/// - else none
pub fn decide(
    cfg: &EscalationConfig,
    assessments: &[RiskAssessment],
    prior: Option<&EscalationDecision>,
    now: DateTime<Utc>,
) -> EscalationDecision {
    evaluate(cfg, assessments, prior, now).decision
}

pub fn evaluate(
    cfg: &EscalationConfig,
    assessments: &[RiskAssessment],
    prior: Option<&EscalationDecision>,
    now: DateTime<Utc>,
) -> PolicyOutcome {
    let critical = at_or_above(assessments, RiskLevel::Critical);

    if !critical.is_empty() {
        match prior.filter(|p| covers(cfg, p, &critical, now)) {
            None => {
                let reason = format!(
                    "{} critical assessment(s) [{}]; no hedge within {}m cooldown",
                    critical.len(),
                    ids(&critical),
                    cfg.cooldown.num_minutes()
                );
                return outcome(
                    EscalationAction::Hedge,
                    critical,
                    reason,
                    EscalationReason::CriticalExposure,
                    now,
                );
            }
            Some(p) => {
                let elevated = at_or_above(assessments, RiskLevel::High);
                let reason = format!(
                    "hedge suppressed: prior hedge at {} is within {}m cooldown ({} scope); \
                     alerting on {} assessment(s) at high or above [{}]",
                    p.decided_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                    cfg.cooldown.num_minutes(),
                    cfg.scope.as_str(),
                    elevated.len(),
                    ids(&elevated)
                );
                return outcome(
                    EscalationAction::Alert,
                    elevated,
                    reason,
                    EscalationReason::HedgeCoolingDown,
                    now,
                );
            }
        }
    }

    let elevated = at_or_above(assessments, RiskLevel::High);
    if !elevated.is_empty() {
        let reason = format!(
            "{} assessment(s) at high or above [{}]",
            elevated.len(),
            ids(&elevated)
        );
        return outcome(
            EscalationAction::Alert,
            elevated,
            reason,
            EscalationReason::ElevatedExposure,
            now,
        );
    }

    outcome(
        EscalationAction::None,
        Vec::new(),
        format!("no assessment at high or above ({} assessed)", assessments.len()),
        EscalationReason::NoElevatedRisk,
        now,
    )
}

/// Does `prior` suppress a hedge for these critical assessments?
fn covers(
    cfg: &EscalationConfig,
    prior: &EscalationDecision,
    critical: &[RiskAssessment],
    now: DateTime<Utc>,
) -> bool {
    if prior.action != EscalationAction::Hedge {
        return false;
    }
    // A prior decided "in the future" (clock skew) counts as inside the window.
    if now - prior.decided_at >= cfg.cooldown {
        return false;
    }
    match cfg.scope {
        CooldownScope::Global => true,
        CooldownScope::Loan => {
            let hedged: BTreeSet<&str> = prior.triggering_loan_ids().collect();
            critical.iter().all(|a| hedged.contains(a.loan_id.as_str()))
        }
        CooldownScope::Borrower => {
            let hedged: BTreeSet<&str> = prior
                .triggering_assessments
                .iter()
                .map(|a| a.borrower.as_str())
                .collect();
            critical.iter().all(|a| hedged.contains(a.borrower.as_str()))
        }
    }
}

fn at_or_above(assessments: &[RiskAssessment], level: RiskLevel) -> Vec<RiskAssessment> {
    let mut out: Vec<RiskAssessment> = assessments
        .iter()
        .filter(|a| a.risk_level >= level)
        .cloned()
        .collect();
    sort_triggering(&mut out);
    out
}

/// Highest risk first, then strongest correlation, then loan id.
pub fn sort_triggering(assessments: &mut [RiskAssessment]) {
    assessments.sort_by(|a, b| {
        b.risk_level
            .cmp(&a.risk_level)
            .then_with(|| b.correlation_strength.total_cmp(&a.correlation_strength))
            .then_with(|| a.loan_id.cmp(&b.loan_id))
    });
}

fn ids(assessments: &[RiskAssessment]) -> String {
    assessments
        .iter()
        .map(|a| a.loan_id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn outcome(
    action: EscalationAction,
    triggering_assessments: Vec<RiskAssessment>,
    reason: String,
    code: EscalationReason,
    now: DateTime<Utc>,
) -> PolicyOutcome {
    PolicyOutcome {
        decision: EscalationDecision {
            decision_id: EscalationDecision::derive_id(action, now),
            action,
            triggering_assessments,
            reason,
            decided_at: now,
        },
        code,
    }
}
