use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::SignalRef;

// ---------------------------------------------------------------------------
// Risk level
// ---------------------------------------------------------------------------

/// Totally ordered risk level: `Low < Medium < High < Critical`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    /// One step up, saturating at `Critical`.
    pub fn bump(self) -> Self {
        match self {
            RiskLevel::Low => RiskLevel::Medium,
            RiskLevel::Medium => RiskLevel::High,
            RiskLevel::High | RiskLevel::Critical => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// Ordinal distance (`Critical - Low == 3`).
    pub fn steps_above(self, other: RiskLevel) -> i32 {
        self as i32 - other as i32
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

/// Which assessor capability produced an assessment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessorKind {
    /// Structural tier + one-step bump on a strong correlated signal.
    #[default]
    RuleBased,
    /// Shadow-default probability scoring (alternate heuristic).
    ExposureWeighted,
}

impl AssessorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessorKind::RuleBased => "rule_based",
            AssessorKind::ExposureWeighted => "exposure_weighted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rule_based" | "rules" | "traditional" => Some(AssessorKind::RuleBased),
            "exposure_weighted" | "scored" => Some(AssessorKind::ExposureWeighted),
            _ => None,
        }
    }
}

impl fmt::Display for AssessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-loan outcome of one analysis run. Superseded, never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub loan_id: String,
    pub borrower: String,
    pub risk_level: RiskLevel,
    pub flag_reason: String,
    /// Set iff `correlation_strength > 0`.
    pub correlated_event: Option<SignalRef>,
    pub structural_tier: RiskLevel,
    /// In `[0, 1]`.
    pub correlation_strength: f64,
    /// Deterministic heuristic in `[0, 0.95]`; informational for the rule-based assessor.
    pub shadow_default_probability: f64,
    pub assessor: AssessorKind,
    pub outstanding_micros: i64,
    pub flagged_at: DateTime<Utc>,
}

impl RiskAssessment {
    pub fn is_flagged(&self) -> bool {
        self.risk_level >= RiskLevel::High
    }
}

// ---------------------------------------------------------------------------
// Escalation decision
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationAction {
    None,
    Alert,
    Hedge,
}

impl EscalationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationAction::None => "none",
            EscalationAction::Alert => "alert",
            EscalationAction::Hedge => "hedge",
        }
    }
}

impl fmt::Display for EscalationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespace for deterministic decision ids (UUID v5).
const DECISION_NAMESPACE: Uuid = Uuid::from_u128(0x5a1e_7c3d_0b4f_4e21_9d6a_8f3c_2e71_b0d4);

/// One decision per analysis cycle. Executors must treat `decision_id`
/// (equivalently `decided_at` + `action`) as the idempotency key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscalationDecision {
    pub decision_id: Uuid,
    pub action: EscalationAction,
    /// Highest risk first, then strongest correlation.
    pub triggering_assessments: Vec<RiskAssessment>,
    pub reason: String,
    pub decided_at: DateTime<Utc>,
}

impl EscalationDecision {
    /// `decision_id` derivation: UUID v5 over `"<action>|<decided_at rfc3339 micros>"`.
    pub fn derive_id(action: EscalationAction, decided_at: DateTime<Utc>) -> Uuid {
        let key = format!(
            "{}|{}",
            action.as_str(),
            decided_at.to_rfc3339_opts(SecondsFormat::Micros, true)
        );
        Uuid::new_v5(&DECISION_NAMESPACE, key.as_bytes())
    }

    pub fn triggering_loan_ids(&self) -> impl Iterator<Item = &str> {
        self.triggering_assessments.iter().map(|a| a.loan_id.as_str())
    }
}
