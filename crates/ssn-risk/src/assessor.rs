//! Risk assessors.
//!
//! Two strategies behind one capability, chosen per call with [`AssessorKind`]:
//! - [`RuleBasedAssessor`]: tier, bumped one step when correlation strength
//!   reaches the configured threshold.
//! - [`ExposureWeightedAssessor`]: tier, bumped one step when the
//!   shadow-default probability reaches its threshold and a signal is cited.
//!
//! Both are pure and total, and neither moves a loan more than one tier.

use chrono::{DateTime, Utc};
use ssn_config::{EngineConfig, ScoringConfig};
use ssn_schemas::{AssessorKind, Loan, RiskAssessment, RiskLevel};

use crate::classifier::Classification;
use crate::correlator::Correlation;

pub trait RiskAssessor: Send + Sync {
    fn kind(&self) -> AssessorKind;

    fn assess(
        &self,
        loan: &Loan,
        classification: &Classification,
        correlation: &Correlation,
        now: DateTime<Utc>,
    ) -> RiskAssessment;
}

pub fn assessor_for(kind: AssessorKind, cfg: &EngineConfig) -> Box<dyn RiskAssessor> {
    match kind {
        AssessorKind::RuleBased => Box::new(RuleBasedAssessor {
            bump_threshold: cfg.correlation.bump_threshold,
            scoring: cfg.scoring.clone(),
        }),
        AssessorKind::ExposureWeighted => Box::new(ExposureWeightedAssessor {
            scoring: cfg.scoring.clone(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Shadow-default probability
// ---------------------------------------------------------------------------

/// Deterministic heuristic in `[0.05, 0.95]`, computed in basis points.
///
/// base by tier (low 5%, medium 15%, high 35%, critical 60%)
/// + 15% PIK-family + 10% above the large-exposure line + strength x 20%.
pub fn shadow_default_probability(
    loan: &Loan,
    structural_tier: RiskLevel,
    correlation_strength: f64,
    scoring: &ScoringConfig,
) -> f64 {
    let mut bps: i64 = match structural_tier {
        RiskLevel::Low => 500,
        RiskLevel::Medium => 1_500,
        RiskLevel::High => 3_500,
        RiskLevel::Critical => 6_000,
    };
    if loan.interest_type.is_pik_family() {
        bps += 1_500;
    }
    if loan.outstanding_micros > scoring.large_exposure_micros {
        bps += 1_000;
    }
    bps += (correlation_strength.clamp(0.0, 1.0) * 2_000.0).round() as i64;
    bps.min(9_500) as f64 / 10_000.0
}

fn compose_reason(parts: &[Option<String>]) -> String {
    parts
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Rule-based
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct RuleBasedAssessor {
    pub bump_threshold: f64,
    pub scoring: ScoringConfig,
}

impl RiskAssessor for RuleBasedAssessor {
    fn kind(&self) -> AssessorKind {
        AssessorKind::RuleBased
    }

    fn assess(
        &self,
        loan: &Loan,
        classification: &Classification,
        correlation: &Correlation,
        now: DateTime<Utc>,
    ) -> RiskAssessment {
        let tier = classification.structural_tier;
        let contributed = correlation.strength >= self.bump_threshold;
        let risk_level = if contributed { tier.bump() } else { tier };

        let flag_reason = compose_reason(&[
            Some(classification.rationale.clone()),
            correlation.rationale().filter(|_| contributed),
        ]);

        RiskAssessment {
            loan_id: loan.loan_id.clone(),
            borrower: loan.borrower.clone(),
            risk_level,
            flag_reason,
            correlated_event: correlation.best.clone(),
            structural_tier: tier,
            correlation_strength: correlation.strength,
            shadow_default_probability: shadow_default_probability(
                loan,
                tier,
                correlation.strength,
                &self.scoring,
            ),
            assessor: AssessorKind::RuleBased,
            outstanding_micros: loan.outstanding_micros,
            flagged_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Exposure-weighted
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct ExposureWeightedAssessor {
    pub scoring: ScoringConfig,
}

impl RiskAssessor for ExposureWeightedAssessor {
    fn kind(&self) -> AssessorKind {
        AssessorKind::ExposureWeighted
    }

    fn assess(
        &self,
        loan: &Loan,
        classification: &Classification,
        correlation: &Correlation,
        now: DateTime<Utc>,
    ) -> RiskAssessment {
        let tier = classification.structural_tier;
        let probability =
            shadow_default_probability(loan, tier, correlation.strength, &self.scoring);
        let bump = correlation.strength > 0.0
            && probability >= self.scoring.probability_bump_threshold;
        let risk_level = if bump { tier.bump() } else { tier };

        let flag_reason = compose_reason(&[
            Some(classification.rationale.clone()),
            correlation.rationale(),
            Some(format!("shadow-default probability {probability:.2}")),
        ]);

        RiskAssessment {
            loan_id: loan.loan_id.clone(),
            borrower: loan.borrower.clone(),
            risk_level,
            flag_reason,
            correlated_event: correlation.best.clone(),
            structural_tier: tier,
            correlation_strength: correlation.strength,
            shadow_default_probability: probability,
            assessor: AssessorKind::ExposureWeighted,
            outstanding_micros: loan.outstanding_micros,
            flagged_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierRule;
    use chrono::TimeZone;
    use ssn_schemas::{InterestType, MatchedOn, SignalRef, Tag, MICROS_SCALE};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn loan(interest_type: InterestType, outstanding_units: i64) -> Loan {
        Loan {
            loan_id: "L1".to_string(),
            borrower: "Acme".to_string(),
            industry: Tag::new("energy"),
            region: None,
            interest_type,
            principal_micros: 20_000_000 * MICROS_SCALE,
            outstanding_micros: outstanding_units * MICROS_SCALE,
            maturity_date: chrono::NaiveDate::from_ymd_opt(2029, 1, 1).unwrap(),
            covenants: vec![],
        }
    }

    fn classification(tier: RiskLevel) -> Classification {
        Classification {
            structural_tier: tier,
            rule: ClassifierRule::Baseline,
            covenant_bump: false,
            rationale: "base".to_string(),
        }
    }

    fn correlation(strength: f64) -> Correlation {
        if strength <= 0.0 {
            return Correlation::none();
        }
        Correlation {
            strength,
            best: Some(SignalRef {
                source_id: "s1".to_string(),
                headline: "Pipeline sabotage".to_string(),
                published_at: now(),
                effective_severity: strength,
                matched_on: MatchedOn::Industry(Tag::new("energy")),
            }),
        }
    }

    #[test]
    fn probability_matches_table() {
        let scoring = ScoringConfig::default();
        let l = loan(InterestType::Pik, 12_500_000);
        // 0.60 + 0.15 + 0.10 + 0.16 = 1.01 -> capped.
        assert_eq!(shadow_default_probability(&l, RiskLevel::Critical, 0.8, &scoring), 0.95);
        let l = loan(InterestType::Cash, 5_000_000);
        assert_eq!(shadow_default_probability(&l, RiskLevel::Low, 0.0, &scoring), 0.05);
        assert_eq!(shadow_default_probability(&l, RiskLevel::Low, 0.5, &scoring), 0.15);
    }

    #[test]
    fn rule_based_bumps_at_threshold_only() {
        let a = assessor_for(AssessorKind::RuleBased, &EngineConfig::default());
        let l = loan(InterestType::Cash, 1_000);

        let below = a.assess(&l, &classification(RiskLevel::Low), &correlation(0.59), now());
        assert_eq!(below.risk_level, RiskLevel::Low);
        assert_eq!(below.flag_reason, "base");
        assert!(below.correlated_event.is_some(), "strength > 0 still cites the event");

        let at = a.assess(&l, &classification(RiskLevel::Low), &correlation(0.6), now());
        assert_eq!(at.risk_level, RiskLevel::Medium);
        assert!(at.flag_reason.starts_with("base; energy-sector signal 'Pipeline sabotage'"));
    }

    #[test]
    fn rule_based_bump_is_capped_but_still_explained() {
        let a = assessor_for(AssessorKind::RuleBased, &EngineConfig::default());
        let r = a.assess(
            &loan(InterestType::Pik, 1_000),
            &classification(RiskLevel::Critical),
            &correlation(0.9),
            now(),
        );
        assert_eq!(r.risk_level, RiskLevel::Critical);
        assert!(r.flag_reason.contains("energy-sector signal"));
    }

    #[test]
    fn exposure_weighted_needs_a_cited_signal() {
        let a = assessor_for(AssessorKind::ExposureWeighted, &EngineConfig::default());
        let l = loan(InterestType::Pik, 15_000_000);
        // 0.35 + 0.15 + 0.10 = 0.60 but no signal: no bump.
        let r = a.assess(&l, &classification(RiskLevel::High), &Correlation::none(), now());
        assert_eq!(r.risk_level, RiskLevel::High);
        assert_eq!(r.shadow_default_probability, 0.6);
        assert_eq!(r.assessor, AssessorKind::ExposureWeighted);

        let r = a.assess(&l, &classification(RiskLevel::High), &correlation(0.1), now());
        assert_eq!(r.risk_level, RiskLevel::Critical);
        assert!(r.flag_reason.ends_with("shadow-default probability 0.62"));
    }

    #[test]
    fn exposure_weighted_leaves_small_cash_loans_alone() {
        let a = assessor_for(AssessorKind::ExposureWeighted, &EngineConfig::default());
        let r = a.assess(
            &loan(InterestType::Cash, 1_000),
            &classification(RiskLevel::Low),
            &correlation(1.0),
            now(),
        );
        assert_eq!(r.risk_level, RiskLevel::Low);
        assert_eq!(r.shadow_default_probability, 0.25);
    }
}
