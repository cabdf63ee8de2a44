//! Structural classification.
//!
//! Rules are evaluated in order and the first match wins:
//! 1. PIK balloon: `interest_type == PIK` and outstanding above the balloon ratio -> critical
//! 2. PIK-family loan in a high-risk sector -> high
//! 3. PIK-family -> medium
//! 4. otherwise -> low
//!
//! A covenant breach then bumps the tier one step, capped at critical.

use ssn_config::ClassifierConfig;
use ssn_schemas::{InterestType, Loan, RiskLevel};

use crate::intake::{format_micros, validate_loan, MalformedLoanError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassifierRule {
    PikBalloon,
    PikHighRiskSector,
    PikFamily,
    Baseline,
}

impl ClassifierRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierRule::PikBalloon => "pik_balloon",
            ClassifierRule::PikHighRiskSector => "pik_high_risk_sector",
            ClassifierRule::PikFamily => "pik_family",
            ClassifierRule::Baseline => "baseline",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Final structural tier (after any covenant bump).
    pub structural_tier: RiskLevel,
    /// Rule that matched first.
    pub rule: ClassifierRule,
    pub covenant_bump: bool,
    pub rationale: String,
}

pub fn classify(loan: &Loan, cfg: &ClassifierConfig) -> Result<Classification, MalformedLoanError> {
    validate_loan(loan)?;

    let (rule, rule_tier, mut rationale) = if loan.interest_type == InterestType::Pik
        && exceeds_balloon(loan, cfg.balloon_ratio_bps)
    {
        (
            ClassifierRule::PikBalloon,
            RiskLevel::Critical,
            format!(
                "PIK balloon: outstanding {} exceeds {}x principal {}",
                format_micros(loan.outstanding_micros),
                format_ratio(cfg.balloon_ratio_bps),
                format_micros(loan.principal_micros)
            ),
        )
    } else if loan.interest_type.is_pik_family() && cfg.high_risk_sectors.contains(&loan.industry) {
        (
            ClassifierRule::PikHighRiskSector,
            RiskLevel::High,
            format!(
                "{} loan in high-risk sector '{}'",
                loan.interest_type,
                loan.industry.display_name()
            ),
        )
    } else if loan.interest_type.is_pik_family() {
        (
            ClassifierRule::PikFamily,
            RiskLevel::Medium,
            format!("{} interest capitalizes into the balance", loan.interest_type),
        )
    } else {
        (
            ClassifierRule::Baseline,
            RiskLevel::Low,
            "cash-pay loan with no structural PIK exposure".to_string(),
        )
    };

    let breached: Vec<&str> = loan.breached_covenants().map(|c| c.name.as_str()).collect();
    let covenant_bump = !breached.is_empty();
    let structural_tier = if covenant_bump {
        let bumped = rule_tier.bump();
        if bumped == rule_tier {
            rationale.push_str(&format!(
                "; covenant breach ({}), tier already {}",
                breached.join(", "),
                rule_tier
            ));
        } else {
            rationale.push_str(&format!(
                "; covenant breach ({}) raises tier {} -> {}",
                breached.join(", "),
                rule_tier,
                bumped
            ));
        }
        bumped
    } else {
        rule_tier
    };

    Ok(Classification {
        structural_tier,
        rule,
        covenant_bump,
        rationale,
    })
}

/// `outstanding > principal * ratio`, in integer basis points.
fn exceeds_balloon(loan: &Loan, ratio_bps: u32) -> bool {
    (loan.outstanding_micros as i128) * 10_000 > (loan.principal_micros as i128) * ratio_bps as i128
}

fn format_ratio(bps: u32) -> String {
    let whole = bps / 10_000;
    let frac = bps % 10_000;
    if frac == 0 {
        whole.to_string()
    } else {
        let frac = format!("{frac:04}");
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}
