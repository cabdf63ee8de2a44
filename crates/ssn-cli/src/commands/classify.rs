//! `ssn classify`: structural tiers only, no signals and no escalation.

use anyhow::{Context, Result};
use serde::Serialize;
use ssn_risk::{classify, format_micros};
use ssn_schemas::RiskLevel;

use crate::commands::analyze::normalize_all;
use crate::commands::load_engine_config;
use crate::input::load_loans;

#[derive(Serialize)]
struct ClassifiedLoan {
    loan_id: String,
    borrower: String,
    interest_type: String,
    outstanding: String,
    structural_tier: RiskLevel,
    rule: &'static str,
    covenant_bump: bool,
    rationale: String,
}

pub fn run(loans_path: &str, config_paths: &[String]) -> Result<()> {
    let (_loaded, cfg) = load_engine_config(config_paths, false)?;
    let loans = normalize_all(&load_loans(loans_path)?)?;

    let mut rows = Vec::with_capacity(loans.len());
    for loan in &loans {
        let c = classify(loan, &cfg.classifier)
            .with_context(|| format!("MALFORMED_LOAN {}", loan.loan_id))?;
        rows.push(ClassifiedLoan {
            loan_id: loan.loan_id.clone(),
            borrower: loan.borrower.clone(),
            interest_type: loan.interest_type.to_string(),
            outstanding: format_micros(loan.outstanding_micros),
            structural_tier: c.structural_tier,
            rule: c.rule.as_str(),
            covenant_bump: c.covenant_bump,
            rationale: c.rationale,
        });
    }
    rows.sort_by(|a, b| {
        b.structural_tier
            .cmp(&a.structural_tier)
            .then_with(|| a.loan_id.cmp(&b.loan_id))
    });

    let out = serde_json::to_string_pretty(&rows).context("serialize classification")?;
    println!("{out}");
    Ok(())
}
