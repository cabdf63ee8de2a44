//! Energy PIK balloon under a live energy shock
//!
//! GREEN when:
//! - PIK 10,000,000 / 12,500,000 energy loan + energy signal at 0.8 ->
//!   tier critical, strength 0.8, level critical, reason cites both the PIK
//!   balloon and the energy signal.
//! - The same loan with no signals is still critical, with no correlated event.
//! - A cash energy loan under the same signal moves low -> medium.

use ssn_config::EngineConfig;
use ssn_risk::{assessor_for, classify, correlate};
use ssn_schemas::{AssessorKind, RiskAssessment, RiskLevel};
use ssn_testkit::{active, cash_loan, hours_before, pik_loan, t0};

fn run(loan: &ssn_schemas::Loan, signals: &[ssn_schemas::ActiveSignal]) -> RiskAssessment {
    let cfg = EngineConfig::default();
    let classification = classify(loan, &cfg.classifier).unwrap();
    let correlation = correlate(loan, signals, &cfg.correlation);
    assessor_for(AssessorKind::RuleBased, &cfg).assess(loan, &classification, &correlation, t0())
}

#[test]
fn pik_balloon_with_energy_signal_is_critical_and_explained() {
    let loan = pik_loan("QB-17", "energy", 10_000_000, 12_500_000);
    let signals = vec![active("ydc-hormuz", &["energy"], 0.8, hours_before(t0(), 1))];

    let a = run(&loan, &signals);

    assert_eq!(a.structural_tier, RiskLevel::Critical);
    assert_eq!(a.correlation_strength, 0.8);
    assert_eq!(a.risk_level, RiskLevel::Critical);
    assert!(a.flag_reason.contains("PIK balloon"), "{}", a.flag_reason);
    assert!(a.flag_reason.contains("energy-sector signal"), "{}", a.flag_reason);
    assert_eq!(
        a.correlated_event.as_ref().map(|e| e.source_id.as_str()),
        Some("ydc-hormuz")
    );
}

#[test]
fn pik_balloon_without_signals_is_still_critical() {
    let loan = pik_loan("QB-17", "energy", 10_000_000, 12_500_000);
    let a = run(&loan, &[]);

    assert_eq!(a.risk_level, RiskLevel::Critical);
    assert_eq!(a.correlation_strength, 0.0);
    assert!(a.correlated_event.is_none());
    assert!(!a.flag_reason.contains("signal"));
}

#[test]
fn cash_energy_loan_is_bumped_to_medium() {
    let loan = cash_loan("XR-4", "energy", 8_000_000, 6_000_000);
    let signals = vec![active("ydc-hormuz", &["energy"], 0.8, hours_before(t0(), 1))];

    let a = run(&loan, &signals);

    assert_eq!(a.structural_tier, RiskLevel::Low);
    assert_eq!(a.risk_level, RiskLevel::Medium);
    assert!(!a.is_flagged());
}
