//! End-to-end analysis cycles
//!
//! GREEN when:
//! - A portfolio with a PIK balloon under an energy shock hedges, ranks the
//!   critical loan first and totals flagged exposure.
//! - Re-running the next cycle inside the cooldown with the first decision as
//!   prior alerts instead of hedging.
//! - Identical inputs produce byte-identical reports.
//! - A malformed loan fails the whole cycle (no partial report).

use chrono::Duration;
use ssn_config::EngineConfig;
use ssn_runtime::{Engine, EngineError};
use ssn_schemas::{AssessorKind, EscalationAction, Loan, RiskLevel, MICROS_SCALE};
use ssn_testkit::{cash_loan, hours_before, loan, pik_loan, raw_signal, t0, with_breach};

fn portfolio() -> Vec<Loan> {
    vec![
        cash_loan("XR-4", "energy", 8_000_000, 6_000_000),
        pik_loan("QB-17", "energy", 10_000_000, 12_500_000),
        loan(
            "ST-9",
            "shipping",
            ssn_schemas::InterestType::PikToggle,
            4_000_000,
            4_200_000,
        ),
        with_breach(cash_loan("XR-8", "software", 2_000_000, 1_000_000), "leverage"),
    ]
}

fn engine() -> Engine {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine
        .ingest_batch(&[
            raw_signal("ydc-hormuz", &["energy", "shipping"], 0.8, hours_before(t0(), 0)),
            raw_signal("ydc-old", &["energy"], 0.9, hours_before(t0(), 96)),
        ])
        .unwrap();
    engine
}

#[test]
fn shock_cycle_hedges_and_ranks() {
    let cycle = engine()
        .analyze(&portfolio(), None, t0(), AssessorKind::RuleBased)
        .unwrap();

    assert_eq!(cycle.active_signal_count, 1, "96h-old signal is past the horizon");
    let order: Vec<(&str, RiskLevel)> = cycle
        .assessments
        .iter()
        .map(|a| (a.loan_id.as_str(), a.risk_level))
        .collect();
    assert_eq!(
        order,
        vec![
            ("QB-17", RiskLevel::Critical),
            ("ST-9", RiskLevel::Critical),
            ("XR-4", RiskLevel::Medium),
            ("XR-8", RiskLevel::Medium),
        ]
    );
    assert_eq!(cycle.action(), EscalationAction::Hedge);
    assert_eq!(cycle.decision.triggering_assessments.len(), 2);
    assert_eq!(cycle.summary.flagged_count, 2);
    assert_eq!(
        cycle.summary.total_flagged_exposure_micros,
        (12_500_000 + 4_200_000) * MICROS_SCALE
    );
    assert!(!cycle.hedge_suppressed);
}

#[test]
fn next_cycle_inside_cooldown_alerts() {
    let engine = engine();
    let first = engine
        .analyze(&portfolio(), None, t0(), AssessorKind::RuleBased)
        .unwrap();
    let second = engine
        .analyze(
            &portfolio(),
            Some(&first.decision),
            t0() + Duration::minutes(15),
            AssessorKind::RuleBased,
        )
        .unwrap();

    assert_eq!(second.action(), EscalationAction::Alert);
    assert!(second.hedge_suppressed);
    assert_ne!(first.decision.decision_id, second.decision.decision_id);
}

#[test]
fn identical_inputs_give_identical_reports() {
    let a = engine()
        .analyze(&portfolio(), None, t0(), AssessorKind::ExposureWeighted)
        .unwrap();
    let b = engine()
        .analyze(&portfolio(), None, t0(), AssessorKind::ExposureWeighted)
        .unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
    assert!(a
        .assessments
        .iter()
        .all(|x| x.assessor == AssessorKind::ExposureWeighted));
}

#[test]
fn malformed_loan_fails_the_cycle() {
    let mut loans = portfolio();
    loans.push(cash_loan("BAD", "retail", 100, 150));
    let err = engine()
        .analyze(&loans, None, t0(), AssessorKind::RuleBased)
        .unwrap_err();
    assert!(matches!(err, EngineError::MalformedLoan(_)));
}
