//! Batch assessment: classify -> correlate -> assess for every loan.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use ssn_config::EngineConfig;
use ssn_schemas::{ActiveSignal, AssessorKind, Loan, RiskAssessment};

use crate::assessor::assessor_for;
use crate::classifier::classify;
use crate::correlator::correlate;
use crate::intake::MalformedLoanError;

/// Assess every loan against one active-signal snapshot, in input order.
///
/// All or nothing: a malformed loan or a repeated `loan_id` aborts the batch.
pub fn assess_portfolio(
    loans: &[Loan],
    active: &[ActiveSignal],
    cfg: &EngineConfig,
    kind: AssessorKind,
    now: DateTime<Utc>,
) -> Result<Vec<RiskAssessment>, MalformedLoanError> {
    let mut seen = BTreeSet::new();
    for loan in loans {
        if !seen.insert(loan.loan_id.as_str()) {
            return Err(MalformedLoanError::DuplicateLoanId {
                loan_id: loan.loan_id.clone(),
            });
        }
    }

    let assessor = assessor_for(kind, cfg);
    loans
        .iter()
        .map(|loan| {
            let classification = classify(loan, &cfg.classifier)?;
            let correlation = correlate(loan, active, &cfg.correlation);
            Ok(assessor.assess(loan, &classification, &correlation, now))
        })
        .collect()
}
