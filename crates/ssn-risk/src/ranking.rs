use ssn_schemas::RiskAssessment;

/// Sort assessments for presentation: risk level desc, correlation strength
/// desc, outstanding balance desc, loan id asc. Total and deterministic.
pub fn rank_assessments(assessments: &mut [RiskAssessment]) {
    assessments.sort_by(|a, b| {
        b.risk_level
            .cmp(&a.risk_level)
            .then_with(|| b.correlation_strength.total_cmp(&a.correlation_strength))
            .then_with(|| b.outstanding_micros.cmp(&a.outstanding_micros))
            .then_with(|| a.loan_id.cmp(&b.loan_id))
    });
}
