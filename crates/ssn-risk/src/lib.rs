//! ssn-risk
//!
//! Loan intake, structural classification, signal correlation and risk
//! assessment.
//!
//! Pure deterministic logic. No IO, no wall-clock. Callers pass `now` and the
//! active signal set; every function here returns the same bytes for the same
//! inputs.

mod assessor;
mod classifier;
mod correlator;
mod intake;
mod pipeline;
mod ranking;

pub use assessor::{
    assessor_for, shadow_default_probability, ExposureWeightedAssessor, RiskAssessor,
    RuleBasedAssessor,
};
pub use classifier::{classify, Classification, ClassifierRule};
pub use correlator::{correlate, Correlation};
pub use intake::{
    amount_to_micros, format_micros, infer_interest_type, normalize_loan, validate_loan,
    MalformedLoanError,
};
pub use pipeline::assess_portfolio;
pub use ranking::rank_assessments;
