//! Adapter record -> [`Loan`] normalization and loan shape validation.
//!
//! Amounts arrive as decimal strings and are converted to integer micros
//! without floating point. Anything that would need rounding or coercion is
//! rejected as [`MalformedLoanError`].

use std::fmt;

use chrono::{DateTime, NaiveDate};
use ssn_schemas::{InterestType, Loan, RawLoanRecord, Tag, MICROS_SCALE};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedLoanError {
    /// A required text field is blank.
    EmptyField {
        loan_id: String,
        field: &'static str,
    },
    /// An amount is not a plain decimal number.
    InvalidAmount {
        loan_id: String,
        field: &'static str,
        raw: String,
    },
    /// More than 6 decimal places (ambiguous micro conversion).
    TooManyDecimalPlaces {
        loan_id: String,
        field: &'static str,
        raw: String,
    },
    NonPositivePrincipal {
        loan_id: String,
        principal_micros: i64,
    },
    NegativeBalance {
        loan_id: String,
        outstanding_micros: i64,
    },
    /// Outstanding above principal on a loan that cannot capitalize interest.
    BalanceExceedsPrincipal {
        loan_id: String,
        interest_type: InterestType,
        principal_micros: i64,
        outstanding_micros: i64,
    },
    UnknownInterestType {
        loan_id: String,
        raw: String,
    },
    InvalidMaturityDate {
        loan_id: String,
        raw: String,
    },
    /// The same `loanId` appears twice in one batch.
    DuplicateLoanId { loan_id: String },
}

impl fmt::Display for MalformedLoanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedLoanError::EmptyField { loan_id, field } => {
                write!(f, "loan '{loan_id}': field '{field}' is empty")
            }
            MalformedLoanError::InvalidAmount {
                loan_id,
                field,
                raw,
            } => write!(f, "loan '{loan_id}': {field} is not a decimal amount: '{raw}'"),
            MalformedLoanError::TooManyDecimalPlaces {
                loan_id,
                field,
                raw,
            } => write!(
                f,
                "loan '{loan_id}': {field} has more than 6 decimal places \
                 (ambiguous micro conversion): '{raw}'"
            ),
            MalformedLoanError::NonPositivePrincipal {
                loan_id,
                principal_micros,
            } => write!(
                f,
                "loan '{loan_id}': principal must be > 0, got {}",
                format_micros(*principal_micros)
            ),
            MalformedLoanError::NegativeBalance {
                loan_id,
                outstanding_micros,
            } => write!(
                f,
                "loan '{loan_id}': outstanding balance must be >= 0, got {}",
                format_micros(*outstanding_micros)
            ),
            MalformedLoanError::BalanceExceedsPrincipal {
                loan_id,
                interest_type,
                principal_micros,
                outstanding_micros,
            } => write!(
                f,
                "loan '{loan_id}': outstanding {} exceeds principal {} on a {interest_type} loan \
                 (only PIK-family loans may capitalize interest)",
                format_micros(*outstanding_micros),
                format_micros(*principal_micros)
            ),
            MalformedLoanError::UnknownInterestType { loan_id, raw } => write!(
                f,
                "loan '{loan_id}': unknown interest type '{raw}', expected one of: cash | PIK | PIK-toggle"
            ),
            MalformedLoanError::InvalidMaturityDate { loan_id, raw } => {
                write!(f, "loan '{loan_id}': unparsable maturity date '{raw}'")
            }
            MalformedLoanError::DuplicateLoanId { loan_id } => {
                write!(f, "loan '{loan_id}' appears more than once in the batch")
            }
        }
    }
}

impl std::error::Error for MalformedLoanError {}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Convert a decimal amount string to integer micros deterministically.
///
/// Accepts an optional sign, `,` thousands separators in the integer part and
/// up to 6 decimal places. Sign is preserved; range checks happen in
/// [`validate_loan`].
pub fn amount_to_micros(
    s: &str,
    field: &'static str,
    loan_id: &str,
) -> Result<i64, MalformedLoanError> {
    let invalid = || MalformedLoanError::InvalidAmount {
        loan_id: loan_id.to_string(),
        field,
        raw: s.to_string(),
    };

    let t = s.trim();
    let (negative, digits) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };

    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let int_part: String = int_part.chars().filter(|c| *c != ',').collect();

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    if !all_digits(&int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }
    if frac_part.len() > 6 {
        return Err(MalformedLoanError::TooManyDecimalPlaces {
            loan_id: loan_id.to_string(),
            field,
            raw: s.to_string(),
        });
    }

    let int_val: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| invalid())?
    };
    let frac_val: i64 = if frac_part.is_empty() {
        0
    } else {
        format!("{frac_part:0<6}").parse().map_err(|_| invalid())?
    };

    let micros = int_val
        .checked_mul(MICROS_SCALE)
        .and_then(|v| v.checked_add(frac_val))
        .ok_or_else(invalid)?;

    Ok(if negative { -micros } else { micros })
}

/// Render micros as a plain decimal (`12500000`, `1.5`, `-0.000001`).
pub fn format_micros(micros: i64) -> String {
    let sign = if micros < 0 { "-" } else { "" };
    let abs = micros.unsigned_abs();
    let scale = MICROS_SCALE as u64;
    let whole = abs / scale;
    let frac = abs % scale;
    if frac == 0 {
        format!("{sign}{whole}")
    } else {
        let frac = format!("{frac:06}");
        format!("{sign}{whole}.{}", frac.trim_end_matches('0'))
    }
}

// ---------------------------------------------------------------------------
// Interest type
// ---------------------------------------------------------------------------

/// Infer the interest type from an adapter's free-text description.
///
/// `pik` / `payment-in-kind` means PIK; with `toggle` alongside it is
/// PIK-toggle. Anything else is cash-pay.
pub fn infer_interest_type(description: &str) -> InterestType {
    let words: Vec<String> = description
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();

    let has = |w: &str| words.iter().any(|x| x == w);
    let payment_in_kind = words
        .windows(3)
        .any(|w| w[0] == "payment" && w[1] == "in" && w[2] == "kind");

    if has("pik") || payment_in_kind {
        if has("toggle") {
            InterestType::PikToggle
        } else {
            InterestType::Pik
        }
    } else {
        InterestType::Cash
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize one adapter record into a validated [`Loan`].
pub fn normalize_loan(raw: &RawLoanRecord) -> Result<Loan, MalformedLoanError> {
    let loan_id = raw.loan_id.trim().to_string();
    if loan_id.is_empty() {
        return Err(MalformedLoanError::EmptyField {
            loan_id,
            field: "loanId",
        });
    }

    let interest_type = match raw.interest_type.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => {
            InterestType::parse(t).ok_or_else(|| MalformedLoanError::UnknownInterestType {
                loan_id: loan_id.clone(),
                raw: t.to_string(),
            })?
        }
        _ => infer_interest_type(raw.description.as_deref().unwrap_or("")),
    };

    let principal_micros = amount_to_micros(&raw.principal_amount, "principalAmount", &loan_id)?;
    let outstanding_micros =
        amount_to_micros(&raw.outstanding_balance, "outstandingBalance", &loan_id)?;

    let maturity_date = parse_maturity(&raw.maturity_date).ok_or_else(|| {
        MalformedLoanError::InvalidMaturityDate {
            loan_id: loan_id.clone(),
            raw: raw.maturity_date.clone(),
        }
    })?;

    let region = raw
        .region
        .as_deref()
        .map(Tag::new)
        .filter(|t| !t.is_empty());

    let loan = Loan {
        loan_id,
        borrower: raw.borrower.trim().to_string(),
        industry: Tag::new(&raw.industry),
        region,
        interest_type,
        principal_micros,
        outstanding_micros,
        maturity_date,
        covenants: raw.covenants.clone(),
    };
    validate_loan(&loan)?;
    Ok(loan)
}

fn parse_maturity(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|ts| ts.date_naive()))
}

/// Shape and range checks shared by intake and the classifier.
pub fn validate_loan(loan: &Loan) -> Result<(), MalformedLoanError> {
    let empty = |field| MalformedLoanError::EmptyField {
        loan_id: loan.loan_id.clone(),
        field,
    };
    if loan.loan_id.trim().is_empty() {
        return Err(empty("loanId"));
    }
    if loan.borrower.trim().is_empty() {
        return Err(empty("borrower"));
    }
    if loan.industry.is_empty() {
        return Err(empty("industry"));
    }
    if loan.principal_micros <= 0 {
        return Err(MalformedLoanError::NonPositivePrincipal {
            loan_id: loan.loan_id.clone(),
            principal_micros: loan.principal_micros,
        });
    }
    if loan.outstanding_micros < 0 {
        return Err(MalformedLoanError::NegativeBalance {
            loan_id: loan.loan_id.clone(),
            outstanding_micros: loan.outstanding_micros,
        });
    }
    if loan.outstanding_micros > loan.principal_micros && !loan.interest_type.is_pik_family() {
        return Err(MalformedLoanError::BalanceExceedsPrincipal {
            loan_id: loan.loan_id.clone(),
            interest_type: loan.interest_type,
            principal_micros: loan.principal_micros,
            outstanding_micros: loan.outstanding_micros,
        });
    }
    Ok(())
}
