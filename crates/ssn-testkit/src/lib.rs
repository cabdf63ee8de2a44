//! Fixture builders and on-disk fixture writers shared by scenario tests.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use ssn_schemas::{
    ActiveSignal, AssessorKind, Covenant, InterestType, Loan, RawLoanRecord, RawSignalItem,
    RiskAssessment, RiskLevel, Signal, Tag, MICROS_SCALE,
};
use std::io::Write;
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Fixed reference instant for deterministic scenarios: 2026-03-02T12:00:00Z.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn hours_before(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    now - Duration::hours(hours)
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

/// Loan with whole-unit amounts. Borrower is derived from the id.
pub fn loan(
    loan_id: &str,
    industry: &str,
    interest_type: InterestType,
    principal_units: i64,
    outstanding_units: i64,
) -> Loan {
    Loan {
        loan_id: loan_id.to_string(),
        borrower: format!("{loan_id} Holdings"),
        industry: Tag::new(industry),
        region: None,
        interest_type,
        principal_micros: principal_units * MICROS_SCALE,
        outstanding_micros: outstanding_units * MICROS_SCALE,
        maturity_date: NaiveDate::from_ymd_opt(2029, 12, 31).unwrap_or_default(),
        covenants: Vec::new(),
    }
}

pub fn pik_loan(loan_id: &str, industry: &str, principal_units: i64, outstanding_units: i64) -> Loan {
    loan(loan_id, industry, InterestType::Pik, principal_units, outstanding_units)
}

pub fn cash_loan(loan_id: &str, industry: &str, principal_units: i64, outstanding_units: i64) -> Loan {
    loan(loan_id, industry, InterestType::Cash, principal_units, outstanding_units)
}

pub fn with_breach(mut loan: Loan, covenant: &str) -> Loan {
    loan.covenants.push(Covenant::breached(covenant));
    loan
}

pub fn with_borrower(mut loan: Loan, borrower: &str) -> Loan {
    loan.borrower = borrower.to_string();
    loan
}

/// Adapter-shaped record with decimal-string amounts.
pub fn raw_loan(
    loan_id: &str,
    industry: &str,
    interest_type: Option<&str>,
    principal: &str,
    outstanding: &str,
) -> RawLoanRecord {
    RawLoanRecord {
        loan_id: loan_id.to_string(),
        borrower: format!("{loan_id} Holdings"),
        industry: industry.to_string(),
        region: None,
        interest_type: interest_type.map(str::to_string),
        description: None,
        principal_amount: principal.to_string(),
        outstanding_balance: outstanding.to_string(),
        maturity_date: "2029-12-31".to_string(),
        covenants: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

pub fn raw_signal(
    source_id: &str,
    industries: &[&str],
    raw_severity: f64,
    published_at: DateTime<Utc>,
) -> RawSignalItem {
    RawSignalItem {
        source_id: source_id.to_string(),
        headline: format!("{source_id}: {} disruption", industries.join("/")),
        published_at: published_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        affected_industries: industries.iter().map(|s| s.to_string()).collect(),
        affected_regions: Vec::new(),
        raw_severity,
    }
}

pub fn signal_at(
    source_id: &str,
    industries: &[&str],
    raw_severity: f64,
    published_at: DateTime<Utc>,
) -> Signal {
    Signal {
        source_id: source_id.to_string(),
        headline: format!("{source_id}: {} disruption", industries.join("/")),
        published_at,
        affected_industries: industries.iter().map(Tag::new).collect(),
        affected_regions: Default::default(),
        raw_severity,
    }
}

/// Already-scored signal for correlator tests (raw severity = effective severity).
pub fn active(
    source_id: &str,
    industries: &[&str],
    effective_severity: f64,
    published_at: DateTime<Utc>,
) -> ActiveSignal {
    ActiveSignal {
        signal: signal_at(source_id, industries, effective_severity, published_at),
        effective_severity,
    }
}

// ---------------------------------------------------------------------------
// Assessments
// ---------------------------------------------------------------------------

/// Bare assessment for escalation tests.
pub fn assessment(loan_id: &str, risk_level: RiskLevel, correlation_strength: f64) -> RiskAssessment {
    RiskAssessment {
        loan_id: loan_id.to_string(),
        borrower: format!("{loan_id} Holdings"),
        risk_level,
        flag_reason: format!("fixture {}", risk_level.as_str()),
        correlated_event: None,
        structural_tier: risk_level,
        correlation_strength,
        shadow_default_probability: 0.0,
        assessor: AssessorKind::RuleBased,
        outstanding_micros: 0,
        flagged_at: t0(),
    }
}

// ---------------------------------------------------------------------------
// On-disk fixtures
// ---------------------------------------------------------------------------

/// Write `value` as pretty JSON to a temp file kept alive by the returned handle.
pub fn write_json_fixture<T: Serialize>(value: &T) -> Result<NamedTempFile> {
    let mut f = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .context("create json fixture")?;
    serde_json::to_writer_pretty(&mut f, value).context("write json fixture")?;
    f.flush().context("flush json fixture")?;
    Ok(f)
}

pub fn write_text_fixture(contents: &str, suffix: &str) -> Result<NamedTempFile> {
    let mut f = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .context("create text fixture")?;
    f.write_all(contents.as_bytes()).context("write text fixture")?;
    f.flush().context("flush text fixture")?;
    Ok(f)
}

/// Header of the flat loan CSV accepted by the CLI.
pub const LOAN_CSV_HEADER: [&str; 10] = [
    "loan_id",
    "borrower",
    "industry",
    "region",
    "interest_type",
    "description",
    "principal_amount",
    "outstanding_balance",
    "maturity_date",
    "breached_covenants",
];

/// Write loans as CSV. Breached covenant names are `;`-joined in the last column.
pub fn write_loans_csv(records: &[RawLoanRecord]) -> Result<NamedTempFile> {
    let mut f = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .context("create loans csv")?;
    {
        let mut w = csv::Writer::from_writer(&mut f);
        w.write_record(LOAN_CSV_HEADER).context("write csv header")?;
        for r in records {
            let breached = r
                .covenants
                .iter()
                .filter(|c| c.is_breached())
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(";");
            w.write_record([
                r.loan_id.as_str(),
                r.borrower.as_str(),
                r.industry.as_str(),
                r.region.as_deref().unwrap_or(""),
                r.interest_type.as_deref().unwrap_or(""),
                r.description.as_deref().unwrap_or(""),
                r.principal_amount.as_str(),
                r.outstanding_balance.as_str(),
                r.maturity_date.as_str(),
                breached.as_str(),
            ])
            .with_context(|| format!("write csv row for {}", r.loan_id))?;
        }
        w.flush().context("flush loans csv")?;
    }
    Ok(f)
}
