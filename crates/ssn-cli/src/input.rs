//! Loan and signal file loaders.
//!
//! Loans come as JSON (an array, or `{"loans": [...]}`) or as a flat CSV with
//! breached covenant names `;`-joined in one column. Signals are JSON only.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use ssn_schemas::{Covenant, RawLoanRecord, RawSignalItem};
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum LoanDoc {
    List(Vec<RawLoanRecord>),
    Wrapped { loans: Vec<RawLoanRecord> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignalDoc {
    List(Vec<RawSignalItem>),
    Wrapped { signals: Vec<RawSignalItem> },
}

/// One row of the flat loan CSV.
#[derive(Debug, Deserialize)]
struct CsvLoanRow {
    loan_id: String,
    borrower: String,
    industry: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    interest_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
    principal_amount: String,
    outstanding_balance: String,
    maturity_date: String,
    #[serde(default)]
    breached_covenants: Option<String>,
}

impl CsvLoanRow {
    fn into_record(self) -> RawLoanRecord {
        let covenants = self
            .breached_covenants
            .as_deref()
            .unwrap_or("")
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Covenant::breached)
            .collect();
        RawLoanRecord {
            loan_id: self.loan_id,
            borrower: self.borrower,
            industry: self.industry,
            region: non_empty(self.region),
            interest_type: non_empty(self.interest_type),
            description: non_empty(self.description),
            principal_amount: self.principal_amount,
            outstanding_balance: self.outstanding_balance,
            maturity_date: self.maturity_date,
            covenants,
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn read_utf8(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read failed: {}", path.display()))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    String::from_utf8(bytes.to_vec())
        .with_context(|| format!("{} must be UTF-8 text", path.display()))
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

pub fn load_loans(path: &str) -> Result<Vec<RawLoanRecord>> {
    let path = Path::new(path);
    match extension(path).as_str() {
        "json" => {
            let raw = read_utf8(path)?;
            let doc: LoanDoc = serde_json::from_str(raw.trim())
                .with_context(|| format!("{} must contain a JSON loan list", path.display()))?;
            Ok(match doc {
                LoanDoc::List(v) | LoanDoc::Wrapped { loans: v } => v,
            })
        }
        "csv" => load_loans_csv(path),
        other => bail!(
            "unsupported loan file extension '{}'. expected one of: json | csv",
            other
        ),
    }
}

fn load_loans_csv(path: &Path) -> Result<Vec<RawLoanRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open loan csv: {}", path.display()))?;
    let mut out = Vec::new();
    for (i, row) in rdr.deserialize::<CsvLoanRow>().enumerate() {
        // +2: header line, 1-based
        let row = row.with_context(|| format!("loan csv row {} malformed", i + 2))?;
        out.push(row.into_record());
    }
    Ok(out)
}

pub fn load_signals(path: &str) -> Result<Vec<RawSignalItem>> {
    let path = Path::new(path);
    let raw = read_utf8(path)?;
    let doc: SignalDoc = serde_json::from_str(raw.trim())
        .with_context(|| format!("{} must contain a JSON signal list", path.display()))?;
    Ok(match doc {
        SignalDoc::List(v) | SignalDoc::Wrapped { signals: v } => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_row_splits_breached_covenants_and_drops_blanks() {
        let row = CsvLoanRow {
            loan_id: "L1".into(),
            borrower: "Acme".into(),
            industry: "Energy".into(),
            region: Some("".into()),
            interest_type: Some("PIK".into()),
            description: None,
            principal_amount: "100".into(),
            outstanding_balance: "120".into(),
            maturity_date: "2029-01-01".into(),
            breached_covenants: Some("leverage; ;fixed charge".into()),
        };
        let rec = row.into_record();
        assert_eq!(rec.region, None);
        assert_eq!(rec.covenants.len(), 2);
        assert!(rec.covenants.iter().all(|c| c.is_breached()));
        assert_eq!(rec.covenants[1].name, "fixed charge");
    }

    #[test]
    fn wrapped_and_bare_loan_documents_both_parse() {
        let body = r#"{"loanId":"A","borrower":"B","industry":"Energy",
            "principalAmount":"1","outstandingBalance":"1","maturityDate":"2029-01-01"}"#;
        let bare: LoanDoc = serde_json::from_str(&format!("[{body}]")).unwrap();
        let wrapped: LoanDoc = serde_json::from_str(&format!("{{\"loans\":[{body}]}}")).unwrap();
        assert!(matches!(bare, LoanDoc::List(v) if v.len() == 1));
        assert!(matches!(wrapped, LoanDoc::Wrapped { loans } if loans.len() == 1));
    }
}
