use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::Tag;

// ---------------------------------------------------------------------------
// Interest type
// ---------------------------------------------------------------------------

/// How a loan's interest is paid.
///
/// Wire values are `cash`, `PIK` and `PIK-toggle`; parsing is case-insensitive
/// and also accepts `payment-in-kind`, `pik_toggle` and bare `toggle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InterestType {
    Cash,
    Pik,
    PikToggle,
}

impl InterestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestType::Cash => "cash",
            InterestType::Pik => "PIK",
            InterestType::PikToggle => "PIK-toggle",
        }
    }

    /// PIK or PIK-toggle: interest may be capitalized into the balance.
    pub fn is_pik_family(&self) -> bool {
        matches!(self, InterestType::Pik | InterestType::PikToggle)
    }

    pub fn parse(s: &str) -> Option<Self> {
        let folded: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        match folded.as_str() {
            "cash" | "cash-pay" => Some(InterestType::Cash),
            "pik" | "payment-in-kind" => Some(InterestType::Pik),
            "pik-toggle" | "toggle" => Some(InterestType::PikToggle),
            _ => None,
        }
    }
}

impl TryFrom<String> for InterestType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        InterestType::parse(&s).ok_or_else(|| {
            format!("invalid interest type '{s}'. expected one of: cash | PIK | PIK-toggle")
        })
    }
}

impl From<InterestType> for String {
    fn from(t: InterestType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for InterestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Covenants
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovenantStatus {
    Compliant,
    Breached,
    Waived,
}

/// One covenant descriptor attached to a loan (ordered as the source lists them).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Covenant {
    pub name: String,
    pub status: CovenantStatus,
}

impl Covenant {
    pub fn compliant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CovenantStatus::Compliant,
        }
    }

    pub fn breached(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CovenantStatus::Breached,
        }
    }

    pub fn is_breached(&self) -> bool {
        self.status == CovenantStatus::Breached
    }
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

/// Immutable loan snapshot as produced by the extraction collaborator.
///
/// Amounts are integer micros. `outstanding_micros > principal_micros` is only
/// legal for PIK-family loans (capitalized interest); the risk crate rejects
/// anything else as malformed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: String,
    pub borrower: String,
    pub industry: Tag,
    /// Borrower's primary region, when the source models geography.
    #[serde(default)]
    pub region: Option<Tag>,
    pub interest_type: InterestType,
    pub principal_micros: i64,
    pub outstanding_micros: i64,
    pub maturity_date: NaiveDate,
    #[serde(default)]
    pub covenants: Vec<Covenant>,
}

impl Loan {
    pub fn breached_covenants(&self) -> impl Iterator<Item = &Covenant> {
        self.covenants.iter().filter(|c| c.is_breached())
    }

    pub fn has_covenant_breach(&self) -> bool {
        self.breached_covenants().next().is_some()
    }
}

/// Loan record as handed over by a source adapter (accounting / payment platform).
///
/// Amounts stay decimal strings until normalization so conversion to micros is
/// deterministic; adapters that emit JSON numbers are accepted as well.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLoanRecord {
    #[serde(alias = "loan_id")]
    pub loan_id: String,
    pub borrower: String,
    pub industry: String,
    #[serde(default)]
    pub region: Option<String>,
    /// Explicit interest type; when absent it is inferred from `description`.
    #[serde(default, alias = "interest_type")]
    pub interest_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "principal_amount", deserialize_with = "decimal_string")]
    pub principal_amount: String,
    #[serde(alias = "outstanding_balance", deserialize_with = "decimal_string")]
    pub outstanding_balance: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    #[serde(alias = "maturity_date")]
    pub maturity_date: String,
    #[serde(default)]
    pub covenants: Vec<Covenant>,
}

/// Accept either `"12500000.50"` or `12500000.5` and keep the decimal text.
fn decimal_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(d)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
