//! Loan x active-signal correlation.

use std::cmp::Ordering;

use ssn_config::CorrelationConfig;
use ssn_schemas::{ActiveSignal, Loan, MatchedOn, SignalRef};

/// Strength in `[0, 1]` and the signal that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Correlation {
    pub strength: f64,
    /// `Some` iff `strength > 0`.
    pub best: Option<SignalRef>,
}

impl Correlation {
    pub fn none() -> Self {
        Self {
            strength: 0.0,
            best: None,
        }
    }

    /// Explanation fragment, e.g. `energy-sector signal '...' (effective severity 0.80)`.
    pub fn rationale(&self) -> Option<String> {
        let best = self.best.as_ref()?;
        let subject = match &best.matched_on {
            MatchedOn::Industry(tag) => format!("{}-sector signal", tag.display_name()),
            MatchedOn::Region(tag) => format!("{} regional signal", tag.display_name()),
        };
        Some(format!(
            "{subject} '{}' (effective severity {:.2})",
            best.headline, best.effective_severity
        ))
    }
}

/// Max effective severity over signals that hit the loan's industry (or its
/// region when `match_regions` is on). Ties go to the most recently published
/// signal, then the lowest `source_id`.
pub fn correlate(loan: &Loan, signals: &[ActiveSignal], cfg: &CorrelationConfig) -> Correlation {
    let mut best: Option<(&ActiveSignal, MatchedOn)> = None;

    for active in signals {
        if active.effective_severity.is_nan() || active.effective_severity <= 0.0 {
            continue;
        }
        let Some(matched_on) = match_signal(loan, active, cfg) else {
            continue;
        };
        let better = match &best {
            None => true,
            Some((current, _)) => outranks(active, current) == Ordering::Greater,
        };
        if better {
            best = Some((active, matched_on));
        }
    }

    match best {
        None => Correlation::none(),
        Some((active, matched_on)) => Correlation {
            strength: active.effective_severity.clamp(0.0, 1.0),
            best: Some(SignalRef::from_active(active, matched_on)),
        },
    }
}

fn match_signal(loan: &Loan, active: &ActiveSignal, cfg: &CorrelationConfig) -> Option<MatchedOn> {
    if active.signal.affected_industries.contains(&loan.industry) {
        return Some(MatchedOn::Industry(loan.industry.clone()));
    }
    if cfg.match_regions {
        if let Some(region) = &loan.region {
            if active.signal.affected_regions.contains(region) {
                return Some(MatchedOn::Region(region.clone()));
            }
        }
    }
    None
}

/// `Greater` when `a` should win over `b`.
fn outranks(a: &ActiveSignal, b: &ActiveSignal) -> Ordering {
    a.effective_severity
        .total_cmp(&b.effective_severity)
        .then_with(|| a.signal.published_at.cmp(&b.signal.published_at))
        .then_with(|| b.signal.source_id.cmp(&a.signal.source_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use ssn_schemas::{InterestType, Signal, Tag};

    fn loan(industry: &str, region: Option<&str>) -> Loan {
        Loan {
            loan_id: "L1".to_string(),
            borrower: "Acme".to_string(),
            industry: Tag::new(industry),
            region: region.map(Tag::new),
            interest_type: InterestType::Pik,
            principal_micros: 1,
            outstanding_micros: 1,
            maturity_date: chrono::NaiveDate::from_ymd_opt(2029, 1, 1).unwrap(),
            covenants: vec![],
        }
    }

    fn active(id: &str, industries: &[&str], regions: &[&str], sev: f64, hours_ago: i64) -> ActiveSignal {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        ActiveSignal {
            signal: Signal {
                source_id: id.to_string(),
                headline: format!("headline {id}"),
                published_at: now - Duration::hours(hours_ago),
                affected_industries: industries.iter().map(Tag::new).collect(),
                affected_regions: regions.iter().map(Tag::new).collect(),
                raw_severity: sev,
            },
            effective_severity: sev,
        }
    }

    #[test]
    fn picks_max_severity_among_industry_matches() {
        let signals = vec![
            active("a", &["energy"], &[], 0.4, 1),
            active("b", &["energy", "shipping"], &[], 0.7, 5),
            active("c", &["retail"], &[], 0.95, 0),
        ];
        let c = correlate(&loan("Energy", None), &signals, &CorrelationConfig::default());
        assert_eq!(c.strength, 0.7);
        assert_eq!(c.best.unwrap().source_id, "b");
    }

    #[test]
    fn severity_tie_goes_to_most_recent() {
        let signals = vec![
            active("old", &["energy"], &[], 0.6, 10),
            active("new", &["energy"], &[], 0.6, 2),
        ];
        let c = correlate(&loan("energy", None), &signals, &CorrelationConfig::default());
        assert_eq!(c.best.unwrap().source_id, "new");
    }

    #[test]
    fn no_intersection_is_zero_and_null() {
        let signals = vec![active("a", &["retail"], &["europe"], 0.9, 0)];
        let c = correlate(&loan("energy", Some("europe")), &signals, &CorrelationConfig::default());
        assert_eq!(c, Correlation::none());
        assert_eq!(c.rationale(), None);
    }

    #[test]
    fn region_match_is_opt_in() {
        let signals = vec![active("a", &["retail"], &["Middle East"], 0.9, 0)];
        let cfg = CorrelationConfig {
            match_regions: true,
            ..CorrelationConfig::default()
        };
        let c = correlate(&loan("energy", Some("middle east")), &signals, &cfg);
        assert_eq!(c.strength, 0.9);
        assert_eq!(
            c.rationale().unwrap(),
            "middle east regional signal 'headline a' (effective severity 0.90)"
        );
    }

    #[test]
    fn rationale_names_sector() {
        let signals = vec![active("a", &["energy"], &[], 0.8, 0)];
        let c = correlate(&loan("energy", None), &signals, &CorrelationConfig::default());
        assert_eq!(
            c.rationale().unwrap(),
            "energy-sector signal 'headline a' (effective severity 0.80)"
        );
    }
}
