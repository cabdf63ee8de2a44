//! `ssn analyze`: one full cycle from files, optionally journaled and dispatched.

use anyhow::{Context, Result};
use serde::Serialize;
use ssn_journal::DecisionJournal;
use ssn_risk::normalize_loan;
use ssn_runtime::{AnalysisCycle, DecisionDispatcher, DispatchOutcome, Engine, LoggingExecutor};
use ssn_schemas::{EscalationDecision, Loan};
use tracing::info;
use uuid::Uuid;

use crate::commands::{load_engine_config, parse_assessor, parse_now};
use crate::input::{load_loans, load_signals};

pub struct AnalyzeArgs {
    pub loans: String,
    pub signals: Option<String>,
    pub config_paths: Vec<String>,
    pub assessor: Option<String>,
    pub journal: Option<String>,
    pub now: Option<String>,
    pub dispatch: bool,
    pub strict_config: bool,
}

/// Printed to stdout as pretty JSON.
#[derive(Serialize)]
struct AnalyzeReport {
    config_hash: String,
    /// Journal `seq` of the entry written for this decision, if any.
    journal_seq: Option<u64>,
    /// `executed` | `already_executed` | `no_action`; absent without `--dispatch`.
    dispatch: Option<&'static str>,
    cycle: AnalysisCycle,
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let now = parse_now(args.now.as_deref())?;
    let (loaded, cfg) = load_engine_config(&args.config_paths, args.strict_config)?;
    let assessor = match args.assessor.as_deref() {
        Some(s) => parse_assessor(s)?,
        None => cfg.default_assessor,
    };

    let engine = Engine::new(cfg)?;
    if let Some(path) = &args.signals {
        let raw = load_signals(path)?;
        let held = engine.ingest_batch(&raw)?;
        info!(path = %path, items = raw.len(), window = held, "signals ingested");
    }

    let loans = normalize_all(&load_loans(&args.loans)?)?;

    let mut journal = match &args.journal {
        Some(p) => Some(DecisionJournal::open(p)?),
        None => None,
    };
    let (prior, journaled): (Option<EscalationDecision>, Vec<Uuid>) = match &journal {
        Some(j) => (
            j.last_hedge()?,
            j.entries()?.into_iter().map(|e| e.decision.decision_id).collect(),
        ),
        None => (None, Vec::new()),
    };

    let cycle = engine.analyze(&loans, prior.as_ref(), now, assessor)?;

    let dispatch = if args.dispatch {
        let mut dispatcher =
            DecisionDispatcher::with_executed(LoggingExecutor::default(), journaled.iter().copied());
        Some(match dispatcher.dispatch(&cycle.decision)? {
            DispatchOutcome::Executed(_) => "executed",
            DispatchOutcome::AlreadyExecuted => "already_executed",
            DispatchOutcome::NoAction => "no_action",
        })
    } else {
        None
    };

    // Re-running the same instant reproduces the same decision id; record it once.
    let journal_seq = match journal.as_mut() {
        Some(j) if !journaled.contains(&cycle.decision.decision_id) => {
            let entry = j.append(&cycle.decision, Some(&loaded.config_hash))?;
            Some(entry.seq)
        }
        _ => None,
    };

    let report = AnalyzeReport {
        config_hash: loaded.config_hash,
        journal_seq,
        dispatch,
        cycle,
    };
    let out = serde_json::to_string_pretty(&report).context("serialize analysis report")?;
    println!("{out}");
    Ok(())
}

/// All-or-nothing: the first malformed record aborts the run.
pub(crate) fn normalize_all(raw: &[ssn_schemas::RawLoanRecord]) -> Result<Vec<Loan>> {
    raw.iter()
        .enumerate()
        .map(|(i, r)| {
            normalize_loan(r).with_context(|| format!("MALFORMED_LOAN record {} ({})", i, r.loan_id))
        })
        .collect()
}
