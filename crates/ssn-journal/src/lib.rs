//! ssn-journal
//!
//! Append-only JSON Lines journal of escalation decisions with a SHA-256 hash
//! chain. This is the caller-side home of "last decision": read the latest
//! hedge back as the prior for the next cycle.
//!
//! Entry timestamps come from the decision itself; the journal never reads the
//! wall clock.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ssn_schemas::{EscalationAction, EscalationDecision};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Namespace for entry ids (UUID v5).
const ENTRY_NAMESPACE: Uuid = Uuid::from_u128(0x3c9e_51a0_7d24_4b8f_a613_0e5d_92f4_c7b1);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    pub entry_id: Uuid,
    pub decided_at: DateTime<Utc>,
    pub action: EscalationAction,
    /// Hash of the effective config that produced the decision, when known.
    pub config_hash: Option<String>,
    pub decision: EscalationDecision,
    pub hash_prev: Option<String>,
    pub hash_self: Option<String>,
}

impl JournalEntry {
    /// SHA-256 over the entry's compact JSON with `hash_self` cleared.
    ///
    /// Struct fields serialize in declaration order and nested maps are
    /// key-sorted, so the same entry always hashes the same.
    pub fn chain_hash(&self) -> Result<String> {
        let unsealed = JournalEntry {
            hash_self: None,
            ..self.clone()
        };
        let bytes = serde_json::to_vec(&unsealed).context("serialize journal entry")?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

// ---------------------------------------------------------------------------
// Chain head
// ---------------------------------------------------------------------------

/// Tip of a verified chain: what the next entry must link to.
#[derive(Debug, Clone, Default)]
struct ChainTip {
    hash: Option<String>,
    next_seq: u64,
}

impl ChainTip {
    /// Accept `entry` as the next link, or say why it does not fit.
    fn extend(&mut self, entry: &JournalEntry) -> Result<std::result::Result<(), String>> {
        if entry.hash_prev != self.hash {
            return Ok(Err(format!(
                "hash_prev mismatch: expected {:?}, got {:?}",
                self.hash, entry.hash_prev
            )));
        }
        if entry.seq != self.next_seq {
            return Ok(Err(format!(
                "seq gap: expected {}, got {}",
                self.next_seq, entry.seq
            )));
        }
        let Some(claimed) = entry.hash_self.as_deref() else {
            return Ok(Err("missing hash_self".to_string()));
        };
        let recomputed = entry.chain_hash()?;
        if claimed != recomputed {
            return Ok(Err(format!(
                "hash_self mismatch: claimed {claimed}, recomputed {recomputed}"
            )));
        }
        self.hash = Some(recomputed);
        self.next_seq += 1;
        Ok(Ok(()))
    }
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

pub struct DecisionJournal {
    path: PathBuf,
    tip: ChainTip,
}

impl DecisionJournal {
    /// Open (or create) a journal. An existing file is verified and the chain
    /// tip restored; a broken chain refuses to open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).with_context(|| format!("create journal dir {dir:?}"))?;
            }
            _ => {}
        }

        let tip = if path.exists() {
            let text = fs::read_to_string(&path).with_context(|| format!("read journal {path:?}"))?;
            match walk_chain(&text)? {
                (tip, None) => tip,
                (_, Some((line, reason))) => {
                    bail!("JOURNAL_CHAIN_BROKEN {path:?} line {line}: {reason}")
                }
            }
        } else {
            ChainTip::default()
        };

        Ok(Self { path, tip })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries written (the next entry's `seq`).
    pub fn seq(&self) -> u64 {
        self.tip.next_seq
    }

    /// Seal `decision` onto the chain and flush it as one line.
    pub fn append(
        &mut self,
        decision: &EscalationDecision,
        config_hash: Option<&str>,
    ) -> Result<JournalEntry> {
        let seq = self.tip.next_seq;
        let entry_key = format!(
            "{}|{seq}|{}",
            self.tip.hash.as_deref().unwrap_or("genesis"),
            decision.decision_id
        );

        let mut entry = JournalEntry {
            seq,
            entry_id: Uuid::new_v5(&ENTRY_NAMESPACE, entry_key.as_bytes()),
            decided_at: decision.decided_at,
            action: decision.action,
            config_hash: config_hash.map(str::to_string),
            decision: decision.clone(),
            hash_prev: self.tip.hash.clone(),
            hash_self: None,
        };
        let sealed = entry.chain_hash()?;
        entry.hash_self = Some(sealed.clone());

        let mut line = serde_json::to_string(&entry).context("serialize journal entry")?;
        line.push('\n');
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()))
            .with_context(|| format!("append to journal {:?}", self.path))?;

        self.tip.hash = Some(sealed);
        self.tip.next_seq += 1;
        Ok(entry)
    }

    pub fn entries(&self) -> Result<Vec<JournalEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("read journal {:?}", self.path))?;
        numbered_lines(&text)
            .map(|(n, l)| {
                serde_json::from_str(l).with_context(|| format!("parse journal entry at line {n}"))
            })
            .collect()
    }

    pub fn last_decision(&self) -> Result<Option<EscalationDecision>> {
        Ok(self.entries()?.pop().map(|e| e.decision))
    }

    /// Most recent hedge: the prior that drives hedge cooldown.
    pub fn last_hedge(&self) -> Result<Option<EscalationDecision>> {
        let mut entries = self.entries()?;
        entries.retain(|e| e.action == EscalationAction::Hedge);
        Ok(entries.pop().map(|e| e.decision))
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    Valid { lines: usize },
    Broken { line: usize, reason: String },
}

pub fn verify_journal(path: impl AsRef<Path>) -> Result<VerifyResult> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("read journal {path:?}"))?;
    verify_journal_str(&text)
}

/// Checks, per line: `hash_prev` links to the previous `hash_self`, `seq` is
/// contiguous from 0, and `hash_self` matches the recomputed hash.
pub fn verify_journal_str(text: &str) -> Result<VerifyResult> {
    Ok(match walk_chain(text)? {
        (tip, None) => VerifyResult::Valid {
            lines: tip.next_seq as usize,
        },
        (_, Some((line, reason))) => VerifyResult::Broken { line, reason },
    })
}

/// Non-blank lines with their 1-based file line numbers.
fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
}

/// Walk every line; stop at the first that breaks the chain.
fn walk_chain(text: &str) -> Result<(ChainTip, Option<(usize, String)>)> {
    let mut tip = ChainTip::default();
    for (line_no, line) in numbered_lines(text) {
        let entry: JournalEntry = match serde_json::from_str(line) {
            Ok(e) => e,
            Err(err) => return Ok((tip, Some((line_no, format!("unparsable entry: {err}"))))),
        };
        if let Err(reason) = tip.extend(&entry)? {
            return Ok((tip, Some((line_no, reason))));
        }
    }
    Ok((tip, None))
}
