use anyhow::{bail, Result};
use ssn_journal::{verify_journal, VerifyResult};

/// `ssn journal verify <path>`; a broken chain exits non-zero.
pub fn verify(path: &str) -> Result<()> {
    match verify_journal(path)? {
        VerifyResult::Valid { lines } => {
            println!("journal_ok=true lines={lines}");
            Ok(())
        }
        VerifyResult::Broken { line, reason } => {
            println!("journal_ok=false line={line}");
            bail!("JOURNAL_CHAIN_BROKEN line {line}: {reason}")
        }
    }
}
