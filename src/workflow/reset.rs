use super::DataContext;
use crate::cli::ResetArgs;
use crate::passes::PassKind;
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;

pub(crate) fn run_reset(ctx: &DataContext, args: &ResetArgs) -> Result<()> {
    let cleared = reset_pass(ctx, args.pass)?;
    match cleared {
        Some(done) => println!("Reset pass {}: forgot {done} processed words", args.pass),
        None => println!("Pass {} has no progress to reset", args.pass),
    }
    Ok(())
}

/// Delete a pass ledger, returning how many words it held. The review set
/// lives in the same file and goes with it.
pub(crate) fn reset_pass(ctx: &DataContext, pass: PassKind) -> Result<Option<usize>> {
    let ledger = ctx.load_ledger(pass)?;
    let path = ctx.paths.ledger_path(pass);
    match fs::remove_file(&path) {
        Ok(()) => {
            if ledger.is_empty() {
                tracing::debug!(pass = %pass, "removed empty ledger");
            } else {
                tracing::info!(pass = %pass, done = ledger.len(), "ledger reset");
            }
            Ok(Some(ledger.len()))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("remove {}", path.display())),
    }
}
