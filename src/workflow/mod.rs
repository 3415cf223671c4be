//! Command workflows.
//!
//! Each command loads the data directory context, does one job, and prints a
//! short report. Pass policy stays in `passes` and `pipeline`.
mod context;
mod enrich;
mod fill;
mod ingest;
mod reset;
mod status;

pub(crate) use context::DataContext;
pub(crate) use enrich::run_enrich;
pub(crate) use fill::run_fill;
pub(crate) use ingest::run_ingest;
pub(crate) use reset::run_reset;
pub(crate) use status::run_status;

use crate::history::{append_history, RunHistoryEntry, HISTORY_SCHEMA_VERSION};
use crate::passes::PassKind;
use crate::util::now_epoch_ms;
use anyhow::{Context, Result};
use serde::Serialize;

/// Append a history line for a finished (or failed) run. A history write
/// failure is logged and never replaces the run's own result.
fn record_history<T: Serialize>(
    ctx: &DataContext,
    command: &str,
    pass: Option<PassKind>,
    started_at_epoch_ms: u128,
    result: &Result<T>,
) {
    if let Err(err) = append_run_history(ctx, command, pass, started_at_epoch_ms, result) {
        tracing::warn!(
            command,
            path = %ctx.paths.history_path().display(),
            error = %format!("{err:#}"),
            "failed to record run history"
        );
    }
}

fn append_run_history<T: Serialize>(
    ctx: &DataContext,
    command: &str,
    pass: Option<PassKind>,
    started_at_epoch_ms: u128,
    result: &Result<T>,
) -> Result<()> {
    let (success, message, counts) = match result {
        Ok(counts) => (
            true,
            None,
            serde_json::to_value(counts).context("serialize run counts")?,
        ),
        Err(err) => (false, Some(format!("{err:#}")), serde_json::Value::Null),
    };
    let entry = RunHistoryEntry {
        schema_version: HISTORY_SCHEMA_VERSION,
        started_at_epoch_ms,
        finished_at_epoch_ms: now_epoch_ms()?,
        command: command.to_string(),
        pass: pass.map(|pass| pass.as_str().to_string()),
        success,
        message,
        counts,
    };
    append_history(&ctx.paths.history_path(), &entry)
}
