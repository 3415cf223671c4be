//! Workflow status step.
//!
//! Status reads the dataset and every pass ledger and never calls a service.
use super::DataContext;
use crate::cli::StatusArgs;
use crate::passes::PassKind;
use crate::pipeline::plan_pass;
use crate::record::RecordStore;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub dataset: String,
    pub dataset_present: bool,
    pub records: usize,
    pub passes: Vec<PassStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassStatus {
    pub pass: PassKind,
    pub done: usize,
    pub pending: usize,
    pub blocked: usize,
    pub satisfied: usize,
    pub needs_review: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub review_words: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_index: Option<usize>,
}

pub(crate) fn run_status(ctx: &DataContext, args: &StatusArgs) -> Result<()> {
    let report = build_status(ctx)?;
    let mut out = io::stdout();
    if args.json {
        let text = serde_json::to_string_pretty(&report).context("serialize status")?;
        writeln!(out, "{text}")?;
    } else {
        write_status_text(&mut out, &report)?;
    }
    Ok(())
}

pub(crate) fn build_status(ctx: &DataContext) -> Result<StatusReport> {
    let dataset_path = ctx.paths.dataset_path();
    let dataset_present = dataset_path.is_file();
    let store = RecordStore::load_or_empty(&dataset_path)?;
    let validator = ctx.config.pipeline_options(None).validator;

    let mut passes = Vec::with_capacity(PassKind::ALL.len());
    for pass in PassKind::ALL {
        let ledger = ctx.load_ledger(pass)?;
        let plan = plan_pass(pass, &store, &ledger, &validator);
        passes.push(PassStatus {
            pass,
            done: ledger.len(),
            pending: plan.pending(),
            blocked: plan.blocked(),
            satisfied: plan.satisfied,
            needs_review: ledger.review_count(),
            review_words: ledger.needs_review().map(str::to_string).collect(),
            last_index: ledger.last_index(),
        });
    }
    Ok(StatusReport {
        dataset: dataset_path.display().to_string(),
        dataset_present,
        records: store.len(),
        passes,
    })
}

fn write_status_text(out: &mut dyn Write, report: &StatusReport) -> Result<()> {
    if report.dataset_present {
        writeln!(out, "Dataset: {} ({} records)", report.dataset, report.records)?;
    } else {
        writeln!(out, "Dataset: {} (missing)", report.dataset)?;
    }
    writeln!(
        out,
        "{:<16}{:>8}{:>9}{:>9}{:>8}",
        "pass", "done", "pending", "blocked", "review"
    )?;
    for status in &report.passes {
        writeln!(
            out,
            "{:<16}{:>8}{:>9}{:>9}{:>8}",
            status.pass.as_str(),
            status.done,
            status.pending,
            status.blocked,
            status.needs_review
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
