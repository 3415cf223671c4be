//! Enrich step: one pass through the pipeline.
use super::{record_history, DataContext};
use crate::cli::EnrichArgs;
use crate::config::{resolve_api_key, resolve_lm_command, Backend, EnrichConfig};
use crate::generate::{CommandGenerator, Generator, MessagesClient, MessagesClientConfig};
use crate::passes::{PassKind, Selection};
use crate::paths::DataPaths;
use crate::pipeline::{plan_pass, run_pass, ConsoleProgress, PassPlan, RunSummary};
use crate::util::now_epoch_ms;
use anyhow::Result;
use std::io::{self, Write};

pub(crate) fn run_enrich(ctx: &DataContext, args: &EnrichArgs) -> Result<()> {
    let mut store = ctx.load_store()?;
    let mut ledger = ctx.load_ledger(args.pass)?;
    let options = ctx.config.pipeline_options(args.limit);
    if store.is_empty() {
        tracing::warn!(pass = %args.pass, "dataset has no records");
    }

    if args.dry_run {
        let plan = plan_pass(args.pass, &store, &ledger, &options.validator);
        write_dry_run(&mut io::stdout(), args.pass, &plan)?;
        return Ok(());
    }

    let backend = args.backend.unwrap_or(ctx.config.backend);
    let mut generator = build_generator(&ctx.paths, &ctx.config, backend, args.lm.as_deref())?;
    tracing::info!(pass = %args.pass, ?backend, "starting pass");

    let started = now_epoch_ms()?;
    let mut progress = ConsoleProgress::stdout();
    let result = run_pass(
        args.pass,
        &mut store,
        &mut ledger,
        generator.as_mut(),
        &options,
        &mut progress,
    );
    record_history(ctx, "enrich", Some(args.pass), started, &result);
    let summary = result?;
    write_summary(&mut io::stdout(), args.pass, &summary, ledger.review_count())?;
    Ok(())
}

fn build_generator(
    paths: &DataPaths,
    config: &EnrichConfig,
    backend: Backend,
    lm: Option<&str>,
) -> Result<Box<dyn Generator>> {
    match backend {
        Backend::Http => {
            let client = MessagesClient::new(MessagesClientConfig {
                api_url: config.api_url.clone(),
                api_key: resolve_api_key(paths)?,
                model: config.model.clone(),
                timeout: config.request_timeout(),
            })?;
            Ok(Box::new(client))
        }
        Backend::Command => {
            let command = resolve_lm_command(lm, config)?;
            Ok(Box::new(CommandGenerator::new(&command)?))
        }
    }
}

fn write_dry_run(out: &mut dyn Write, pass: PassKind, plan: &PassPlan) -> Result<()> {
    writeln!(
        out,
        "Pass {pass}: {} records, {} done, {} satisfied, {} pending, {} blocked",
        plan.total,
        plan.already_done,
        plan.satisfied,
        plan.pending(),
        plan.blocked()
    )?;
    for item in &plan.work {
        match item.selection {
            Selection::Blocked(reason) => {
                writeln!(out, "  {} (skip: {reason})", item.word)?;
            }
            _ => writeln!(out, "  {}", item.word)?,
        }
    }
    Ok(())
}

fn write_summary(
    out: &mut dyn Write,
    pass: PassKind,
    summary: &RunSummary,
    needs_review: usize,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Pass {pass} complete")?;
    writeln!(out, "  Pending found: {}", summary.pending)?;
    writeln!(out, "  Clean: {}", summary.clean)?;
    writeln!(out, "  Kept imperfect: {}", summary.imperfect)?;
    writeln!(out, "  Errors: {}", summary.errors)?;
    if summary.blocked > 0 {
        writeln!(out, "  Skipped: {}", summary.blocked)?;
    }
    if summary.deferred > 0 {
        writeln!(out, "  Deferred by --limit: {}", summary.deferred)?;
    }
    if needs_review > 0 {
        writeln!(out, "  Needs review (ledger): {needs_review}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ProgressLedger;
    use crate::record::{RecordStore, WordRecord};
    use crate::validate::Validator;

    #[test]
    fn dry_run_lists_pending_and_blocked_words() {
        let mut defined = WordRecord::new("lucid", 3);
        defined.set_definition("Expressed clearly; easy to understand.");
        let store =
            RecordStore::from_records(vec![defined, WordRecord::new("ardent", 2)]).unwrap();
        let plan = plan_pass(
            PassKind::Examples,
            &store,
            &ProgressLedger::in_memory(),
            &Validator::default(),
        );
        let mut out = Vec::new();
        write_dry_run(&mut out, PassKind::Examples, &plan).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Pass examples: 2 records, 0 done, 0 satisfied, 1 pending, 1 blocked\n  lucid\n  ardent (skip: no definition)\n"
        );
    }

    #[test]
    fn command_backend_without_command_is_a_config_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let paths = DataPaths::new(dir.path().to_path_buf());
        let config = EnrichConfig::default();
        let err = match build_generator(&paths, &config, Backend::Command, Some("   ")) {
            Ok(_) => panic!("blank command should be rejected"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("--lm"));
    }

    #[test]
    fn summary_mentions_review_count() {
        let summary = RunSummary {
            pending: 4,
            clean: 2,
            imperfect: 1,
            errors: 1,
            ..RunSummary::default()
        };
        let mut out = Vec::new();
        write_summary(&mut out, PassKind::Passages, &summary, 3).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Kept imperfect: 1"));
        assert!(text.contains("Needs review (ledger): 3"));
        assert!(!text.contains("Deferred"));
    }
}
