//! Resumable enrichment pipeline.
//!
//! One pass runs strictly sequentially: select pending records, resolve each
//! through the generator with a bounded attempt budget, commit the outcome to
//! the dataset and the pass ledger, and checkpoint both every batch. A crash
//! loses at most one batch of unflushed work; a re-run skips everything the
//! ledger already holds.
mod progress;

pub use progress::{ConsoleProgress, Progress};

use crate::generate::{GenerationRequest, Generator};
use crate::ledger::ProgressLedger;
use crate::passes::{Candidate, PassKind, Selection};
use crate::record::{RecordStore, WordRecord};
use crate::validate::Validator;
use anyhow::{Context, Result};
use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_CHECKPOINT_EVERY: usize = 50;
pub const DEFAULT_CALL_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_attempts: usize,
    /// Processed records between checkpoints.
    pub checkpoint_every: usize,
    /// Minimum gap between generator calls for different records.
    pub call_delay: Duration,
    /// Minimum gap between attempts for the same record.
    pub retry_delay: Duration,
    /// Cap on pending records resolved this run.
    pub limit: Option<usize>,
    pub validator: Validator,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            call_delay: DEFAULT_CALL_DELAY,
            retry_delay: DEFAULT_RETRY_DELAY,
            limit: None,
            validator: Validator::default(),
        }
    }
}

/// One generator response that produced text, kept while the retry loop runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationAttempt {
    pub candidate: Candidate,
    pub validated: bool,
    /// 1-based.
    pub attempt_index: usize,
}

/// Terminal state of one record in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Committed text that passed validation.
    Clean { attempts: usize },
    /// Committed the last text produced after every attempt failed validation.
    Imperfect {
        attempts: usize,
        occurrences: Option<usize>,
    },
    /// No attempt produced text; the record is untouched and stays pending.
    Error { attempts: usize, last_error: String },
    /// Pending but not sent to the generator.
    Skipped(&'static str),
}

impl RecordOutcome {
    /// Generator calls spent on the record.
    pub fn attempts(&self) -> usize {
        match self {
            RecordOutcome::Clean { attempts }
            | RecordOutcome::Imperfect { attempts, .. }
            | RecordOutcome::Error { attempts, .. } => *attempts,
            RecordOutcome::Skipped(_) => 0,
        }
    }
}

/// A record selected for this run, in dataset order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRecord {
    pub index: usize,
    pub word: String,
    pub selection: Selection,
}

/// Selection result for a whole pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassPlan {
    pub total: usize,
    pub already_done: usize,
    pub satisfied: usize,
    /// Pending and blocked records in dataset order.
    pub work: Vec<PlannedRecord>,
}

impl PassPlan {
    pub fn pending(&self) -> usize {
        self.work
            .iter()
            .filter(|item| item.selection == Selection::Pending)
            .count()
    }

    pub fn blocked(&self) -> usize {
        self.work.len() - self.pending()
    }
}

/// Aggregate counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub already_done: usize,
    pub satisfied: usize,
    pub pending: usize,
    pub blocked: usize,
    pub processed: usize,
    pub clean: usize,
    pub imperfect: usize,
    pub errors: usize,
    /// Pending records left for a later run by `limit`.
    pub deferred: usize,
    pub calls: usize,
    pub checkpoints: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Clean { .. } => self.clean += 1,
            RecordOutcome::Imperfect { .. } => self.imperfect += 1,
            RecordOutcome::Error { .. } => self.errors += 1,
            RecordOutcome::Skipped(_) => return,
        }
        self.processed += 1;
    }
}

/// Compute which records the pass still has to visit.
///
/// Ledger membership wins over field state: a word the ledger holds is done
/// for this pass even if its field would fail validation today.
pub fn plan_pass(
    pass: PassKind,
    store: &RecordStore,
    ledger: &ProgressLedger,
    validator: &Validator,
) -> PassPlan {
    let mut plan = PassPlan {
        total: store.len(),
        ..PassPlan::default()
    };
    for (index, record) in store.records().iter().enumerate() {
        if ledger.contains(record.word()) {
            plan.already_done += 1;
            continue;
        }
        match pass.select(record, validator) {
            Selection::Satisfied => plan.satisfied += 1,
            selection => plan.work.push(PlannedRecord {
                index,
                word: record.word().to_string(),
                selection,
            }),
        }
    }
    plan
}

/// Enforces a minimum pause between the end of one generator call and the
/// start of the next.
struct Pacer {
    last_finished: Option<Instant>,
}

impl Pacer {
    fn new() -> Self {
        Self {
            last_finished: None,
        }
    }

    fn wait(&mut self, gap: Duration) {
        if let Some(last) = self.last_finished {
            let elapsed = last.elapsed();
            if elapsed < gap {
                thread::sleep(gap - elapsed);
            }
        }
    }

    fn mark(&mut self) {
        self.last_finished = Some(Instant::now());
    }
}

enum Resolution {
    /// A validated attempt, or the last text produced once the budget ran out.
    Commit(GenerationAttempt),
    Failed { attempts: usize, last_error: String },
}

struct Resolver<'a> {
    pass: PassKind,
    generator: &'a mut dyn Generator,
    options: &'a PipelineOptions,
    pacer: Pacer,
    calls: usize,
}

impl Resolver<'_> {
    fn resolve(&mut self, record: &WordRecord, progress: &mut dyn Progress) -> Resolution {
        let request = GenerationRequest::for_record(record, self.pass);
        let word = record.word();
        let mut fallback: Option<GenerationAttempt> = None;
        let mut last_error = String::from("no attempts made");
        let attempts = self.options.max_attempts.max(1);

        for attempt_index in 1..=attempts {
            if attempt_index == 1 {
                self.pacer.wait(self.options.call_delay);
            } else {
                progress.retry(attempt_index);
                self.pacer.wait(self.options.retry_delay);
            }
            self.calls += 1;
            let started = Instant::now();
            let response = self.generator.generate(&request);
            self.pacer.mark();
            let raw = match response {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::warn!(
                        word,
                        pass = %self.pass,
                        attempt = attempt_index,
                        error = %format!("{err:#}"),
                        "generation failed"
                    );
                    last_error = format!("{err:#}");
                    continue;
                }
            };
            let candidate = self.pass.candidate(&raw);
            if !candidate.has_text() {
                tracing::warn!(word, pass = %self.pass, attempt = attempt_index, "empty response");
                last_error = "empty response".to_string();
                continue;
            }
            let validated = self
                .pass
                .accepts(word, &candidate, &self.options.validator);
            tracing::debug!(
                word,
                pass = %self.pass,
                attempt = attempt_index,
                validated,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "generation attempt"
            );
            let attempt = GenerationAttempt {
                candidate,
                validated,
                attempt_index,
            };
            if validated {
                return Resolution::Commit(attempt);
            }
            fallback = Some(attempt);
        }

        match fallback {
            Some(attempt) => Resolution::Commit(attempt),
            None => Resolution::Failed {
                attempts,
                last_error,
            },
        }
    }
}

/// Run one pass over the store, committing into `store` and `ledger`.
///
/// Only checkpoint write failures are returned as errors; every per-record
/// failure is reported through `progress` and the summary.
pub fn run_pass(
    pass: PassKind,
    store: &mut RecordStore,
    ledger: &mut ProgressLedger,
    generator: &mut dyn Generator,
    options: &PipelineOptions,
    progress: &mut dyn Progress,
) -> Result<RunSummary> {
    let validator = options.validator;
    let plan = plan_pass(pass, store, ledger, &validator);
    let work = limited_work(&plan, options.limit);
    let pending = plan.pending();
    let mut summary = RunSummary {
        total: plan.total,
        already_done: plan.already_done,
        satisfied: plan.satisfied,
        pending,
        blocked: plan.blocked(),
        ..RunSummary::default()
    };
    tracing::info!(
        pass = %pass,
        total = plan.total,
        already_done = plan.already_done,
        pending,
        blocked = summary.blocked,
        "pass planned"
    );

    let mut resolver = Resolver {
        pass,
        generator,
        options,
        pacer: Pacer::new(),
        calls: 0,
    };
    let checkpoint_every = options.checkpoint_every.max(1);
    let mut since_checkpoint = 0usize;
    let mut attempted_pending = 0usize;

    for (position, item) in work.iter().enumerate() {
        progress.start(position + 1, work.len(), &item.word);
        if let Selection::Blocked(reason) = item.selection {
            progress.finish(&RecordOutcome::Skipped(reason));
            continue;
        }
        attempted_pending += 1;
        let Some(record) = store.get(&item.word) else {
            continue;
        };
        let outcome = match resolver.resolve(record, progress) {
            Resolution::Commit(attempt) => {
                commit(pass, store, &item.word, &attempt.candidate, &validator);
                ledger.mark_done(&item.word);
                if attempt.validated {
                    ledger.clear_needs_review(&item.word);
                    RecordOutcome::Clean {
                        attempts: attempt.attempt_index,
                    }
                } else {
                    ledger.mark_needs_review(&item.word);
                    RecordOutcome::Imperfect {
                        attempts: options.max_attempts.max(1),
                        occurrences: pass.occurrences(&item.word, &attempt.candidate),
                    }
                }
            }
            Resolution::Failed {
                attempts,
                last_error,
            } => RecordOutcome::Error {
                attempts,
                last_error,
            },
        };
        progress.finish(&outcome);
        tracing::debug!(
            word = %item.word,
            pass = %pass,
            attempts = outcome.attempts(),
            "record resolved"
        );
        summary.record(&outcome);
        ledger.set_last_index(item.index);

        since_checkpoint += 1;
        if since_checkpoint >= checkpoint_every {
            checkpoint(store, ledger, pass)?;
            summary.checkpoints += 1;
            progress.checkpoint(summary.processed);
            since_checkpoint = 0;
        }
    }

    checkpoint(store, ledger, pass)?;
    summary.checkpoints += 1;
    summary.calls = resolver.calls;
    summary.deferred = pending - attempted_pending;
    tracing::info!(
        pass = %pass,
        processed = summary.processed,
        clean = summary.clean,
        imperfect = summary.imperfect,
        errors = summary.errors,
        deferred = summary.deferred,
        "pass finished"
    );
    Ok(summary)
}

/// Planned work up to and including the `limit`-th pending record.
fn limited_work(plan: &PassPlan, limit: Option<usize>) -> Vec<PlannedRecord> {
    let Some(limit) = limit else {
        return plan.work.clone();
    };
    let mut taken = 0usize;
    plan.work
        .iter()
        .take_while(|item| {
            if item.selection != Selection::Pending {
                return taken < limit;
            }
            taken += 1;
            taken <= limit
        })
        .cloned()
        .collect()
}

fn commit(
    pass: PassKind,
    store: &mut RecordStore,
    word: &str,
    candidate: &Candidate,
    validator: &Validator,
) {
    if let Some(record) = store.get_mut(word) {
        if pass.commit(record, candidate, validator) {
            tracing::debug!(word, pass = %pass, "definition updated");
        }
    }
}

/// Dataset first, then ledger: if the second write fails the ledger can only
/// lag the dataset, which re-selects work instead of skipping it.
fn checkpoint(store: &RecordStore, ledger: &ProgressLedger, pass: PassKind) -> Result<()> {
    store
        .save()
        .with_context(|| format!("checkpoint dataset for pass {pass}"))?;
    ledger
        .save()
        .with_context(|| format!("checkpoint ledger for pass {pass}"))?;
    Ok(())
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
