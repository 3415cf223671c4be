//! Ingest step: raw word list in, dictionary-backed records out.
use super::{record_history, DataContext};
use crate::cli::IngestArgs;
use crate::dictionary::{DictionaryClient, DictionaryLookup};
use crate::heuristics::estimate_difficulty;
use crate::record::{RecordStore, WordRecord};
use crate::util::now_epoch_ms;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Translation slot the dataset carries for every word; filled elsewhere.
const TRANSLATION_FIELD: &str = "korean";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub requested: usize,
    pub existing: usize,
    pub added: usize,
    pub missing: usize,
    pub checkpoints: usize,
}

pub(crate) struct IngestOptions {
    pub(crate) checkpoint_every: usize,
    pub(crate) lookup_delay: Duration,
}

pub(crate) fn run_ingest(ctx: &DataContext, args: &IngestArgs) -> Result<()> {
    let started = now_epoch_ms()?;
    let words = read_raw_words(&args.words)?;
    let mut store = RecordStore::load_or_empty(&ctx.paths.dataset_path())?;
    let mut lookup =
        DictionaryClient::new(&ctx.config.dictionary_url, ctx.config.lookup_timeout());
    let options = IngestOptions {
        checkpoint_every: ctx.config.checkpoint_every,
        lookup_delay: ctx.config.lookup_delay(),
    };
    let mut out = io::stdout();
    let result = ingest_words(&mut store, &words, &mut lookup, &options, &mut out);
    record_history(ctx, "ingest", None, started, &result);
    let summary = result?;

    println!();
    println!(
        "Added {} words ({} already present, {} without dictionary entries)",
        summary.added, summary.existing, summary.missing
    );
    println!("Saved to: {}", ctx.paths.dataset_path().display());
    Ok(())
}

/// Read a JSON array of words, trimming and de-duplicating in file order.
pub(crate) fn read_raw_words(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).with_context(|| format!("read word list {}", path.display()))?;
    let raw: Vec<String> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse word list {}", path.display()))?;
    let mut seen = HashSet::new();
    Ok(raw
        .into_iter()
        .map(|word| word.trim().to_string())
        .filter(|word| !word.is_empty() && seen.insert(word.clone()))
        .collect())
}

pub(crate) fn ingest_words(
    store: &mut RecordStore,
    words: &[String],
    lookup: &mut dyn DictionaryLookup,
    options: &IngestOptions,
    out: &mut dyn Write,
) -> Result<IngestSummary> {
    let mut summary = IngestSummary {
        requested: words.len(),
        ..IngestSummary::default()
    };
    let new_words: Vec<&String> = words.iter().filter(|word| !store.contains(word)).collect();
    summary.existing = words.len() - new_words.len();
    tracing::info!(
        requested = summary.requested,
        new = new_words.len(),
        "ingesting words"
    );

    let checkpoint_every = options.checkpoint_every.max(1);
    let mut since_checkpoint = 0usize;
    for (position, word) in new_words.iter().enumerate() {
        if position > 0 && !options.lookup_delay.is_zero() {
            thread::sleep(options.lookup_delay);
        }
        let _ = write!(out, "[{}/{}] {word}... ", position + 1, new_words.len());
        let mut record = WordRecord::new(word.as_str(), estimate_difficulty(word));
        record
            .extra
            .insert(TRANSLATION_FIELD.to_string(), Value::from(""));
        match lookup.lookup(word) {
            Some(entry) => {
                record.set_definition(entry.definition);
                record.part_of_speech = entry.part_of_speech;
                record.example = entry.example;
                let _ = writeln!(out, "OK");
            }
            None => {
                summary.missing += 1;
                let _ = writeln!(out, "MISSING");
            }
        }
        if !store.insert(record) {
            continue;
        }
        summary.added += 1;
        since_checkpoint += 1;
        if since_checkpoint >= checkpoint_every {
            store.save()?;
            summary.checkpoints += 1;
            since_checkpoint = 0;
        }
    }
    store.save()?;
    summary.checkpoints += 1;
    Ok(summary)
}
