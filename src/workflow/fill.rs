//! Offline placeholder fill.
//!
//! Placeholders keep the dataset usable before any generation pass runs. The
//! validator recognizes every phrasing written here, so later passes replace
//! them.
use super::DataContext;
use crate::heuristics::{placeholder_definition, placeholder_example, placeholder_tldr};
use crate::record::RecordStore;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillSummary {
    pub total: usize,
    pub definitions: usize,
    pub examples: usize,
}

pub(crate) fn run_fill(ctx: &DataContext) -> Result<()> {
    let mut store = ctx.load_store()?;
    let summary = fill_placeholders(&mut store);
    store.save()?;
    tracing::info!(
        definitions = summary.definitions,
        examples = summary.examples,
        "placeholders written"
    );

    println!("Loaded {} words", summary.total);
    println!("  Filled definitions: {}", summary.definitions);
    println!("  Filled examples: {}", summary.examples);
    println!("Saved to: {}", ctx.paths.dataset_path().display());
    if summary.definitions > 0 {
        println!("Placeholder definitions are replaced by the definitions pass.");
    }
    Ok(())
}

pub(crate) fn fill_placeholders(store: &mut RecordStore) -> FillSummary {
    let mut summary = FillSummary {
        total: store.len(),
        ..FillSummary::default()
    };
    for record in store.records_mut() {
        if record.definition.trim().is_empty() {
            record.definition = placeholder_definition(record.word());
            record.tldr = placeholder_tldr(record.word());
            summary.definitions += 1;
        }
        if record.example.trim().is_empty() {
            record.example = placeholder_example(record.word());
            summary.examples += 1;
        }
    }
    summary
}
