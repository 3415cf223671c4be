//! Per-pass completion ledger.
//!
//! The ledger only gates re-processing: a word listed here is skipped by its
//! pass no matter what the record currently holds. Content truth stays in the
//! dataset.
use crate::util::write_json_atomic;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Current schema version for `progress/<pass>.json`.
pub const LEDGER_SCHEMA_VERSION: u32 = 1;

fn legacy_schema_version() -> u32 {
    LEDGER_SCHEMA_VERSION
}

/// On-disk shape. Older progress files carry only `processed` and
/// `last_index`, so everything else defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default = "legacy_schema_version")]
    schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pass: Option<String>,
    #[serde(default)]
    processed: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    needs_review: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_index: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressLedger {
    path: Option<PathBuf>,
    pass: Option<String>,
    done: BTreeSet<String>,
    needs_review: BTreeSet<String>,
    last_index: Option<usize>,
}

impl ProgressLedger {
    /// Load the ledger for `pass`. A missing file is a cold start, not an
    /// error; an unreadable one is.
    pub fn load(path: &Path, pass: &str) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(Self {
                    path: Some(path.to_path_buf()),
                    pass: Some(pass.to_string()),
                    ..Self::default()
                });
            }
            Err(err) => {
                return Err(err).with_context(|| format!("read ledger {}", path.display()));
            }
        };
        let file: LedgerFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse ledger {}", path.display()))?;
        if file.schema_version != LEDGER_SCHEMA_VERSION {
            return Err(anyhow!(
                "unsupported ledger schema_version {} in {}",
                file.schema_version,
                path.display()
            ));
        }
        if let Some(recorded) = file.pass.as_deref() {
            if recorded != pass {
                return Err(anyhow!(
                    "ledger {} belongs to pass {recorded:?}, not {pass:?}",
                    path.display()
                ));
            }
        }
        Ok(Self {
            path: Some(path.to_path_buf()),
            pass: Some(pass.to_string()),
            done: file.processed.into_iter().collect(),
            needs_review: file.needs_review.into_iter().collect(),
            last_index: file.last_index,
        })
    }

    /// A ledger that lives only in memory; `save` is a no-op.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.done.contains(word)
    }

    /// Record that `word` reached a terminal decision. Idempotent.
    pub fn mark_done(&mut self, word: &str) -> bool {
        self.done.insert(word.to_string())
    }

    pub fn mark_needs_review(&mut self, word: &str) {
        self.needs_review.insert(word.to_string());
    }

    pub fn clear_needs_review(&mut self, word: &str) {
        self.needs_review.remove(word);
    }

    pub fn needs_review(&self) -> impl Iterator<Item = &str> {
        self.needs_review.iter().map(String::as_str)
    }

    pub fn review_count(&self) -> usize {
        self.needs_review.len()
    }

    pub fn set_last_index(&mut self, index: usize) {
        self.last_index = Some(index);
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Persist the full ledger state.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = LedgerFile {
            schema_version: LEDGER_SCHEMA_VERSION,
            pass: self.pass.clone(),
            processed: self.done.iter().cloned().collect(),
            needs_review: self.needs_review.iter().cloned().collect(),
            last_index: self.last_index,
        };
        write_json_atomic(path, &file).with_context(|| format!("save ledger {}", path.display()))?;
        tracing::debug!(done = self.done.len(), path = %path.display(), "ledger saved");
        Ok(())
    }
}
