//! Word records and the in-memory store that loads and saves the dataset.
//!
//! The dataset is a flat JSON array. It is always rewritten whole, never
//! patched, so a checkpoint either publishes every record or none of them.
use crate::heuristics::derive_tldr;
use crate::util::write_json_atomic;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;

/// One vocabulary entry, keyed by `word`.
///
/// Keys the enrichment passes do not know about (translations, app-side
/// metadata) ride along in `extra` so a save never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    word: String,
    #[serde(default = "default_level", deserialize_with = "level_clamped")]
    pub level: u8,
    #[serde(default, deserialize_with = "string_or_null")]
    pub definition: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub tldr: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub part_of_speech: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub example: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub passage: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WordRecord {
    pub fn new(word: impl Into<String>, level: u8) -> Self {
        Self {
            word: word.into(),
            level: level.clamp(MIN_LEVEL, MAX_LEVEL),
            definition: String::new(),
            tldr: String::new(),
            part_of_speech: String::new(),
            example: String::new(),
            passage: String::new(),
            extra: Map::new(),
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    /// Replace the definition and re-derive the TL;DR from it.
    pub fn set_definition(&mut self, definition: impl Into<String>) {
        self.definition = definition.into();
        self.tldr = derive_tldr(&self.definition);
    }
}

fn default_level() -> u8 {
    MIN_LEVEL
}

fn level_clamped<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw
        .map(|level| level.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u8)
        .unwrap_or(MIN_LEVEL))
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ordered record collection with lookup by word.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: Option<PathBuf>,
    records: Vec<WordRecord>,
    index: HashMap<String, usize>,
}

impl RecordStore {
    /// Load the dataset; a missing or malformed file is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read dataset {}", path.display()))?;
        let records: Vec<WordRecord> = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse dataset {}", path.display()))?;
        let mut store = Self::from_records(records)
            .with_context(|| format!("index dataset {}", path.display()))?;
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Load the dataset, starting empty when the file does not exist yet.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path: Some(path.to_path_buf()),
                records: Vec::new(),
                index: HashMap::new(),
            });
        }
        Self::load(path)
    }

    /// Build a store that is never written to disk.
    pub fn from_records(records: Vec<WordRecord>) -> Result<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if record.word.trim().is_empty() {
                return Err(anyhow!("record {position} has an empty word"));
            }
            if index.insert(record.word.clone(), position).is_some() {
                return Err(anyhow!("duplicate word {:?} at record {position}", record.word));
            }
        }
        Ok(Self {
            path: None,
            records,
            index,
        })
    }

    /// Rewrite the whole dataset. In-memory stores have nothing to flush.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_json_atomic(path, &self.records)
            .with_context(|| format!("save dataset {}", path.display()))?;
        tracing::debug!(records = self.records.len(), path = %path.display(), "dataset saved");
        Ok(())
    }

    pub fn get(&self, word: &str) -> Option<&WordRecord> {
        self.index.get(word).map(|&position| &self.records[position])
    }

    pub fn get_mut(&mut self, word: &str) -> Option<&mut WordRecord> {
        self.index
            .get(word)
            .copied()
            .map(move |position| &mut self.records[position])
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Append a record. Returns false and leaves the store untouched when the
    /// word already exists.
    pub fn insert(&mut self, record: WordRecord) -> bool {
        if self.index.contains_key(&record.word) {
            return false;
        }
        self.index.insert(record.word.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn records(&self) -> &[WordRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut WordRecord> {
        self.records.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
