//! Append-only run history.
//!
//! One JSON line per `ingest` or `enrich` run, so a data directory carries an
//! audit trail of what touched it.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Current schema version for `history.jsonl` lines.
pub const HISTORY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHistoryEntry {
    pub schema_version: u32,
    pub started_at_epoch_ms: u128,
    pub finished_at_epoch_ms: u128,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Run counts, shaped by the command.
    #[serde(default)]
    pub counts: Value,
}

/// Append a history entry as JSONL.
pub fn append_history(path: &Path, entry: &RunHistoryEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    let mut line = serde_json::to_string(entry).context("serialize history entry")?;
    line.push('\n');
    file.write_all(line.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_line_per_run() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("history.jsonl");
        let entry = RunHistoryEntry {
            schema_version: HISTORY_SCHEMA_VERSION,
            started_at_epoch_ms: 1,
            finished_at_epoch_ms: 2,
            command: "enrich".to_string(),
            pass: Some("examples".to_string()),
            success: true,
            message: None,
            counts: serde_json::json!({"clean": 3}),
        };
        append_history(&path, &entry).unwrap();
        append_history(&path, &entry).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: RunHistoryEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, entry);
    }
}
