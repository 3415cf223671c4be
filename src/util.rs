use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Serialize `value` as pretty JSON and publish it over `dest` in one rename.
///
/// The bytes land in a temp file beside the destination first so a reader
/// sees either the previous file or the complete new one.
pub fn write_json_atomic<T: Serialize + ?Sized>(dest: &Path, value: &T) -> Result<()> {
    let parent = dest
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    let mut bytes = serde_json::to_vec_pretty(value)
        .with_context(|| format!("serialize {}", dest.display()))?;
    bytes.push(b'\n');
    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("stage {}", dest.display()))?;
    tmp.write_all(&bytes)
        .with_context(|| format!("write staged {}", dest.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync staged {}", dest.display()))?;
    tmp.persist(dest)
        .map_err(|err| anyhow!("publish {}: {}", dest.display(), err.error))?;
    Ok(())
}

pub fn truncate_string(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut truncated = String::new();
    for ch in text.chars() {
        if truncated.len() + ch.len_utf8() > max_bytes {
            break;
        }
        truncated.push(ch);
    }
    truncated
}

/// Current epoch time in milliseconds for history timestamps.
pub fn now_epoch_ms() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("compute timestamp")?
        .as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_string_respects_char_boundaries() {
        assert_eq!(truncate_string("héllo", 2), "h");
        assert_eq!(truncate_string("héllo", 3), "hé");
        assert_eq!(truncate_string("short", 64), "short");
    }

    #[test]
    fn write_json_atomic_replaces_existing_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("value.json");
        write_json_atomic(&path, &vec!["a", "b"]).expect("first write");
        write_json_atomic(&path, &vec!["c"]).expect("second write");

        let text = fs::read_to_string(&path).expect("read back");
        let parsed: Vec<String> = serde_json::from_str(&text).expect("parse back");
        assert_eq!(parsed, vec!["c".to_string()]);

        let leftovers = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .count();
        assert_eq!(leftovers, 1, "staged temp file should not linger");
    }
}
