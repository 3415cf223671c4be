//! Shared test infrastructure for end-to-end tests.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const DATASET: &str = "words_processed.json";

/// A throwaway data directory plus helpers for driving the `vocab` binary.
pub struct DataDir {
    dir: TempDir,
}

impl DataDir {
    pub fn create() -> Self {
        Self {
            dir: TempDir::new().expect("create temp data dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents.as_bytes()).expect("write file");
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.join(rel)).expect("read file")
    }

    pub fn read_json(&self, rel: &str) -> Value {
        serde_json::from_str(&self.read(rel)).expect("parse JSON")
    }

    /// Config that removes pacing so runs finish quickly.
    #[allow(dead_code)]
    pub fn write_fast_config(&self) {
        self.write(
            "enrich.json",
            r#"{"schema_version": 1, "call_delay_ms": 0, "retry_delay_ms": 0, "lookup_delay_ms": 0}"#,
        );
    }

    /// Run `vocab <args> --data-dir <dir>`.
    pub fn vocab(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_vocab"))
            .args(args)
            .arg("--data-dir")
            .arg(self.path())
            .env_remove("RUST_LOG")
            .env_remove("VOCAB_API_KEY")
            .env_remove("ANTHROPIC_API_KEY")
            .env_remove("VOCAB_LM_COMMAND")
            .output()
            .expect("run vocab")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "vocab failed ({:?})\nstdout:\n{}\nstderr:\n{}",
        output.status.code(),
        stdout(output),
        stderr(output)
    );
}

/// Path to the mock LM script shipped with the tests.
#[allow(dead_code)]
pub fn mock_lm() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("mock-lm.sh")
}
