//! Enrichment configuration.
//!
//! `enrich.json` in the data directory is optional; every field has a default
//! so a partial file only overrides what it names. CLI flags override the
//! file, and secrets only ever come from the environment or `api_key.txt`.
use crate::dictionary::DEFAULT_DICTIONARY_URL;
use crate::paths::{DataPaths, DEFAULT_DATASET_REL, DEFAULT_PROGRESS_REL};
use crate::pipeline::{
    PipelineOptions, DEFAULT_CALL_DELAY, DEFAULT_CHECKPOINT_EVERY, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_RETRY_DELAY,
};
use crate::validate::{Validator, MIN_CONTENT_LEN};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};
use std::time::Duration;

/// Current schema version for `enrich.json`.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

pub const API_KEY_ENV: &str = "VOCAB_API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const LM_COMMAND_ENV: &str = "VOCAB_LM_COMMAND";

/// Which generation backend a run talks to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Http,
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichConfig {
    pub schema_version: u32,
    /// Dataset path relative to the data directory.
    pub dataset: String,
    /// Ledger directory relative to the data directory.
    pub progress_dir: String,
    pub backend: Backend,
    pub api_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lm_command: Option<String>,
    pub dictionary_url: String,
    pub max_attempts: usize,
    pub checkpoint_every: usize,
    pub min_content_len: usize,
    pub call_delay_ms: u64,
    pub retry_delay_ms: u64,
    pub lookup_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub lookup_timeout_secs: u64,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            dataset: DEFAULT_DATASET_REL.to_string(),
            progress_dir: DEFAULT_PROGRESS_REL.to_string(),
            backend: Backend::Http,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            lm_command: None,
            dictionary_url: DEFAULT_DICTIONARY_URL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            min_content_len: MIN_CONTENT_LEN,
            call_delay_ms: DEFAULT_CALL_DELAY.as_millis() as u64,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            lookup_delay_ms: 300,
            request_timeout_secs: 30,
            lookup_timeout_secs: 5,
        }
    }
}

impl EnrichConfig {
    pub fn pipeline_options(&self, limit: Option<usize>) -> PipelineOptions {
        PipelineOptions {
            max_attempts: self.max_attempts,
            checkpoint_every: self.checkpoint_every,
            call_delay: Duration::from_millis(self.call_delay_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            limit,
            validator: Validator::new(self.min_content_len),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    pub fn lookup_delay(&self) -> Duration {
        Duration::from_millis(self.lookup_delay_ms)
    }
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<EnrichConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: EnrichConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config {}", path.display()))?;
    validate_config(&config).with_context(|| format!("validate config {}", path.display()))?;
    Ok(config)
}

/// Resolve the config for a data directory: an explicit path must exist,
/// the default `enrich.json` may be absent.
pub fn load_config_for(paths: &DataPaths, explicit: Option<&Path>) -> Result<EnrichConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let path = paths.config_path();
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(EnrichConfig::default());
    }
    load_config(&path)
}

pub fn validate_config(config: &EnrichConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    validate_relative_path(&config.dataset, "dataset")?;
    validate_relative_path(&config.progress_dir, "progress_dir")?;
    for (label, value) in [
        ("max_attempts", config.max_attempts),
        ("checkpoint_every", config.checkpoint_every),
        ("min_content_len", config.min_content_len),
    ] {
        if value == 0 {
            return Err(anyhow!("{label} must be at least 1"));
        }
    }
    if config.request_timeout_secs == 0 || config.lookup_timeout_secs == 0 {
        return Err(anyhow!("timeouts must be at least 1 second"));
    }
    for (label, value) in [
        ("api_url", &config.api_url),
        ("model", &config.model),
        ("dictionary_url", &config.dictionary_url),
    ] {
        if value.trim().is_empty() {
            return Err(anyhow!("{label} must be non-empty"));
        }
    }
    if let Some(command) = config.lm_command.as_deref() {
        if command.trim().is_empty() {
            return Err(anyhow!("lm_command must be non-empty when set"));
        }
    }
    Ok(())
}

fn validate_relative_path(rel: &str, label: &str) -> Result<()> {
    let path = Path::new(rel);
    if rel.trim().is_empty()
        || path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir))
    {
        return Err(anyhow!(
            "{label} must be a relative path without '..' (got {rel:?})"
        ));
    }
    Ok(())
}

/// Pick the LM command: flag, then config, then environment.
pub fn resolve_lm_command(cli: Option<&str>, config: &EnrichConfig) -> Result<String> {
    resolve_lm_command_with(cli, config, |key| std::env::var(key).ok())
}

fn resolve_lm_command_with(
    cli: Option<&str>,
    config: &EnrichConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    cli.map(str::to_string)
        .or_else(|| config.lm_command.clone())
        .or_else(|| env(LM_COMMAND_ENV))
        .map(|command| command.trim().to_string())
        .filter(|command| !command.is_empty())
        .ok_or_else(|| {
            anyhow!("command backend needs --lm, config lm_command, or {LM_COMMAND_ENV}")
        })
}

/// Find the API key in the environment or `api_key.txt`.
pub fn resolve_api_key(paths: &DataPaths) -> Result<String> {
    resolve_api_key_with(paths, |key| std::env::var(key).ok())
}

fn resolve_api_key_with(
    paths: &DataPaths,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    for key in [API_KEY_ENV, FALLBACK_API_KEY_ENV] {
        if let Some(value) = env(key).filter(|value| !value.trim().is_empty()) {
            return Ok(value.trim().to_string());
        }
    }
    let path = paths.api_key_path();
    if path.is_file() {
        let text =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let key = text.trim();
        if !key.is_empty() {
            return Ok(key.to_string());
        }
    }
    Err(anyhow!(
        "no API key: set {API_KEY_ENV} or {FALLBACK_API_KEY_ENV}, or write {}",
        path.display()
    ))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
