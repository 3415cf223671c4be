//! Dictionary lookup used while ingesting raw words.
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_DICTIONARY_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

/// First sense the dictionary reports for a word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub definition: String,
    pub part_of_speech: String,
    pub example: String,
}

/// Source of dictionary entries. `None` covers both "no such word" and
/// "service unavailable"; ingestion treats them the same.
pub trait DictionaryLookup {
    fn lookup(&mut self, word: &str) -> Option<DictionaryEntry>;
}

pub struct DictionaryClient {
    agent: ureq::Agent,
    base_url: String,
}

impl DictionaryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn fetch(&self, word: &str) -> Result<Option<DictionaryEntry>> {
        let url = format!("{}/{}", self.base_url, encode_path_segment(word));
        let mut response = self
            .agent
            .get(url.as_str())
            .call()
            .with_context(|| format!("GET {url}"))?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(anyhow!("dictionary error {}", status.as_u16()));
        }
        let body = response
            .body_mut()
            .read_to_string()
            .context("read dictionary response body")?;
        parse_entries(&body)
    }
}

impl DictionaryLookup for DictionaryClient {
    fn lookup(&mut self, word: &str) -> Option<DictionaryEntry> {
        match self.fetch(word) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(word, error = %err, "dictionary lookup failed");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiEntry {
    #[serde(default)]
    meanings: Vec<ApiMeaning>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMeaning {
    #[serde(default)]
    part_of_speech: String,
    #[serde(default)]
    definitions: Vec<ApiDefinition>,
}

#[derive(Debug, Deserialize)]
struct ApiDefinition {
    #[serde(default)]
    definition: String,
    #[serde(default)]
    example: Option<String>,
}

/// Take the first meaning's first definition from a lookup response.
fn parse_entries(body: &str) -> Result<Option<DictionaryEntry>> {
    let entries: Vec<ApiEntry> =
        serde_json::from_str(body).context("parse dictionary response JSON")?;
    let Some(meaning) = entries
        .into_iter()
        .next()
        .and_then(|entry| entry.meanings.into_iter().next())
    else {
        return Ok(None);
    };
    let Some(first) = meaning.definitions.into_iter().next() else {
        return Ok(None);
    };
    Ok(Some(DictionaryEntry {
        definition: first.definition.trim().to_string(),
        part_of_speech: meaning.part_of_speech.trim().to_string(),
        example: first.example.unwrap_or_default().trim().to_string(),
    }))
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
