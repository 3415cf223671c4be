//! Messages-API backend over blocking HTTP.
//!
//! One request per attempt; any non-2xx status, transport error, or timeout
//! surfaces as an error so the pipeline can count it against the budget.
use super::{build_prompt, max_tokens_for, GenerationRequest, Generator};
use crate::util::truncate_string;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const ERROR_PREVIEW_BYTES: usize = 200;

/// Connection settings for the messages endpoint.
#[derive(Debug, Clone)]
pub struct MessagesClientConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

pub struct MessagesClient {
    agent: ureq::Agent,
    config: MessagesClientConfig,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesClient {
    pub fn new(config: MessagesClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(anyhow!("API key is empty"));
        }
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build();
        Ok(Self {
            agent: ureq::Agent::new_with_config(agent_config),
            config,
        })
    }
}

impl Generator for MessagesClient {
    fn generate(&mut self, request: &GenerationRequest) -> Result<String> {
        let prompt = build_prompt(request);
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: max_tokens_for(request.pass),
            messages: [Message {
                role: "user",
                content: &prompt,
            }],
        };
        let start = Instant::now();
        let mut response = self
            .agent
            .post(self.config.api_url.as_str())
            .header("x-api-key", self.config.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .send_json(&body)
            .with_context(|| format!("POST {}", self.config.api_url))?;
        let status = response.status();
        let text = response
            .body_mut()
            .read_to_string()
            .context("read messages response body")?;
        tracing::debug!(
            word = %request.word,
            pass = %request.pass,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            prompt_bytes = prompt.len(),
            "messages call complete"
        );
        if !status.is_success() {
            return Err(anyhow!(
                "API error {}: {}",
                status.as_u16(),
                truncate_string(text.trim(), ERROR_PREVIEW_BYTES)
            ));
        }
        extract_text(&text)
    }
}

/// Pull the first text block out of a messages response body.
fn extract_text(body: &str) -> Result<String> {
    let parsed: MessagesResponse =
        serde_json::from_str(body).context("parse messages response JSON")?;
    parsed
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| anyhow!("messages response has no text block"))
}
