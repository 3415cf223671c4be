//! Generation client contract and backends.
//!
//! The pipeline sees a generator as a black box: a request goes in, text or
//! an error comes out. Timeouts and transport retries belong to the backend;
//! the pipeline only counts attempts.
mod command;
mod http;
mod prompts;

pub use command::CommandGenerator;
pub use http::{MessagesClient, MessagesClientConfig};
pub use prompts::{build_prompt, max_tokens_for};

use crate::passes::PassKind;
use crate::record::WordRecord;
use anyhow::Result;

/// Inputs a generator receives for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub word: String,
    pub current_definition: String,
    pub part_of_speech: String,
    pub pass: PassKind,
}

impl GenerationRequest {
    pub fn for_record(record: &WordRecord, pass: PassKind) -> Self {
        Self {
            word: record.word().to_string(),
            current_definition: record.definition.clone(),
            part_of_speech: record.part_of_speech.clone(),
            pass,
        }
    }
}

/// External text generation capability.
pub trait Generator {
    /// Return generated text, or an error for any service failure.
    fn generate(&mut self, request: &GenerationRequest) -> Result<String>;
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(&mut self, request: &GenerationRequest) -> Result<String> {
        (**self).generate(request)
    }
}
