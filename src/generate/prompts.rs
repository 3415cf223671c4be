//! Prompt templates per pass, loaded at compile time.
use super::GenerationRequest;
use crate::passes::PassKind;

const DEFINITION: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/definition.md"));
const EXAMPLE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/example.md"));
const PASSAGE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/passage.md"));
const PASSAGE_REPAIR: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/passage_repair.md"
));

/// Token ceiling requested from the service for each pass.
pub fn max_tokens_for(pass: PassKind) -> u32 {
    match pass {
        PassKind::Definitions => 120,
        PassKind::Examples => 100,
        PassKind::Passages => 300,
        PassKind::PassageRepair => 250,
    }
}

pub fn build_prompt(request: &GenerationRequest) -> String {
    let template = match request.pass {
        PassKind::Definitions => DEFINITION,
        PassKind::Examples => EXAMPLE,
        PassKind::Passages => PASSAGE,
        PassKind::PassageRepair => PASSAGE_REPAIR,
    };
    let definition = request.current_definition.trim();
    let definition = if definition.is_empty() {
        "MISSING"
    } else {
        definition
    };
    let part_of_speech = request.part_of_speech.trim();
    let part_of_speech = if part_of_speech.is_empty() {
        "unknown part of speech"
    } else {
        part_of_speech
    };
    template
        .replace("{word}", &request.word)
        .replace("{definition}", definition)
        .replace("{part_of_speech}", part_of_speech)
        .trim_end()
        .to_string()
}
