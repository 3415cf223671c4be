//! Parsing for two-section generator responses.
//!
//! Passage prompts ask for
//!
//! ```text
//! DEFINITION: <one sentence>
//! PASSAGE: <three sentences>
//! ```
//!
//! Models do not always comply, so anything without both markers in that
//! order is kept whole as unstructured text.
use crate::heuristics::is_placeholder_definition;
use crate::validate::is_present;

pub const DEFINITION_MARKER: &str = "DEFINITION:";
pub const PASSAGE_MARKER: &str = "PASSAGE:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    Structured { definition: String, passage: String },
    Unstructured { text: String },
}

impl ParsedResponse {
    /// The passage text regardless of shape.
    pub fn passage(&self) -> &str {
        match self {
            ParsedResponse::Structured { passage, .. } => passage,
            ParsedResponse::Unstructured { text } => text,
        }
    }

    pub fn definition(&self) -> Option<&str> {
        match self {
            ParsedResponse::Structured { definition, .. } => Some(definition),
            ParsedResponse::Unstructured { .. } => None,
        }
    }
}

/// Split a response on the literal section markers.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let text = raw.trim();
    let Some(passage_at) = text.find(PASSAGE_MARKER) else {
        return unstructured(text);
    };
    let head = &text[..passage_at];
    let Some(definition_at) = head.find(DEFINITION_MARKER) else {
        return unstructured(text);
    };
    let definition = head[definition_at + DEFINITION_MARKER.len()..].trim();
    let passage = text[passage_at + PASSAGE_MARKER.len()..].trim();
    ParsedResponse::Structured {
        definition: definition.to_string(),
        passage: passage.to_string(),
    }
}

fn unstructured(text: &str) -> ParsedResponse {
    ParsedResponse::Unstructured {
        text: text.to_string(),
    }
}

/// Decide whether a generated definition replaces the existing one.
///
/// Only a missing, sub-length, or placeholder definition is replaced, and
/// only by non-empty text that differs from it.
pub fn adopt_definition(
    word: &str,
    existing: &str,
    candidate: &str,
    min_len: usize,
) -> Option<String> {
    let existing_usable =
        is_present(existing, min_len) && !is_placeholder_definition(word, existing);
    let candidate = candidate.trim();
    if existing_usable || candidate.is_empty() || candidate == existing.trim() {
        return None;
    }
    Some(candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::MIN_CONTENT_LEN;

    const STRUCTURED: &str =
        "DEFINITION: Clear and easy to understand.\nPASSAGE: The lucid memo settled the debate.";

    #[test]
    fn splits_structured_response() {
        assert_eq!(
            parse_response(STRUCTURED),
            ParsedResponse::Structured {
                definition: "Clear and easy to understand.".to_string(),
                passage: "The lucid memo settled the debate.".to_string(),
            }
        );
    }

    #[test]
    fn missing_markers_fall_back_to_whole_text() {
        let parsed = parse_response("  The lucid memo settled the debate.  ");
        assert_eq!(parsed.passage(), "The lucid memo settled the debate.");
        assert_eq!(parsed.definition(), None);
    }

    #[test]
    fn single_marker_is_unstructured() {
        let parsed = parse_response("PASSAGE: The lucid memo settled the debate.");
        assert!(matches!(parsed, ParsedResponse::Unstructured { .. }));
        let parsed = parse_response("DEFINITION: Clear.\nThe lucid memo settled it.");
        assert!(matches!(parsed, ParsedResponse::Unstructured { .. }));
    }

    #[test]
    fn markers_out_of_order_are_unstructured() {
        let parsed = parse_response("PASSAGE: The lucid memo.\nDEFINITION: Clear.");
        assert!(matches!(parsed, ParsedResponse::Unstructured { .. }));
    }

    #[test]
    fn preamble_before_definition_marker_is_dropped() {
        let parsed = parse_response("Sure! DEFINITION: Clear.\nPASSAGE: A lucid memo.");
        assert_eq!(parsed.definition(), Some("Clear."));
        assert_eq!(parsed.passage(), "A lucid memo.");
    }

    #[test]
    fn empty_passage_section_is_kept_empty() {
        let parsed = parse_response("DEFINITION: Clear and easy to understand.\nPASSAGE:   ");
        assert_eq!(parsed.passage(), "");
    }

    #[test]
    fn existing_long_definition_is_kept() {
        let parsed = parse_response(STRUCTURED);
        let adopted = adopt_definition(
            "lucid",
            "Expressed clearly; easy to understand.",
            parsed.definition().unwrap(),
            MIN_CONTENT_LEN,
        );
        assert_eq!(adopted, None);
    }

    #[test]
    fn missing_short_or_placeholder_definition_is_replaced() {
        for existing in ["", "Clear", "(Definition needed for: lucid)"] {
            assert_eq!(
                adopt_definition(
                    "lucid",
                    existing,
                    "Clear and easy to understand.",
                    MIN_CONTENT_LEN
                ),
                Some("Clear and easy to understand.".to_string()),
                "existing {existing:?}"
            );
        }
        assert_eq!(adopt_definition("lucid", "", "   ", MIN_CONTENT_LEN), None);
    }

    #[test]
    fn suffix_template_definition_is_replaced() {
        assert_eq!(
            adopt_definition(
                "hopeless",
                "Without hope",
                "Having no expectation of success.",
                MIN_CONTENT_LEN
            ),
            Some("Having no expectation of success.".to_string())
        );
    }
}
