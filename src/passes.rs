//! Enrichment passes and their per-field rules.
//!
//! A pass names the field it fills, which constraints make a record pending,
//! which constraints generated text must meet, and how an accepted candidate
//! is written back.
use crate::heuristics::placeholder_definition;
use crate::record::WordRecord;
use crate::response::{adopt_definition, parse_response};
use crate::validate::{
    count_occurrences, Constraint, Validator, DEFINITION_PLACEHOLDERS, EXAMPLE_PLACEHOLDERS,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PassKind {
    Definitions,
    Examples,
    Passages,
    PassageRepair,
}

/// Dataset field a pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Definition,
    Example,
    Passage,
}

impl Field {
    pub fn get(self, record: &WordRecord) -> &str {
        match self {
            Field::Definition => &record.definition,
            Field::Example => &record.example,
            Field::Passage => &record.passage,
        }
    }
}

/// Result of checking one record against a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Needs work.
    Pending,
    /// Already satisfies the pass (or is out of its scope).
    Satisfied,
    /// Needs work but lacks an input the generator requires.
    Blocked(&'static str),
}

/// Generated content extracted from one raw response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Text for the pass's target field.
    pub content: String,
    /// Definition offered alongside a passage, if the response was structured.
    pub definition: Option<String>,
}

impl Candidate {
    pub fn has_text(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

const PRESENT_DEFINITION: &[Constraint] = &[
    Constraint::Present,
    Constraint::NotPlaceholder(&DEFINITION_PLACEHOLDERS),
    Constraint::NotTemplated(placeholder_definition),
];
const PRESENT_EXAMPLE: &[Constraint] = &[
    Constraint::Present,
    Constraint::NotPlaceholder(&EXAMPLE_PLACEHOLDERS),
];
const PRESENT: &[Constraint] = &[Constraint::Present];
const EXACTLY_ONCE: &[Constraint] = &[Constraint::ExactlyOnce];

impl PassKind {
    pub const ALL: [PassKind; 4] = [
        PassKind::Definitions,
        PassKind::Examples,
        PassKind::Passages,
        PassKind::PassageRepair,
    ];

    /// Stable identifier used for ledger files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            PassKind::Definitions => "definitions",
            PassKind::Examples => "examples",
            PassKind::Passages => "passages",
            PassKind::PassageRepair => "passage-repair",
        }
    }

    pub fn field(self) -> Field {
        match self {
            PassKind::Definitions => Field::Definition,
            PassKind::Examples => Field::Example,
            PassKind::Passages | PassKind::PassageRepair => Field::Passage,
        }
    }

    /// Constraints a record's field must already fail to be in scope at all.
    fn scope(self) -> &'static [Constraint] {
        match self {
            PassKind::PassageRepair => PRESENT,
            _ => &[],
        }
    }

    /// Constraints the existing field must meet to be left alone.
    fn existing_rules(self) -> &'static [Constraint] {
        match self {
            PassKind::Definitions => PRESENT_DEFINITION,
            PassKind::Examples => PRESENT_EXAMPLE,
            PassKind::Passages => PRESENT,
            PassKind::PassageRepair => EXACTLY_ONCE,
        }
    }

    /// Constraints generated content must meet to commit cleanly.
    fn acceptance_rules(self) -> &'static [Constraint] {
        match self {
            PassKind::Definitions => PRESENT_DEFINITION,
            PassKind::Examples | PassKind::Passages | PassKind::PassageRepair => EXACTLY_ONCE,
        }
    }

    /// Whether this pass's acceptance counts occurrences of the word.
    pub fn counts_occurrences(self) -> bool {
        !matches!(self, PassKind::Definitions)
    }

    pub fn select(self, record: &WordRecord, validator: &Validator) -> Selection {
        let word = record.word();
        let current = self.field().get(record);
        if !validator.check_all(self.scope(), word, current) {
            return Selection::Satisfied;
        }
        if validator.check_all(self.existing_rules(), word, current) {
            return Selection::Satisfied;
        }
        if self == PassKind::Examples && record.definition.trim().is_empty() {
            return Selection::Blocked("no definition");
        }
        Selection::Pending
    }

    /// Extract the candidate for this pass from a raw generator response.
    pub fn candidate(self, raw: &str) -> Candidate {
        match self {
            PassKind::Passages => {
                let parsed = parse_response(raw);
                Candidate {
                    content: parsed.passage().to_string(),
                    definition: parsed.definition().map(str::to_string),
                }
            }
            _ => Candidate {
                content: raw.trim().to_string(),
                definition: None,
            },
        }
    }

    pub fn accepts(self, word: &str, candidate: &Candidate, validator: &Validator) -> bool {
        validator.check_all(self.acceptance_rules(), word, &candidate.content)
    }

    /// Write an accepted (or degraded) candidate into the record. Returns
    /// true when the definition changed as a side effect.
    pub fn commit(
        self,
        record: &mut WordRecord,
        candidate: &Candidate,
        validator: &Validator,
    ) -> bool {
        match self {
            PassKind::Definitions => {
                record.set_definition(candidate.content.clone());
                true
            }
            PassKind::Examples => {
                record.example = candidate.content.clone();
                false
            }
            PassKind::PassageRepair => {
                record.passage = candidate.content.clone();
                false
            }
            PassKind::Passages => {
                record.passage = candidate.content.clone();
                let adopted = candidate.definition.as_deref().and_then(|definition| {
                    adopt_definition(
                        record.word(),
                        &record.definition,
                        definition,
                        validator.min_len(),
                    )
                });
                match adopted {
                    Some(definition) => {
                        record.set_definition(definition);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Occurrence count reported for a degraded commit.
    pub fn occurrences(self, word: &str, candidate: &Candidate) -> Option<usize> {
        self.counts_occurrences()
            .then(|| count_occurrences(word, &candidate.content))
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::placeholder_example;

    fn record(word: &str, definition: &str, example: &str, passage: &str) -> WordRecord {
        let mut record = WordRecord::new(word, 3);
        record.definition = definition.to_string();
        record.example = example.to_string();
        record.passage = passage.to_string();
        record
    }

    #[test]
    fn examples_select_missing_short_and_placeholder_examples() {
        let validator = Validator::default();
        let definition = "Expressed clearly; easy to understand.";
        let cases = vec![
            (String::new(), Selection::Pending),
            ("Too short".to_string(), Selection::Pending),
            (placeholder_example("lucid"), Selection::Pending),
            (
                "Her lucid prose won over the committee.".to_string(),
                Selection::Satisfied,
            ),
        ];
        for (example, expected) in cases {
            let rec = record("lucid", definition, &example, "");
            assert_eq!(PassKind::Examples.select(&rec, &validator), expected, "{example:?}");
        }
    }

    #[test]
    fn examples_without_definition_are_blocked() {
        let rec = record("lucid", "  ", "", "");
        assert_eq!(
            PassKind::Examples.select(&rec, &Validator::default()),
            Selection::Blocked("no definition")
        );
    }

    #[test]
    fn passage_repair_only_targets_present_passages_with_wrong_count() {
        let validator = Validator::default();
        let missing = record("lucid", "", "", "");
        let twice = record("lucid", "", "", "The lucid memo was lucid and brief.");
        let once = record("lucid", "", "", "The lucid memo settled the debate.");
        assert_eq!(PassKind::PassageRepair.select(&missing, &validator), Selection::Satisfied);
        assert_eq!(PassKind::PassageRepair.select(&twice, &validator), Selection::Pending);
        assert_eq!(PassKind::PassageRepair.select(&once, &validator), Selection::Satisfied);
        assert_eq!(PassKind::Passages.select(&missing, &validator), Selection::Pending);
    }

    #[test]
    fn definitions_select_placeholders() {
        let validator = Validator::default();
        let rec = record("zeal", "(Definition needed for: zeal)", "", "");
        assert_eq!(PassKind::Definitions.select(&rec, &validator), Selection::Pending);
        let rec = record("zeal", "Great energy or enthusiasm for a cause.", "", "");
        assert_eq!(PassKind::Definitions.select(&rec, &validator), Selection::Satisfied);
        let rec = record("kindness", "The state or quality of being kind", "", "");
        assert_eq!(PassKind::Definitions.select(&rec, &validator), Selection::Pending);
        let rec = record("goodness", "The state or quality of being kind", "", "");
        assert_eq!(PassKind::Definitions.select(&rec, &validator), Selection::Satisfied);
    }

    #[test]
    fn passages_commit_replaces_templated_definition() {
        let validator = Validator::default();
        let candidate = PassKind::Passages.candidate(
            "DEFINITION: Having no expectation of success.\nPASSAGE: The hopeless plan collapsed.",
        );
        let mut rec = record("hopeless", "Without hope", "", "");
        assert!(PassKind::Passages.commit(&mut rec, &candidate, &validator));
        assert_eq!(rec.definition, "Having no expectation of success.");
    }

    #[test]
    fn passages_commit_keeps_good_definition() {
        let validator = Validator::default();
        let candidate = PassKind::Passages.candidate(
            "DEFINITION: Clear and easy to understand.\nPASSAGE: The lucid memo settled it.",
        );
        let mut rec = record("lucid", "Expressed clearly; easy to understand.", "", "");
        assert!(!PassKind::Passages.commit(&mut rec, &candidate, &validator));
        assert_eq!(rec.definition, "Expressed clearly; easy to understand.");
        assert_eq!(rec.passage, "The lucid memo settled it.");

        let mut rec = record("lucid", "", "", "");
        assert!(PassKind::Passages.commit(&mut rec, &candidate, &validator));
        assert_eq!(rec.definition, "Clear and easy to understand.");
        assert_eq!(rec.tldr, "Clear easy understand");
    }

    #[test]
    fn unstructured_passage_leaves_definition_alone() {
        let validator = Validator::default();
        let candidate = PassKind::Passages.candidate("The lucid memo settled it.");
        let mut rec = record("lucid", "", "", "");
        assert!(!PassKind::Passages.commit(&mut rec, &candidate, &validator));
        assert_eq!(rec.definition, "");
        assert_eq!(rec.passage, "The lucid memo settled it.");
    }

    #[test]
    fn acceptance_checks_generated_content() {
        let validator = Validator::default();
        let twice = PassKind::Examples.candidate("The lucid answer was lucid.");
        let once = PassKind::Examples.candidate("  The lucid answer helped.  ");
        assert!(!PassKind::Examples.accepts("lucid", &twice, &validator));
        assert!(PassKind::Examples.accepts("lucid", &once, &validator));
        assert_eq!(once.content, "The lucid answer helped.");
        assert_eq!(PassKind::Examples.occurrences("lucid", &twice), Some(2));
        assert_eq!(PassKind::Definitions.occurrences("lucid", &twice), None);
    }

    #[test]
    fn pass_names_are_stable() {
        let names: Vec<_> = PassKind::ALL.iter().map(|pass| pass.as_str()).collect();
        assert_eq!(names, ["definitions", "examples", "passages", "passage-repair"]);
    }
}
