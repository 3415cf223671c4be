//! Deterministic text heuristics: TL;DR derivation, difficulty estimation,
//! and the placeholder templates used by the offline fill.
//!
//! Each heuristic is an ordered rule table evaluated first-match-wins so new
//! rules can be added without touching the evaluation code.
use crate::record::{MAX_LEVEL, MIN_LEVEL};
use crate::validate::DEFINITION_PLACEHOLDERS;
use regex::Regex;
use std::sync::OnceLock;

const TLDR_MAX_WORDS: usize = 3;
const TLDR_MIN_WORD_LEN: usize = 3;

const TLDR_STARTERS: &[&str] = &[
    "the act of",
    "the process of",
    "the state of",
    "the quality of",
    "to be",
    "to make",
    "to cause",
    "to give",
    "relating to",
    "characterized by",
    "having the quality of",
    "in a manner that",
    "the ability to",
    "a person who",
    "one who",
    "someone who",
    "something that",
    "a thing that",
    "an act of",
];

const TLDR_SKIP_WORDS: &[&str] = &[
    "a", "an", "the", "to", "of", "in", "on", "at", "for", "with", "by", "from", "as", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "must", "shall", "can", "that",
    "which", "who", "whom", "whose", "this", "these", "those", "it", "its", "or", "and", "but",
    "if", "then", "than", "so", "very", "just", "also", "only", "even", "more", "most",
    "other", "some", "any", "no", "not", "such", "what", "when", "where", "how", "why", "all",
    "each", "every", "both", "few", "many", "much", "own", "same", "something", "someone",
    "anything", "nothing", "one", "two", "first", "into", "about", "over", "after", "before",
    "between", "under", "again", "further", "once", "here", "there", "because", "while",
    "although", "though", "until", "unless", "whether", "since", "during", "within",
    "without", "through", "act", "make", "cause", "give", "take", "get", "put", "become",
    "come", "go", "see", "show", "let", "begin", "seem", "help", "try", "leave", "call",
    "need", "feel", "high", "long", "way", "thing", "things", "manner", "state", "quality",
    "process", "relating", "characterized", "involving", "marked", "having",
];

fn ascii_words() -> &'static Regex {
    static WORDS: OnceLock<Regex> = OnceLock::new();
    WORDS.get_or_init(|| Regex::new(r"[a-zA-Z]+").expect("static word pattern"))
}

/// Derive a one-to-three word summary from a definition.
pub fn derive_tldr(definition: &str) -> String {
    let mut clean = definition.trim().to_lowercase();
    if clean.is_empty() {
        return String::new();
    }
    for starter in TLDR_STARTERS {
        if let Some(rest) = clean.strip_prefix(starter) {
            clean = rest.trim().to_string();
        }
    }

    let words: Vec<&str> = ascii_words()
        .find_iter(&clean)
        .map(|m| m.as_str())
        .collect();
    let mut picked: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| w.len() >= TLDR_MIN_WORD_LEN && !TLDR_SKIP_WORDS.contains(w))
        .take(TLDR_MAX_WORDS)
        .collect();
    if picked.is_empty() {
        picked.extend(words.iter().copied().find(|w| w.len() >= TLDR_MIN_WORD_LEN));
    }
    capitalize_first(&picked.join(" "))
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

const BASIC_WORDS: &[&str] = &[
    "a", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can",
    "ability", "about", "above", "accept", "account", "across", "act", "action", "add",
    "admit", "adult", "affect", "after",
];
const HARD_PREFIXES: &[&str] = &["pseudo", "quasi", "meta", "ante", "circum", "extra"];
const HARD_SUFFIXES: &[&str] = &["aceous", "itious", "escent", "iferous"];

fn is_basic(word: &str) -> bool {
    BASIC_WORDS.contains(&word) || word.chars().count() <= 4
}

fn has_hard_prefix(word: &str) -> bool {
    HARD_PREFIXES.iter().any(|prefix| word.starts_with(prefix))
}

fn has_hard_suffix(word: &str) -> bool {
    HARD_SUFFIXES.iter().any(|suffix| word.ends_with(suffix))
}

/// Difficulty rules, first match wins. Falls through to length bands.
const DIFFICULTY_RULES: &[(fn(&str) -> bool, u8)] = &[
    (is_basic, MIN_LEVEL),
    (has_hard_prefix, MAX_LEVEL),
    (has_hard_suffix, MAX_LEVEL),
];

/// Estimate a 1-5 difficulty level from the shape of the word.
pub fn estimate_difficulty(word: &str) -> u8 {
    let lower = word.trim().to_lowercase();
    if let Some((_, level)) = DIFFICULTY_RULES.iter().find(|(rule, _)| rule(&lower)) {
        return *level;
    }
    match lower.chars().count() {
        0..=6 => 2,
        7..=8 => 3,
        9..=10 => 4,
        _ => MAX_LEVEL,
    }
}

/// Suffix-driven definition template. `{stem}` is the lowercased word minus
/// `strip` trailing characters, `{word}` the word as given.
struct DefinitionTemplate {
    suffixes: &'static [&'static str],
    strip: usize,
    template: &'static str,
}

const DEFINITION_TEMPLATES: &[DefinitionTemplate] = &[
    DefinitionTemplate {
        suffixes: &["ness"],
        strip: 4,
        template: "The state or quality of being {stem}",
    },
    DefinitionTemplate {
        suffixes: &["ment"],
        strip: 4,
        template: "The act or process of {stem}ing",
    },
    DefinitionTemplate {
        suffixes: &["tion", "sion"],
        strip: 0,
        template: "The act or state related to {word}",
    },
    DefinitionTemplate {
        suffixes: &["able", "ible"],
        strip: 4,
        template: "Capable of being {stem}ed",
    },
    DefinitionTemplate {
        suffixes: &["ful"],
        strip: 3,
        template: "Full of {stem}",
    },
    DefinitionTemplate {
        suffixes: &["less"],
        strip: 4,
        template: "Without {stem}",
    },
    DefinitionTemplate {
        suffixes: &["ly"],
        strip: 2,
        template: "In a {stem} manner",
    },
    DefinitionTemplate {
        suffixes: &["ous"],
        strip: 3,
        template: "Having the quality of being {stem}",
    },
    DefinitionTemplate {
        suffixes: &["ive"],
        strip: 0,
        template: "Tending to or having the quality of {word}",
    },
    DefinitionTemplate {
        suffixes: &["er", "or"],
        strip: 0,
        template: "One who performs the action of {word}",
    },
    DefinitionTemplate {
        suffixes: &["ist"],
        strip: 3,
        template: "A person who practices or is concerned with {stem}",
    },
    DefinitionTemplate {
        suffixes: &["ism"],
        strip: 3,
        template: "A belief, practice, or system related to {stem}",
    },
    DefinitionTemplate {
        suffixes: &["ity"],
        strip: 3,
        template: "The quality or state of being {stem}",
    },
    DefinitionTemplate {
        suffixes: &["ize"],
        strip: 3,
        template: "To make or become {stem}",
    },
];

/// Placeholder definition for a word the dictionary had nothing for.
pub fn placeholder_definition(word: &str) -> String {
    let lower = word.to_lowercase();
    let matched = DEFINITION_TEMPLATES
        .iter()
        .find(|rule| rule.suffixes.iter().any(|suffix| lower.ends_with(suffix)));
    let Some(rule) = matched else {
        return format!("(Definition needed for: {word})");
    };
    let keep = lower.chars().count().saturating_sub(rule.strip);
    let stem: String = lower.chars().take(keep).collect();
    rule.template
        .replace("{stem}", &stem)
        .replace("{word}", word)
}

/// True for any definition the offline fill could have written for `word`.
pub fn is_placeholder_definition(word: &str, definition: &str) -> bool {
    let definition = definition.trim();
    DEFINITION_PLACEHOLDERS.matches(definition) || definition == placeholder_definition(word)
}

/// TL;DR written alongside a placeholder definition: the word itself.
pub fn placeholder_tldr(word: &str) -> String {
    capitalize_first(&word.to_lowercase())
}

const EXAMPLE_TEMPLATES: &[&str] = &[
    "The student demonstrated {word} in their approach.",
    "It is important to understand {word} in this context.",
    "Many scholars consider {word} to be significant.",
    "The concept of {word} was central to the discussion.",
    "She showed great {word} during the presentation.",
];

/// Placeholder example sentence, stable for a given word.
pub fn placeholder_example(word: &str) -> String {
    let seed: usize = word.chars().map(|c| c as usize).sum();
    EXAMPLE_TEMPLATES[seed % EXAMPLE_TEMPLATES.len()].replace("{word}", &word.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{DEFINITION_PLACEHOLDERS, EXAMPLE_PLACEHOLDERS};

    #[test]
    fn tldr_strips_starters_and_filler() {
        assert_eq!(derive_tldr("The act of giving up a claim or right."), "Giving claim right");
        assert_eq!(derive_tldr("Full of energy and enthusiasm"), "Full energy enthusiasm");
        assert_eq!(derive_tldr(""), "");
    }

    #[test]
    fn tldr_falls_back_to_first_long_word() {
        assert_eq!(derive_tldr("To be very much so."), "Very");
    }

    #[test]
    fn difficulty_follows_rule_order_then_length() {
        assert_eq!(estimate_difficulty("ability"), 1);
        assert_eq!(estimate_difficulty("zeal"), 1);
        assert_eq!(estimate_difficulty("metamorphosis"), 5);
        assert_eq!(estimate_difficulty("herbaceous"), 5);
        assert_eq!(estimate_difficulty("ardent"), 2);
        assert_eq!(estimate_difficulty("gregarious"), 4);
        assert_eq!(estimate_difficulty("obstinate"), 4);
        assert_eq!(estimate_difficulty("ephemeral"), 4);
        assert_eq!(estimate_difficulty("pernicious"), 4);
        assert_eq!(estimate_difficulty("magnanimity"), 5);
    }

    #[test]
    fn placeholder_definition_uses_suffix_templates() {
        assert_eq!(placeholder_definition("Kindness"), "The state or quality of being kind");
        assert_eq!(placeholder_definition("hopeless"), "Without hope");
        assert_eq!(placeholder_definition("zeal"), "(Definition needed for: zeal)");
        assert!(DEFINITION_PLACEHOLDERS.matches(&placeholder_definition("zeal")));
        assert_eq!(placeholder_tldr("kINDness"), "Kindness");
    }

    #[test]
    fn placeholder_examples_are_stable_and_detectable() {
        let first = placeholder_example("Lucid");
        assert_eq!(first, placeholder_example("Lucid"));
        assert!(first.contains("lucid"));
        assert!(EXAMPLE_PLACEHOLDERS.matches(&first));
    }
}
