//! Content constraints for generated and existing field text.
//!
//! Every check here is a pure function of its inputs. Passes compose them
//! into ordered lists; a field fails its pass when any listed constraint
//! fails.
use regex::RegexBuilder;

/// Trimmed character count a field needs before it counts as present.
pub const MIN_CONTENT_LEN: usize = 10;

/// How a placeholder phrase is matched against field text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderRule {
    /// The phrase appears anywhere in the text.
    Contains(&'static str),
    /// The trimmed text starts with the phrase.
    Prefix(&'static str),
}

impl PlaceholderRule {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            PlaceholderRule::Contains(phrase) => text.contains(phrase),
            PlaceholderRule::Prefix(phrase) => text.trim_start().starts_with(phrase),
        }
    }
}

/// Fixed catalog of phrasings left behind by the offline fill templates.
#[derive(Debug)]
pub struct PlaceholderCatalog {
    pub rules: &'static [PlaceholderRule],
}

impl PlaceholderCatalog {
    pub fn matches(&self, text: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(text))
    }
}

pub const EXAMPLE_PLACEHOLDERS: PlaceholderCatalog = PlaceholderCatalog {
    rules: &[
        PlaceholderRule::Contains("The student demonstrated"),
        PlaceholderRule::Contains("It is important to understand"),
        PlaceholderRule::Contains("Many scholars consider"),
        PlaceholderRule::Contains("The concept of"),
        PlaceholderRule::Contains("She showed great"),
    ],
};

pub const DEFINITION_PLACEHOLDERS: PlaceholderCatalog = PlaceholderCatalog {
    rules: &[PlaceholderRule::Prefix("(Definition needed")],
};

/// A single field-level correctness constraint.
#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    /// Non-empty and at least the minimum trimmed length.
    Present,
    /// Not one of the known placeholder phrasings.
    NotPlaceholder(&'static PlaceholderCatalog),
    /// Not the text a word-derived template would produce for the word.
    NotTemplated(fn(&str) -> String),
    /// The target word occurs exactly once as a whole word.
    ExactlyOnce,
}

/// Evaluates constraints with a configured minimum length.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    min_len: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(MIN_CONTENT_LEN)
    }
}

impl Validator {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn check(&self, constraint: Constraint, word: &str, text: &str) -> bool {
        match constraint {
            Constraint::Present => is_present(text, self.min_len),
            Constraint::NotPlaceholder(catalog) => !catalog.matches(text),
            Constraint::NotTemplated(template) => text.trim() != template(word),
            Constraint::ExactlyOnce => count_occurrences(word, text) == 1,
        }
    }

    /// True when every constraint holds, evaluated in order.
    pub fn check_all(&self, constraints: &[Constraint], word: &str, text: &str) -> bool {
        constraints
            .iter()
            .all(|&constraint| self.check(constraint, word, text))
    }
}

pub fn is_present(text: &str, min_len: usize) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().count() >= min_len
}

/// Count case-insensitive whole-word occurrences of `word` in `text`.
pub fn count_occurrences(word: &str, text: &str) -> usize {
    let word = word.trim();
    if word.is_empty() || text.is_empty() {
        return 0;
    }
    let pattern = format!(r"\b{}\b", regex::escape(word));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.find_iter(text).count(),
        Err(err) => {
            tracing::warn!(word, error = %err, "occurrence pattern rejected");
            0
        }
    }
}
