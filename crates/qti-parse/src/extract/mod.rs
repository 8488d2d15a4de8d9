//! Per-item extractors.
//!
//! One single-pass line state machine per question family. Every extractor
//! requires the item's first line to match `Item ID: <digits> <type-label>`;
//! a mismatch drops the item, never the document.

pub mod emq;
pub mod mcq;
pub mod metadata;
pub mod saq;

use regex::Regex;
use std::sync::LazyLock;

use qti_model::{EmqOption, EmqQuestion, McqOption};

pub use emq::{extract_emq, extract_emq_group, has_sub_questions};
pub use mcq::extract_mcq;
pub use metadata::extract_metadata;
pub use saq::extract_saq_items;

static ITEM_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Item ID:\s*(\d+)\s+(.+)").expect("valid regex"));
static ITEM_ID_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Item ID:\s*(\d+)").expect("valid regex"));
static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-J])\.\s+(.+)").expect("valid regex"));
/// Lettered option carrying a stray item-id prefix, e.g. `24762. A. text`.
static PREFIXED_OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*([A-J])\.\s+(.+)").expect("valid regex"));

/// Trimmed, non-empty lines of one item block.
pub(crate) fn item_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Parse the mandatory `Item ID: <digits> <type-label>` header line.
pub(crate) fn item_header(lines: &[&str]) -> Option<(String, String)> {
    let first = lines.first()?;
    let caps = ITEM_HEADER.captures(first)?;
    Some((caps[1].to_string(), caps[2].trim().to_string()))
}

/// Best-effort item id for log messages.
pub(crate) fn source_item_id(text: &str) -> String {
    ITEM_ID_ONLY
        .captures(text)
        .map_or_else(|| "unknown".to_string(), |caps| caps[1].to_string())
}

/// Match a lettered option line, tolerating an item-id prefix.
pub(crate) fn match_option(line: &str) -> Option<McqOption> {
    if let Some(caps) = PREFIXED_OPTION_LINE.captures(line) {
        let letter = caps[1].chars().next()?;
        return Some(McqOption::new(letter, caps[2].trim()));
    }
    let caps = OPTION_LINE.captures(line)?;
    let letter = caps[1].chars().next()?;
    Some(McqOption::new(letter, caps[2].trim()))
}

pub(crate) fn is_option_line(line: &str) -> bool {
    OPTION_LINE.is_match(line)
}

/// Lines that open the trailing profile/statistics block end body scanning.
pub(crate) fn is_metadata_start(line: &str) -> bool {
    line.starts_with("Profile:") || line.starts_with("Last Use Statistics:")
}

/// Shared EMQ option set and stimulus context carried across sibling items.
///
/// Threaded as an explicit accumulator through the per-item fold, never held
/// as ambient state: an item defining a fresh `Options ID:` replaces the
/// whole accumulator, and a later item may reuse it only by matching id.
#[derive(Debug, Clone, Default)]
pub struct SharedOptionState {
    pub options: Vec<EmqOption>,
    pub options_id: String,
    pub shared_context: String,
}

impl SharedOptionState {
    /// Fold one extracted EMQ question into the accumulator.
    pub fn absorb(&mut self, question: &EmqQuestion) {
        let fresh_id = !question.options_id.is_empty() && question.options_id != self.options_id;
        if fresh_id || !question.options.is_empty() {
            self.options = question.options.clone();
            self.options_id = question.options_id.clone();
            self.shared_context = question.shared_context.clone().unwrap_or_default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_requires_digits_and_label() {
        assert_eq!(
            item_header(&["Item ID: 12 A type: 4 options"]),
            Some(("12".to_string(), "A type: 4 options".to_string()))
        );
        assert_eq!(item_header(&["Item ID: twelve A type"]), None);
        assert_eq!(item_header(&["Question 12"]), None);
    }

    #[test]
    fn option_matching_strips_item_id_prefix() {
        let opt = match_option("24762. A. Plasmodium falciparum").unwrap();
        assert_eq!(opt.letter, 'A');
        assert_eq!(opt.text, "Plasmodium falciparum");

        let opt = match_option("B. Dengue virus").unwrap();
        assert_eq!(opt.letter, 'B');
        assert_eq!(opt.text, "Dengue virus");

        assert!(match_option("K. beyond the letter range").is_none());
        assert!(match_option("1. not lettered").is_none());
    }

    #[test]
    fn absorb_replaces_on_new_options_id() {
        let mut state = SharedOptionState::default();
        let question = EmqQuestion {
            item_id: "1".to_string(),
            title: "Question 1".to_string(),
            text: "Dengue".to_string(),
            html_content: None,
            options_id: "10".to_string(),
            options: vec![McqOption::new('A', "one")],
            reference_id: String::new(),
            correct_answer: "A".to_string(),
            shared_context: Some("Infections\nA. one".to_string()),
            parent_item_id: None,
            metadata: None,
        };
        state.absorb(&question);
        assert_eq!(state.options_id, "10");
        assert_eq!(state.options.len(), 1);
        assert_eq!(state.shared_context, "Infections\nA. one");
    }
}
