use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metadata::QuestionMetadata;

/// The three supported question families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    Mcq,
    Emq,
    Saq,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Mcq => "MCQ",
            QuestionKind::Emq => "EMQ",
            QuestionKind::Saq => "SAQ",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One answer option of a multiple-choice block, `A. <text>` through `J. <text>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqOption {
    pub letter: char,
    pub text: String,
}

impl McqOption {
    pub fn new(letter: char, text: impl Into<String>) -> Self {
        Self {
            letter,
            text: text.into(),
        }
    }
}

/// EMQ answer options share the same lettered shape.
pub type EmqOption = McqOption;

/// A typed question record recovered from one source item.
///
/// Variant-tagged to match the JSON contract of the document-extraction
/// collaborator (`"type": "MCQ" | "EMQ" | "SAQ"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Question {
    #[serde(rename = "MCQ")]
    Mcq(McqQuestion),
    #[serde(rename = "EMQ")]
    Emq(EmqQuestion),
    #[serde(rename = "SAQ")]
    Saq(SaqQuestion),
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::Mcq(_) => QuestionKind::Mcq,
            Question::Emq(_) => QuestionKind::Emq,
            Question::Saq(_) => QuestionKind::Saq,
        }
    }

    /// Item identifier, stable within one document. Sub-questions split from a
    /// single source item carry synthesized ids of the form `<parent>_<suffix>`.
    pub fn item_id(&self) -> &str {
        match self {
            Question::Mcq(q) => &q.item_id,
            Question::Emq(q) => &q.item_id,
            Question::Saq(q) => &q.item_id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Question::Mcq(q) => &q.title,
            Question::Emq(q) => &q.title,
            Question::Saq(q) => &q.title,
        }
    }

    /// The question stem. May legitimately be empty for an EMQ record that
    /// only references a previously emitted option set.
    pub fn text(&self) -> &str {
        match self {
            Question::Mcq(q) => &q.text,
            Question::Emq(q) => &q.text,
            Question::Saq(q) => &q.text,
        }
    }

    pub fn metadata(&self) -> Option<&QuestionMetadata> {
        match self {
            Question::Mcq(q) => q.metadata.as_ref(),
            Question::Emq(q) => q.metadata.as_ref(),
            Question::Saq(q) => q.metadata.as_ref(),
        }
    }

    pub fn html_content(&self) -> Option<&str> {
        match self {
            Question::Mcq(q) => q.html_content.as_deref(),
            Question::Emq(q) => q.html_content.as_deref(),
            Question::Saq(q) => q.html_content.as_deref(),
        }
    }

    /// Substitute a richer HTML rendering of the same source document.
    /// Used only for item-body rendering, never to drive parsing decisions.
    pub fn set_html_content(&mut self, html: impl Into<String>) {
        let html = Some(html.into());
        match self {
            Question::Mcq(q) => q.html_content = html,
            Question::Emq(q) => q.html_content = html,
            Question::Saq(q) => q.html_content = html,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqQuestion {
    pub item_id: String,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    /// Options in encounter order.
    pub options: Vec<McqOption>,
    /// The correct option letter. Validation checks presence, not that the
    /// letter matches a parsed option (documented permissive behavior).
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<QuestionMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmqQuestion {
    pub item_id: String,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    /// Author-assigned identifier grouping the shared option set.
    pub options_id: String,
    /// May be empty when `reference_id` points to a previously emitted set.
    pub options: Vec<EmqOption>,
    /// Back-reference to an earlier item's `options_id`, empty when absent.
    pub reference_id: String,
    pub correct_answer: String,
    /// Reconstructed stimulus text: topic header + lettered options +
    /// instruction prose, emitted as a standalone stimulus document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<QuestionMetadata>,
}

/// One `(a)`-style part of a short-answer item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubQuestion {
    /// Parenthesized part label as authored, e.g. `"(a)"`.
    pub part: String,
    pub question: String,
    pub marks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaqQuestion {
    pub item_id: String,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    pub sub_questions: Vec<SubQuestion>,
    pub answer_key: String,
    pub total_marks: u32,
    /// Stem lines preceding the first sub-question, shared by all siblings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<QuestionMetadata>,
}
