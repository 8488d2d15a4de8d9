//! Document-level parse driver.

use tracing::{debug, warn};

use qti_model::{ParseError, ParseMode, Question, QuestionKind};

use crate::classify::{detect_item_type, detect_parse_mode};
use crate::extract::{
    SharedOptionState, extract_emq, extract_emq_group, extract_mcq, extract_saq_items,
    has_sub_questions, source_item_id,
};
use crate::normalize::clean_text;
use crate::segment::split_items;

/// Parse a whole exam document into typed question records.
///
/// `requested` pins the extractor family; `None` classifies heuristically
/// from the text and filename. `html` is a richer rendering of the same
/// document, substituted into the parsed questions for item-body rendering
/// and never consulted for parsing decisions.
///
/// Items an extractor cannot recover are dropped with a logged reason;
/// the call fails only when the document yields no items or no questions
/// at all.
pub fn parse_document(
    text: &str,
    requested: Option<ParseMode>,
    filename: &str,
    html: Option<&str>,
) -> Result<Vec<Question>, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    let text = clean_text(text);
    let mode = requested.unwrap_or_else(|| detect_parse_mode(&text, filename));
    let items = split_items(&text)?;
    debug!(%mode, items = items.len(), filename, "parsing document");

    // EMQ option sets carry across sibling items, so extraction is a fold
    // over the items with the shared set as the accumulator.
    let mut shared = SharedOptionState::default();
    let mut questions: Vec<Question> = Vec::new();

    for item in &items {
        let kind = match mode {
            ParseMode::Mcq => QuestionKind::Mcq,
            ParseMode::Emq => QuestionKind::Emq,
            ParseMode::Saq => QuestionKind::Saq,
            ParseMode::Mixed => detect_item_type(item),
        };

        let before = questions.len();
        match kind {
            QuestionKind::Mcq => {
                if let Some(question) = extract_mcq(item) {
                    questions.push(Question::Mcq(question));
                }
            }
            QuestionKind::Emq => {
                if has_sub_questions(item) {
                    for question in extract_emq_group(item) {
                        shared.absorb(&question);
                        questions.push(Question::Emq(question));
                    }
                } else if let Some(question) = extract_emq(item, &shared) {
                    shared.absorb(&question);
                    questions.push(Question::Emq(question));
                }
            }
            QuestionKind::Saq => {
                for question in extract_saq_items(item) {
                    questions.push(Question::Saq(question));
                }
            }
        }
        if questions.len() == before {
            warn!(
                item_id = source_item_id(item),
                kind = %kind,
                "dropping unparseable item"
            );
        }
    }

    if questions.is_empty() {
        return Err(ParseError::NoQuestions(mode));
    }
    if let Some(html) = html {
        for question in &mut questions {
            question.set_html_content(html);
        }
    }
    Ok(questions)
}
