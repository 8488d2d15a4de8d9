//! Structural validation of extracted questions.
//!
//! One rule table, applied per question: a failing question is dropped with
//! a logged reason and recorded in the report, never fatal to the batch.
//! The rules check structural presence only. In particular an MCQ/EMQ
//! `correct_answer` letter is not required to match a parsed option; badly
//! OCRed answer lines still produce an importable item, and the grading
//! template simply never matches.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use qti_model::{Question, QuestionKind};

/// Reason a question failed structural validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
pub enum RuleViolation {
    #[error("question text is empty")]
    EmptyText,
    #[error("no answer options were found")]
    NoOptions,
    #[error("no correct answer was recorded")]
    MissingCorrectAnswer,
    #[error("no answer key was recorded")]
    MissingAnswerKey,
}

/// One dropped question, for the conversion summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedQuestion {
    pub item_id: String,
    pub kind: QuestionKind,
    pub violation: RuleViolation,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub kept: usize,
    pub dropped: Vec<DroppedQuestion>,
}

impl ValidationReport {
    #[must_use]
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Apply the rule table to one question.
///
/// An EMQ record with a `reference_id` is exempt from the non-empty-text
/// rule: a referencing item with no stem was already given a placeholder,
/// and an image-only stem is legitimate.
pub fn check_question(question: &Question) -> Result<(), RuleViolation> {
    match question {
        Question::Mcq(q) => {
            if q.text.trim().is_empty() {
                return Err(RuleViolation::EmptyText);
            }
            if q.options.is_empty() {
                return Err(RuleViolation::NoOptions);
            }
            if q.correct_answer.trim().is_empty() {
                return Err(RuleViolation::MissingCorrectAnswer);
            }
        }
        Question::Emq(q) => {
            if q.text.trim().is_empty() && q.reference_id.is_empty() {
                return Err(RuleViolation::EmptyText);
            }
            if q.options.is_empty() {
                return Err(RuleViolation::NoOptions);
            }
            if q.correct_answer.trim().is_empty() {
                return Err(RuleViolation::MissingCorrectAnswer);
            }
        }
        Question::Saq(q) => {
            if q.text.trim().is_empty() {
                return Err(RuleViolation::EmptyText);
            }
            if q.answer_key.trim().is_empty() {
                return Err(RuleViolation::MissingAnswerKey);
            }
        }
    }
    Ok(())
}

/// Filter a batch down to its structurally valid questions.
pub fn validate_questions(questions: Vec<Question>) -> (Vec<Question>, ValidationReport) {
    let mut kept = Vec::with_capacity(questions.len());
    let mut report = ValidationReport::default();

    for question in questions {
        match check_question(&question) {
            Ok(()) => kept.push(question),
            Err(violation) => {
                warn!(
                    item_id = question.item_id(),
                    kind = %question.kind(),
                    %violation,
                    "dropping invalid question"
                );
                report.dropped.push(DroppedQuestion {
                    item_id: question.item_id().to_string(),
                    kind: question.kind(),
                    violation,
                });
            }
        }
    }
    report.kept = kept.len();
    (kept, report)
}
