//! EMQ extraction.
//!
//! Two independent item shapes are supported:
//!
//! 1. an item defining a fresh shared option set via `Options ID:` (topic
//!    header, lettered options, instruction prose folded into the shared
//!    context), with later items reusing it through
//!    `With reference to the previous Options ID: <id>`;
//! 2. an item carrying multiple `Sub-Question <n>:` / `Answer:` pairs, split
//!    into sibling questions that inherit the item's option set and context.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use qti_model::{EmqOption, EmqQuestion};

use super::{
    SharedOptionState, is_metadata_start, is_option_line, item_header, item_lines, match_option,
    metadata::extract_metadata,
};

static REFERENCE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ID:\s*(\d+)").expect("valid regex"));
static SUB_QUESTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Sub-Question\s+(\d+):\s*(.+)").expect("valid regex"));
static HAS_SUB_QUESTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Sub-Question\s+\d+:").expect("valid regex"));

/// Instruction prose follows the option list and is folded into the shared
/// context rather than the question stem.
fn is_instruction_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    ["select", "choose", "match the", "may be used", "above", "following", "list of options"]
        .iter()
        .any(|phrase| lower.contains(phrase))
}

/// True when the item uses the `Sub-Question <n>:` shape.
pub fn has_sub_questions(text: &str) -> bool {
    HAS_SUB_QUESTIONS.is_match(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Question stem accumulation.
    Question,
    /// Right after `Options ID:`, expecting the topic header line.
    OptionsHeader,
    /// Lettered option lines.
    Options,
    /// Instruction prose between the options and the actual stem.
    Instructions,
    /// After `Answer:`, nothing more is accumulated.
    Answered,
}

/// Extract one EMQ question from an item block (shape 1).
///
/// `shared` is the accumulator threaded through the document fold: options
/// and context are inherited only when the referenced id matches the most
/// recently defined set; a mismatched reference leaves them orphaned.
pub fn extract_emq(text: &str, shared: &SharedOptionState) -> Option<EmqQuestion> {
    let lines = item_lines(text);
    let (item_id, _type_label) = item_header(&lines)?;

    let mut state = State::Question;
    let mut question_text = String::new();
    let mut topic_header = String::new();
    let mut instruction_text = String::new();
    let mut options: Vec<EmqOption> = Vec::new();
    let mut options_id = String::new();
    let mut reference_id = String::new();
    let mut answer = String::new();

    for line in &lines[1..] {
        if let Some(rest) = line.strip_prefix("Options ID:") {
            options_id = rest.trim().to_string();
            options.clear();
            state = State::OptionsHeader;
            continue;
        }
        if line.contains("With reference to the previous Options") {
            if let Some(caps) = REFERENCE_ID.captures(line) {
                reference_id = caps[1].to_string();
                if shared.options_id == reference_id {
                    options = shared.options.clone();
                    options_id = shared.options_id.clone();
                } else {
                    debug!(
                        item_id,
                        reference_id, "reference does not match the current shared option set"
                    );
                }
            }
            state = State::Question;
            continue;
        }
        if let Some(rest) = line.strip_prefix("Answer:") {
            answer = rest.trim().to_string();
            state = State::Answered;
            continue;
        }
        if is_metadata_start(line) {
            break;
        }

        match state {
            State::OptionsHeader => {
                if let Some(option) = match_option(line) {
                    state = State::Options;
                    options.push(option);
                } else if topic_header.is_empty() {
                    topic_header = (*line).to_string();
                }
            }
            State::Options => {
                if let Some(option) = match_option(line) {
                    options.push(option);
                } else {
                    state = State::Instructions;
                    instruction_text = (*line).to_string();
                }
            }
            State::Instructions => {
                if is_instruction_line(line) {
                    instruction_text.push(' ');
                    instruction_text.push_str(line);
                } else {
                    question_text = (*line).to_string();
                    state = State::Question;
                }
            }
            State::Question => {
                if !is_option_line(line) {
                    if !question_text.is_empty() {
                        question_text.push(' ');
                    }
                    question_text.push_str(line);
                }
            }
            State::Answered => {}
        }
    }

    // Reconstruct the stimulus text for later emission as a standalone
    // document: topic header, lettered options, then the instructions.
    let shared_context = if !topic_header.is_empty() {
        let mut context = topic_header;
        for option in &options {
            context.push('\n');
            context.push_str(&format!("{}. {}", option.letter, option.text));
        }
        if !instruction_text.is_empty() {
            context.push_str("\n\n");
            context.push_str(instruction_text.trim());
        }
        context
    } else if !reference_id.is_empty() {
        shared.shared_context.clone()
    } else {
        String::new()
    };

    // A reference item with no stem is usually an image-only question, not an
    // invalid record; give it a placeholder so validation keeps it.
    if question_text.trim().is_empty() && !reference_id.is_empty() {
        question_text = format!("[Image or diagram - Item {item_id}]");
    }

    let metadata = extract_metadata(text);
    Some(EmqQuestion {
        title: format!("Question {item_id}"),
        item_id,
        text: question_text.trim().to_string(),
        html_content: None,
        options_id,
        options,
        reference_id,
        correct_answer: answer,
        shared_context: none_if_empty(shared_context),
        parent_item_id: None,
        metadata,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupState {
    Context,
    Options,
    SubQuestions,
}

/// Extract an item carrying `Sub-Question <n>:` / `Answer:` pairs (shape 2)
/// into sibling questions, one per pair, each with `item_id = <parent>_<n>`.
///
/// Falls back to the single-question shape when no pair is found.
pub fn extract_emq_group(text: &str) -> Vec<EmqQuestion> {
    let lines = item_lines(text);
    let Some((parent_id, _type_label)) = item_header(&lines) else {
        return Vec::new();
    };

    let mut state = GroupState::Context;
    let mut shared_context = String::new();
    let mut options: Vec<EmqOption> = Vec::new();
    let mut options_id = String::new();
    let mut completed: Vec<(u32, String, String)> = Vec::new();
    let mut pending: Option<(u32, String)> = None;

    for line in &lines[1..] {
        if let Some(rest) = line.strip_prefix("Options ID:") {
            options_id = rest.trim().to_string();
            state = GroupState::Options;
            continue;
        }
        if let Some(rest) = line.strip_prefix("Answer:") {
            if let Some((number, question)) = pending.take() {
                completed.push((number, question, rest.trim().to_string()));
            }
            continue;
        }
        if is_metadata_start(line) {
            break;
        }

        if let Some(caps) = SUB_QUESTION.captures(line) {
            // An unanswered pending pair is completed without an answer.
            if let Some((number, question)) = pending.take() {
                completed.push((number, question, String::new()));
            }
            let number: u32 = caps[1].parse().unwrap_or(0);
            pending = Some((number, caps[2].trim().to_string()));
            state = GroupState::SubQuestions;
        } else if state == GroupState::Options {
            if let Some(option) = match_option(line) {
                options.push(option);
            }
        } else if state == GroupState::Context {
            if !shared_context.is_empty() {
                shared_context.push('\n');
            }
            shared_context.push_str(line);
        }
    }
    if let Some((number, question)) = pending.take() {
        completed.push((number, question, String::new()));
    }

    if completed.is_empty() {
        return extract_emq(text, &SharedOptionState::default())
            .into_iter()
            .collect();
    }

    let metadata = extract_metadata(text);
    let shared_context = none_if_empty(shared_context.trim().to_string());
    completed
        .into_iter()
        .map(|(number, question, answer)| EmqQuestion {
            item_id: format!("{parent_id}_{number}"),
            title: format!("Question {parent_id} (Sub-Question {number})"),
            text: question,
            html_content: None,
            options_id: options_id.clone(),
            options: options.clone(),
            reference_id: String::new(),
            correct_answer: answer,
            shared_context: shared_context.clone(),
            parent_item_id: Some(parent_id.clone()),
            metadata: metadata.clone(),
        })
        .collect()
}

fn none_if_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}
