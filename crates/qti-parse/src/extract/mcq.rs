//! MCQ extraction: stem lines accumulate until `Answer:`, lettered lines are
//! captured as options in encounter order.

use qti_model::McqQuestion;

use super::{is_metadata_start, item_header, item_lines, match_option, metadata::extract_metadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Stem text and option lines.
    Body,
    /// Everything after `Answer:` until the metadata block.
    Answered,
}

/// Extract one multiple-choice question from an item block.
///
/// Returns `None` when the header line does not match, which drops the item.
pub fn extract_mcq(text: &str) -> Option<McqQuestion> {
    let lines = item_lines(text);
    let (item_id, _type_label) = item_header(&lines)?;

    let mut state = State::Body;
    let mut stem = String::new();
    let mut options = Vec::new();
    let mut answer = String::new();

    for line in &lines[1..] {
        if let Some(rest) = line.strip_prefix("Answer:") {
            answer = rest.trim().to_string();
            state = State::Answered;
            continue;
        }
        if is_metadata_start(line) {
            break;
        }
        if state == State::Body {
            if let Some(option) = match_option(line) {
                options.push(option);
            } else if !line.starts_with("Source:") {
                if !stem.is_empty() {
                    stem.push(' ');
                }
                stem.push_str(line);
            }
        }
    }

    let metadata = extract_metadata(text);
    Some(McqQuestion {
        title: format!("Question {item_id}"),
        item_id,
        text: stem,
        html_content: None,
        options,
        correct_answer: answer,
        metadata,
    })
}
