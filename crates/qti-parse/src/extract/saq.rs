//! SAQ extraction.
//!
//! `(a)`-style part lines split a source item into one question per part.
//! Each split sibling carries only its own stem plus the item's shared
//! context (the stem lines preceding the first part). `Answer:` lines are
//! associated to the part whose letter they repeat, and later lines continue
//! the running answer until the next part begins.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use qti_model::{SaqQuestion, SubQuestion};

use super::{is_metadata_start, item_header, item_lines, metadata::extract_metadata};

static SUB_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([a-z])\)\s+(.+)").expect("valid regex"));
static MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\((\d+)\s+marks?\)").expect("valid regex"));
static ANSWER_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([a-z])\)\s*(.*)").expect("valid regex"));

/// Sum every `(<n> marks)` annotation in a fragment.
fn marks_in(text: &str) -> u32 {
    MARKS
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .sum()
}

/// Strip the trailing marks annotation from a part's question text.
fn without_marks(text: &str) -> String {
    MARKS.replace_all(text, "").trim().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Context and sub-question text.
    Body,
    /// Continuation lines of the most recent `Answer:`.
    Answer,
}

/// Extract short-answer questions from one item block.
///
/// With `(a)`-style parts the item splits into one question per part,
/// `item_id = <parent>_<letter>`. Without them the whole body becomes a
/// single question.
pub fn extract_saq_items(text: &str) -> Vec<SaqQuestion> {
    let lines = item_lines(text);
    let Some((parent_id, _type_label)) = item_header(&lines) else {
        return Vec::new();
    };

    let mut state = State::Body;
    let mut context_lines: Vec<&str> = Vec::new();
    let mut subs: Vec<SubQuestion> = Vec::new();
    let mut answers: BTreeMap<String, String> = BTreeMap::new();
    let mut item_answer = String::new();
    let mut current_part: Option<String> = None;
    // Which part the most recent `Answer:` belongs to; `None` is item-level.
    let mut answer_part: Option<String> = None;

    for line in &lines[1..] {
        if let Some(rest) = line.strip_prefix("Answer:") {
            let rest = rest.trim();
            if let Some(caps) = ANSWER_PART.captures(rest) {
                let part = format!("({})", &caps[1]);
                answers.insert(part.clone(), caps[2].trim().to_string());
                answer_part = Some(part);
            } else if let Some(part) = &current_part {
                answers.insert(part.clone(), rest.to_string());
                answer_part = Some(part.clone());
            } else {
                if !item_answer.is_empty() {
                    item_answer.push('\n');
                }
                item_answer.push_str(rest);
                answer_part = None;
            }
            state = State::Answer;
            continue;
        }
        if is_metadata_start(line) {
            break;
        }

        if let Some(caps) = SUB_PART.captures(line) {
            let part = format!("({})", &caps[1]);
            subs.push(SubQuestion {
                part: part.clone(),
                question: without_marks(&caps[2]),
                marks: marks_in(line),
            });
            current_part = Some(part);
            state = State::Body;
        } else if state == State::Answer {
            // Continuation of the running answer, never of the question text.
            match &answer_part {
                Some(part) => {
                    if let Some(answer) = answers.get_mut(part) {
                        if !answer.is_empty() {
                            answer.push(' ');
                        }
                        answer.push_str(line);
                    }
                }
                None => {
                    if !item_answer.is_empty() {
                        item_answer.push(' ');
                    }
                    item_answer.push_str(line);
                }
            }
        } else if let Some(sub) = subs.last_mut() {
            // Continuation of the current part's question text.
            sub.marks += marks_in(line);
            let more = without_marks(line);
            if !more.is_empty() {
                if !sub.question.is_empty() {
                    sub.question.push(' ');
                }
                sub.question.push_str(&more);
            }
        } else {
            context_lines.push(line);
        }
    }

    let metadata = extract_metadata(text);
    let shared_context = {
        let joined = context_lines.join("\n");
        let trimmed = joined.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    };

    if subs.is_empty() {
        let text = shared_context.clone().unwrap_or_default();
        return vec![SaqQuestion {
            title: format!("Question {parent_id}"),
            item_id: parent_id,
            total_marks: marks_in(&text),
            text,
            html_content: None,
            sub_questions: Vec::new(),
            answer_key: item_answer,
            shared_context: None,
            parent_item_id: None,
            metadata,
        }];
    }

    subs.into_iter()
        .map(|sub| {
            let letter = sub.part.trim_matches(['(', ')']).to_string();
            SaqQuestion {
                item_id: format!("{parent_id}_{letter}"),
                title: format!("Question {parent_id} ({letter})"),
                text: format!("{} {}", sub.part, sub.question),
                html_content: None,
                answer_key: answers.get(&sub.part).cloned().unwrap_or_default(),
                total_marks: sub.marks,
                sub_questions: vec![sub],
                shared_context: shared_context.clone(),
                parent_item_id: Some(parent_id.clone()),
                metadata: metadata.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: &str = "Item ID: 40 Short Answer\n\
        A 55-year-old presents with crushing chest pain.\n\
        (a) Name the most likely diagnosis. (2 marks)\n\
        Answer: (a) Acute myocardial infarction\n\
        (b) List two immediate investigations. (4 marks)\n\
        Answer: (b) ECG; troponin";

    #[test]
    fn parts_split_into_siblings_with_shared_context() {
        let questions = extract_saq_items(ITEM);
        assert_eq!(questions.len(), 2);

        assert_eq!(questions[0].item_id, "40_a");
        assert_eq!(questions[0].title, "Question 40 (a)");
        assert_eq!(questions[0].text, "(a) Name the most likely diagnosis.");
        assert_eq!(questions[0].answer_key, "Acute myocardial infarction");
        assert_eq!(questions[0].total_marks, 2);
        assert_eq!(questions[0].sub_questions[0].part, "(a)");

        assert_eq!(questions[1].item_id, "40_b");
        assert_eq!(questions[1].answer_key, "ECG; troponin");
        assert_eq!(questions[1].total_marks, 4);
        assert_eq!(questions[1].sub_questions[0].part, "(b)");

        for question in &questions {
            assert_eq!(question.parent_item_id.as_deref(), Some("40"));
            assert_eq!(
                question.shared_context.as_deref(),
                Some("A 55-year-old presents with crushing chest pain.")
            );
            assert_eq!(question.sub_questions.len(), 1);
        }
    }

    #[test]
    fn sibling_marks_sum_to_source_annotations() {
        let questions = extract_saq_items(ITEM);
        let split_total: u32 = questions.iter().map(|q| q.total_marks).sum();
        assert_eq!(split_total, marks_in(ITEM));
    }

    #[test]
    fn answer_without_part_letter_binds_to_current_part() {
        let item = "Item ID: 41 SAQ\n\
            Stem.\n\
            (a) First part. (1 mark)\n\
            Answer: plain answer\n\
            (b) Second part. (2 marks)";
        let questions = extract_saq_items(item);
        assert_eq!(questions[0].answer_key, "plain answer");
        assert_eq!(questions[1].answer_key, "");
    }

    #[test]
    fn continuation_lines_extend_the_part() {
        let item = "Item ID: 42 SAQ\n\
            (a) Describe the mechanism\n\
            of action. (3 marks)\n\
            Answer: (a) Blocks the channel";
        let questions = extract_saq_items(item);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "(a) Describe the mechanism of action.");
        assert_eq!(questions[0].total_marks, 3);
    }

    #[test]
    fn answer_continuation_lines_extend_the_answer_key() {
        let item = "Item ID: 44 SAQ\n\
            (a) First part. (2 marks)\n\
            Answer: (a) line one\n\
            line two of the answer\n\
            (b) Second part. (1 mark)\n\
            Answer: (b) short";
        let questions = extract_saq_items(item);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].answer_key, "line one line two of the answer");
        assert_eq!(questions[0].sub_questions[0].question, "First part.");
        assert_eq!(questions[0].total_marks, 2);
        assert_eq!(questions[1].answer_key, "short");
    }

    #[test]
    fn item_level_answer_continues_across_lines() {
        let item = "Item ID: 45 Short Answer\n\
            Define myocardial stunning. (5 marks)\n\
            Answer: Reversible contractile dysfunction\n\
            after reperfusion";
        let questions = extract_saq_items(item);
        assert_eq!(
            questions[0].answer_key,
            "Reversible contractile dysfunction after reperfusion"
        );
    }

    #[test]
    fn no_parts_yields_a_single_question() {
        let item = "Item ID: 43 Short Answer\n\
            Define myocardial stunning. (5 marks)\n\
            Answer: Reversible contractile dysfunction after reperfusion";
        let questions = extract_saq_items(item);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].item_id, "43");
        assert_eq!(questions[0].total_marks, 5);
        assert!(questions[0].parent_item_id.is_none());
        assert!(questions[0].sub_questions.is_empty());
        assert!(questions[0].answer_key.starts_with("Reversible"));
    }

    #[test]
    fn bad_header_yields_nothing() {
        assert!(extract_saq_items("no header here").is_empty());
    }
}
