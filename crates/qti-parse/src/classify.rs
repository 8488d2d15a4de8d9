//! Heuristic type classification.
//!
//! The source format is inconsistently authored by humans, so classification
//! is a tolerant scored-pattern pass, not a grammar: it counts type-specific
//! indicators, degrades gracefully on partial input, and never fails.
//! Absence of any signal still yields a type (MCQ).

use regex::Regex;
use std::sync::LazyLock;

use qti_model::{ParseMode, QuestionKind};

static MCQ_TYPE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)A type:").expect("valid regex"));
static EMQ_TYPE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)R type").expect("valid regex"));
static SAQ_TYPE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SAQ|Short Answer").expect("valid regex"));
static OPTIONS_ID_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Options ID:").expect("valid regex"));
static EXTENDED_MATCHING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Extended Matching").expect("valid regex"));
/// Four lettered options in a row is the strongest MCQ shape signal.
static MCQ_OPTION_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*A\.\s+[^\n]+\n\s*B\.\s+[^\n]+\n\s*C\.\s+[^\n]+\n\s*D\.\s+[^\n]+")
        .expect("valid regex")
});

static MCQ_HINTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"A type:|A\.|B\.|C\.|D\.").expect("valid regex"));
static EMQ_HINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"R type|Extended Matching|Options ID:|With reference to").expect("valid regex")
});
static SAQ_HINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Short Answer|\(a\)|\(b\)|\(c\)|marks?\)").expect("valid regex")
});

static SUB_QUESTION_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([a-z]\)").expect("valid regex"));
static MARKS_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\s*marks?").expect("valid regex"));
static OPTIONS_ID_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)options? id:").expect("valid regex"));
static REFERENCE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)with reference to|choose.*most appropriate").expect("valid regex")
});

fn count(re: &Regex, text: &str) -> usize {
    re.find_iter(text).count()
}

/// Decide whether a document is single-type or mixed, and which.
///
/// Filename substrings (`mixed`, `exam`, `paper`, `hybrid`) force mixed mode.
/// Otherwise indicators are counted per type; two or more types present above
/// zero classify the document as mixed, else the dominant single type wins.
pub fn detect_parse_mode(text: &str, filename: &str) -> ParseMode {
    let lower_filename = filename.to_lowercase();
    if ["mixed", "exam", "paper", "hybrid"]
        .iter()
        .any(|hint| lower_filename.contains(hint))
    {
        return ParseMode::Mixed;
    }

    let mcq_types = count(&MCQ_TYPE_MARKER, text);
    let emq_types = count(&EMQ_TYPE_MARKER, text);
    let saq_types = count(&SAQ_TYPE_MARKER, text);
    let options_ids = count(&OPTIONS_ID_MARKER, text);
    let extended_matching = count(&EXTENDED_MATCHING, text);
    let mcq_blocks = count(&MCQ_OPTION_BLOCK, text);

    // Explicit type markers for two different families settle it.
    if (mcq_types > 0 && emq_types > 0)
        || (mcq_types > 0 && saq_types > 0)
        || (emq_types > 0 && saq_types > 0)
    {
        return ParseMode::Mixed;
    }

    // EMQ indicators alongside MCQ shapes also mean mixed content.
    if (options_ids > 0 || extended_matching > 0 || emq_types > 0)
        && (mcq_blocks > 0 || mcq_types > 0)
    {
        return ParseMode::Mixed;
    }

    let families_present = usize::from(mcq_types > 0 || mcq_blocks > 0)
        + usize::from(emq_types > 0 || options_ids > 0)
        + usize::from(saq_types > 0);
    if families_present >= 2 {
        return ParseMode::Mixed;
    }

    detect_single_type(text, &lower_filename)
}

/// Single-type fallback: filename hints first, then dominant indicator count.
/// MCQ on a tie or in the absence of any signal.
fn detect_single_type(text: &str, lower_filename: &str) -> ParseMode {
    if lower_filename.contains("mcq") {
        return ParseMode::Mcq;
    }
    if lower_filename.contains("emq") {
        return ParseMode::Emq;
    }
    if lower_filename.contains("saq") {
        return ParseMode::Saq;
    }

    let mcq = count(&MCQ_HINTS, text);
    let emq = count(&EMQ_HINTS, text);
    let saq = count(&SAQ_HINTS, text);

    if emq > mcq && emq > saq {
        ParseMode::Emq
    } else if saq > mcq && saq > emq {
        ParseMode::Saq
    } else {
        ParseMode::Mcq
    }
}

/// Classify one item independently (mixed mode).
pub fn detect_item_type(item_text: &str) -> QuestionKind {
    let lower = item_text.to_lowercase();

    // Explicit markers take precedence over shape heuristics.
    if lower.contains("a type:") || lower.contains("b type:") || lower.contains("c type:") {
        return QuestionKind::Mcq;
    }
    if lower.contains("r type") || lower.contains("extended matching") {
        return QuestionKind::Emq;
    }
    if lower.contains("short answer") || lower.contains("saq") {
        return QuestionKind::Saq;
    }

    let has_sub_parts = SUB_QUESTION_PART.is_match(item_text);
    let has_marks = MARKS_ANNOTATION.is_match(item_text);
    let has_options_id = OPTIONS_ID_LINE.is_match(&lower);
    let has_reference = REFERENCE_PHRASE.is_match(item_text);

    if has_options_id || has_reference {
        return QuestionKind::Emq;
    }
    if has_sub_parts && has_marks {
        return QuestionKind::Saq;
    }
    // Lettered option lines and everything else fall through to MCQ.
    QuestionKind::Mcq
}
