//! Text normalization ahead of segmentation and extraction.

use regex::Regex;
use std::sync::LazyLock;

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static RUNS_OF_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

/// Collapse whitespace and line endings and strip invisible characters.
///
/// - CRLF and lone CR become LF
/// - runs of three or more newlines collapse to one blank line
/// - runs of spaces/tabs collapse to a single space
/// - zero-width characters (U+200B..U+200D, U+FEFF) are removed
/// - every line is trimmed, as is the whole document
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = EXCESS_BLANK_LINES.replace_all(&unified, "\n\n");
    let collapsed = RUNS_OF_SPACES.replace_all(&collapsed, " ");
    let visible: String = collapsed
        .chars()
        .filter(|ch| !matches!(ch, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .collect();

    visible
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unifies_line_endings() {
        assert_eq!(clean_text("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn collapses_blank_lines_and_spaces() {
        assert_eq!(clean_text("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(clean_text("a  \t  b"), "a b");
    }

    #[test]
    fn strips_zero_width_characters() {
        assert_eq!(clean_text("a\u{200B}b\u{FEFF}c\u{200D}"), "abc");
    }

    #[test]
    fn trims_each_line_and_document() {
        assert_eq!(clean_text("  first \n  second  \n"), "first\nsecond");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   \n  "), "");
    }
}
