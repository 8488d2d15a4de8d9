//! Text preparation for XML emission.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Trim and collapse internal whitespace runs to single spaces.
///
/// Source text arrives with OCR artifacts and hard-wrapped lines; one
/// paragraph of item-body text never preserves layout.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Normalize whitespace, then escape the five XML metacharacters.
///
/// `&` is rewritten first, so each pass escapes exactly once: re-escaping
/// already-escaped text double-escapes the ampersand rather than producing
/// a mismatched entity.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    normalize_whitespace(text)
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn collapses_runs_and_trims() {
        assert_eq!(normalize_whitespace("  a \t b\n\nc  "), "a b c");
    }

    #[test]
    fn escapes_all_five_metacharacters() {
        assert_eq!(
            escape_xml(r#"<a & "b" 'c'>"#),
            "&lt;a &amp; &quot;b&quot; &apos;c&apos;&gt;"
        );
    }

    proptest! {
        // Every pass escapes `&` exactly once; the output never contains a
        // bare metacharacter, so repeated escaping stays well-formed.
        #[test]
        fn escaped_output_has_no_bare_metacharacters(text in ".{0,200}") {
            for pass in [escape_xml(&text), escape_xml(&escape_xml(&text))] {
                prop_assert!(!pass.contains('<'));
                prop_assert!(!pass.contains('>'));
                prop_assert!(!pass.contains('"'));
                prop_assert!(!pass.contains('\''));
                for (idx, _) in pass.match_indices('&') {
                    let rest = &pass[idx..];
                    prop_assert!(
                        ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"]
                            .iter()
                            .any(|entity| rest.starts_with(entity)),
                        "bare ampersand in {pass:?}"
                    );
                }
            }
        }

        #[test]
        fn double_escape_only_doubles_the_ampersand(text in "[a-z &]{0,80}") {
            let once = escape_xml(&text);
            let twice = escape_xml(&once);
            prop_assert_eq!(twice, once.replace('&', "&amp;"));
        }
    }
}
