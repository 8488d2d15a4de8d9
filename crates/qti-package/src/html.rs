//! HTML table conversion.
//!
//! The document-extraction collaborator may hand over an HTML rendering of
//! the source alongside the plain text. Table markup from that rendering is
//! rewritten into plain QTI `<table>` markup; everything else passes through
//! untouched.

use regex::Regex;
use std::sync::LazyLock;

use crate::escape::escape_xml;

static TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<table[^>]*>(.*?)</table>").expect("valid regex"));
static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>").expect("valid regex"));
static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<t[hd][^>]*>(.*?)</t[hd]>").expect("valid regex"));

/// Rewrite every HTML table in a fragment as attribute-free QTI table markup
/// with escaped cell text.
#[must_use]
pub fn convert_tables(html: &str) -> String {
    TABLE
        .replace_all(html, |caps: &regex::Captures<'_>| convert_one_table(&caps[1]))
        .into_owned()
}

fn convert_one_table(table_body: &str) -> String {
    let mut out = String::from("<table>\n");
    for row in ROW.captures_iter(table_body) {
        let row_body = &row[1];
        let tag = if row[0].contains("<th") { "th" } else { "td" };
        out.push_str("  <tr>\n");
        for cell in CELL.captures_iter(row_body) {
            let content = escape_xml(cell[1].trim());
            out.push_str(&format!("    <{tag}>{content}</{tag}>\n"));
        }
        out.push_str("  </tr>\n");
    }
    out.push_str("</table>");
    out
}
