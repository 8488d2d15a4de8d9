//! Item segmentation on the `Item ID:` anchor.

use qti_model::ParseError;

/// The literal anchor every source item starts at.
pub const ITEM_ANCHOR: &str = "Item ID:";

/// Split a normalized document into per-item text blocks.
///
/// Each block starts at an `Item ID:` occurrence and runs to the next one.
/// Preamble text before the first anchor and empty fragments are dropped.
/// A document containing no anchor at all does not resemble the supported
/// format family, which is the one hard parse failure at the document level.
pub fn split_items(text: &str) -> Result<Vec<&str>, ParseError> {
    let starts: Vec<usize> = text.match_indices(ITEM_ANCHOR).map(|(i, _)| i).collect();
    if starts.is_empty() {
        return Err(ParseError::NoItems);
    }

    let mut items = Vec::with_capacity(starts.len());
    for (idx, &start) in starts.iter().enumerate() {
        let end = starts.get(idx + 1).copied().unwrap_or(text.len());
        let fragment = text[start..end].trim();
        if !fragment.is_empty() {
            items.push(fragment);
        }
    }
    Ok(items)
}
