use thiserror::Error;

use crate::mode::ParseMode;

/// Document-level failures. Item-level problems are recovered locally by the
/// extractors (the item is skipped with a warning), so they never surface here.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no text content provided")]
    EmptyDocument,
    #[error("no items found: the document must contain at least one \"Item ID:\" block")]
    NoItems,
    #[error("no valid {0} questions found: check the document format and try again")]
    NoQuestions(ParseMode),
}
