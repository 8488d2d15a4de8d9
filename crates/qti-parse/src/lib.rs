//! Question extraction engine.
//!
//! Recovers typed question records (MCQ, EMQ, SAQ) from free-form exam text:
//! normalization, item segmentation on the `Item ID:` anchor, heuristic type
//! classification, and one line-by-line state machine per question family.
//! Item-level failures are recovered locally; only a document with no items
//! (or no extractable questions at all) fails the whole parse.

pub mod classify;
pub mod document;
pub mod extract;
pub mod normalize;
pub mod segment;

pub use classify::{detect_item_type, detect_parse_mode};
pub use document::parse_document;
pub use extract::SharedOptionState;
pub use normalize::clean_text;
pub use segment::split_items;
