//! Identifier minting.
//!
//! Every generated document gets a fresh `<prefix>_<sourceId>_<uuid>`
//! identifier, so repeated generation over the same question list never
//! collides with a previous package. The uuid suffix can be stripped again
//! to recover the source id when grouping test sections.

use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

pub const STIMULUS_PREFIX: &str = "stimulus_";
pub const CONTEXT_PREFIX: &str = "context_";

static UUID_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("valid regex")
});

/// Identifier for a question item document.
#[must_use]
pub fn item_identifier(item_id: &str) -> String {
    format!("item_{item_id}_{}", Uuid::new_v4())
}

/// Identifier for an EMQ shared-option stimulus document.
#[must_use]
pub fn stimulus_identifier(options_id: &str) -> String {
    format!("{STIMULUS_PREFIX}{options_id}_{}", Uuid::new_v4())
}

/// Identifier for an SAQ shared-context document.
#[must_use]
pub fn context_identifier(parent_item_id: &str) -> String {
    format!("{CONTEXT_PREFIX}{parent_item_id}_{}", Uuid::new_v4())
}

#[must_use]
pub fn response_identifier() -> String {
    format!("RESPONSE_{}", Uuid::new_v4())
}

#[must_use]
pub fn prefixed_identifier(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4())
}

/// Strip the trailing uuid, recovering the stable part of an identifier.
#[must_use]
pub fn strip_uuid_suffix(identifier: &str) -> &str {
    match UUID_SUFFIX.find(identifier) {
        Some(found) => &identifier[..found.start()],
        None => identifier,
    }
}
