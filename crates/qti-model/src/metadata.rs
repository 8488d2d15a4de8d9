use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Optional trailing profile/statistics block attached to a source item.
///
/// Absence of a `Profile:` line means no metadata object is attached at all,
/// not an empty one; callers must treat metadata as optional throughout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMetadata {
    /// Free-form tag→value pairs from the inline `Profile:` tag soup
    /// (specialty, discipline, taxonomy, system, process, ...).
    pub profile: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_use_statistics: Option<UsageStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_info: Option<String>,
}

/// Difficulty/discrimination scores from a `Last Use Statistics:` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examination_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discrimination_index: Option<u32>,
}

impl UsageStatistics {
    /// True when no statistic was recognized at all.
    pub fn is_empty(&self) -> bool {
        self.examination_year.is_none()
            && self.difficulty_level.is_none()
            && self.discrimination_index.is_none()
    }
}
