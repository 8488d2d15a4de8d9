//! Trailing metadata block.
//!
//! A `Profile:` line carries inline tag soup (`<specialty>Medicine`), an
//! optional `Last Use Statistics:` block carries key:value lines. No
//! `Profile:` line means no metadata object at all, not an empty one.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use qti_model::{QuestionMetadata, UsageStatistics};

/// Profile tags are authored both closed (`<x>v</x>`) and unclosed (`<x>v`).
static PROFILE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>/]+)>\s*([^<]*)").expect("valid regex"));

/// Extract the optional trailing metadata of one item block.
pub fn extract_metadata(text: &str) -> Option<QuestionMetadata> {
    let mut profile: BTreeMap<String, String> = BTreeMap::new();
    let mut stats = UsageStatistics::default();
    let mut background: Vec<String> = Vec::new();
    let mut in_profile = false;
    let mut in_stats = false;
    let mut in_background = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Profile:") {
            in_profile = true;
            in_stats = false;
            in_background = false;
            collect_profile_tags(rest, &mut profile);
            continue;
        }
        if line.starts_with("Last Use Statistics:") {
            in_stats = true;
            in_profile = false;
            in_background = false;
            continue;
        }
        if let Some(rest) = line.strip_prefix("Background Info:") {
            in_background = true;
            in_profile = false;
            in_stats = false;
            let rest = rest.trim();
            if !rest.is_empty() {
                background.push(rest.to_string());
            }
            continue;
        }
        // Hyphenated is the documented terminator; the space form shows up in
        // older documents.
        if line.starts_with("End-of-Item") || line.starts_with("End of Item") {
            break;
        }

        if in_profile {
            if line.contains('<') {
                collect_profile_tags(line, &mut profile);
            } else {
                in_profile = false;
            }
        } else if in_stats {
            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim();
                match key.trim() {
                    "Examination Year" => stats.examination_year = Some(value.to_string()),
                    "Difficulty Level" => stats.difficulty_level = value.parse().ok(),
                    "Discrimination Index" => stats.discrimination_index = value.parse().ok(),
                    _ => {}
                }
            } else {
                in_stats = false;
            }
        } else if in_background {
            background.push(line.to_string());
        }
    }

    if profile.is_empty() {
        return None;
    }
    Some(QuestionMetadata {
        profile,
        last_use_statistics: if stats.is_empty() { None } else { Some(stats) },
        background_info: if background.is_empty() {
            None
        } else {
            Some(background.join("\n"))
        },
    })
}

fn collect_profile_tags(fragment: &str, profile: &mut BTreeMap<String, String>) {
    for caps in PROFILE_TAG.captures_iter(fragment) {
        let tag = caps[1].trim().to_string();
        let value = caps[2].trim().to_string();
        if !tag.is_empty() && !value.is_empty() {
            profile.insert(tag, value);
        }
    }
}
