//! QTI 2.1 serialization engine.
//!
//! Turns a validated question list into an importable package: one standalone
//! `assessmentItem` document per question, stimulus/context documents for
//! shared EMQ option sets and SAQ stems, an `assessmentTest`, and an IMS
//! Content Package manifest tying them together. Pure function of the
//! question list apart from identifier minting, which is random per call.

pub mod assessment;
pub mod escape;
pub mod html;
pub mod ids;
pub mod item;
pub mod manifest;

use std::collections::BTreeSet;

use anyhow::Result;
use tracing::{debug, warn};

use qti_model::Question;

pub use assessment::{StimulusGroup, generate_assessment_test, group_items_by_stimulus};
pub use escape::{escape_xml, normalize_whitespace};
pub use item::QtiItem;
pub use manifest::{ASSESSMENT_FILENAME, generate_manifest};

pub const MANIFEST_FILENAME: &str = "imsmanifest.xml";

/// A complete generated package, ready to be written out flat: every `href`
/// in the manifest and assessment test names a filename in `items` (or
/// `assessment.xml` itself).
#[derive(Debug, Clone)]
pub struct QtiPackage {
    pub manifest: String,
    pub assessment: String,
    pub items: Vec<QtiItem>,
}

/// Generate the full package for a question list.
///
/// Walks questions in source order. The first question naming an EMQ
/// `options_id` emits that set's stimulus document ahead of itself; the first
/// SAQ sibling of a `parent_item_id` likewise emits the shared context
/// document. A per-item generation failure skips that item with a warning,
/// so manifest and test generation stay total over whatever remains.
pub fn generate_package(questions: &[Question], assessment_title: &str) -> Result<QtiPackage> {
    let mut items: Vec<QtiItem> = Vec::new();
    let mut generated_stimuli: BTreeSet<String> = BTreeSet::new();
    let mut generated_contexts: BTreeSet<String> = BTreeSet::new();

    for question in questions {
        match question {
            Question::Mcq(mcq) => {
                push_or_skip(&mut items, item::generate_mcq_item(mcq), &mcq.item_id);
            }
            Question::Emq(emq) => {
                if !emq.options_id.is_empty()
                    && !emq.options.is_empty()
                    && !generated_stimuli.contains(&emq.options_id)
                {
                    push_or_skip(&mut items, item::generate_emq_stimulus(emq), &emq.item_id);
                    generated_stimuli.insert(emq.options_id.clone());
                }
                push_or_skip(&mut items, item::generate_emq_item(emq), &emq.item_id);
            }
            Question::Saq(saq) => {
                if let (Some(context), Some(parent)) =
                    (saq.shared_context.as_deref(), saq.parent_item_id.as_deref())
                {
                    if !generated_contexts.contains(parent) {
                        push_or_skip(
                            &mut items,
                            item::generate_saq_context(parent, context),
                            &saq.item_id,
                        );
                        generated_contexts.insert(parent.to_string());
                    }
                }
                push_or_skip(&mut items, item::generate_saq_item(saq), &saq.item_id);
            }
        }
    }
    debug!(
        documents = items.len(),
        stimuli = generated_stimuli.len() + generated_contexts.len(),
        "generated package documents"
    );

    Ok(QtiPackage {
        manifest: generate_manifest(&items, assessment_title)?,
        assessment: generate_assessment_test(&items, assessment_title)?,
        items,
    })
}

fn push_or_skip(items: &mut Vec<QtiItem>, result: Result<QtiItem>, item_id: &str) {
    match result {
        Ok(item) => items.push(item),
        Err(error) => warn!(item_id, %error, "skipping document that failed to serialize"),
    }
}
