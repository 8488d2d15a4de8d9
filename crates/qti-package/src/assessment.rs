//! Assessment test generation with stimulus grouping.
//!
//! Grouping works over the finished documents, not the question records:
//! stimulus/context documents are recognized by identifier prefix, and each
//! question item is tied back to its parent through the source-id comments
//! embedded in its XML.

use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::ids::{CONTEXT_PREFIX, STIMULUS_PREFIX, prefixed_identifier, strip_uuid_suffix};
use crate::item::{QTI_NS, QTI_SCHEMA_LOCATION, QtiItem, XSI_NS};

static OPTIONS_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- Options ID: (\S+)").expect("valid regex"));
static ITEM_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- Item ID: (\S+)").expect("valid regex"));

/// One test section: an optional stimulus document and the question items
/// that depend on it.
#[derive(Debug)]
pub struct StimulusGroup<'a> {
    pub stimulus: Option<&'a QtiItem>,
    pub questions: Vec<&'a QtiItem>,
}

/// Group generated documents by their stimulus relationship.
///
/// A question belongs to a stimulus when its `Options ID:` comment names the
/// stimulus source id, or when the base of its `Item ID:` comment (the part
/// before a `_<suffix>`) matches a context document's parent. Everything
/// else lands in one trailing orphan group.
pub fn group_items_by_stimulus(items: &[QtiItem]) -> Vec<StimulusGroup<'_>> {
    let mut stimuli: BTreeMap<String, &QtiItem> = BTreeMap::new();
    let mut questions: Vec<&QtiItem> = Vec::new();

    for item in items {
        if let Some(parent) = stimulus_parent(&item.identifier) {
            stimuli.insert(parent, item);
        } else {
            questions.push(item);
        }
    }

    let mut grouped: BTreeMap<String, Vec<&QtiItem>> = BTreeMap::new();
    let mut orphans: Vec<&QtiItem> = Vec::new();
    for item in questions {
        match question_parent(item, &stimuli) {
            Some(parent) => grouped.entry(parent).or_default().push(item),
            None => orphans.push(item),
        }
    }

    let mut groups: Vec<StimulusGroup<'_>> = grouped
        .into_iter()
        .map(|(parent, mut members)| {
            members.sort_by(|a, b| a.identifier.cmp(&b.identifier));
            StimulusGroup {
                stimulus: stimuli.get(&parent).copied(),
                questions: members,
            }
        })
        .collect();
    if !orphans.is_empty() {
        orphans.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        groups.push(StimulusGroup {
            stimulus: None,
            questions: orphans,
        });
    }
    groups
}

/// Parent source id of a stimulus/context document, from its identifier.
fn stimulus_parent(identifier: &str) -> Option<String> {
    let rest = identifier
        .strip_prefix(STIMULUS_PREFIX)
        .or_else(|| identifier.strip_prefix(CONTEXT_PREFIX))?;
    Some(strip_uuid_suffix(rest).to_string())
}

fn question_parent(item: &QtiItem, stimuli: &BTreeMap<String, &QtiItem>) -> Option<String> {
    if let Some(caps) = OPTIONS_COMMENT.captures(&item.xml) {
        let options_id = &caps[1];
        if options_id != "N/A" && stimuli.contains_key(options_id) {
            return Some(options_id.to_string());
        }
    }
    if let Some(caps) = ITEM_COMMENT.captures(&item.xml) {
        let base = caps[1].split('_').next().unwrap_or(&caps[1]);
        if stimuli.contains_key(base) {
            return Some(base.to_string());
        }
    }
    None
}

/// Build `assessment.xml`: one non-linear, simultaneous-submission test part
/// holding one `assessmentSection` per stimulus group, the stimulus reference
/// first and pinned, plus a catch-all section for ungrouped questions.
pub fn generate_assessment_test(items: &[QtiItem], title: &str) -> Result<String> {
    let test_id = prefixed_identifier("test");
    let groups = group_items_by_stimulus(items);

    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("assessmentTest");
    root.push_attribute(("identifier", test_id.as_str()));
    root.push_attribute(("title", title.trim()));
    root.push_attribute(("xmlns", QTI_NS));
    root.push_attribute(("xmlns:xsi", XSI_NS));
    root.push_attribute(("xsi:schemaLocation", QTI_SCHEMA_LOCATION));
    xml.write_event(Event::Start(root))?;

    let mut outcome = BytesStart::new("outcomeDeclaration");
    outcome.push_attribute(("identifier", "SCORE"));
    outcome.push_attribute(("cardinality", "single"));
    outcome.push_attribute(("baseType", "float"));
    xml.write_event(Event::Start(outcome))?;
    xml.write_event(Event::Start(BytesStart::new("defaultValue")))?;
    xml.write_event(Event::Start(BytesStart::new("value")))?;
    xml.write_event(Event::Text(BytesText::new("0")))?;
    xml.write_event(Event::End(BytesEnd::new("value")))?;
    xml.write_event(Event::End(BytesEnd::new("defaultValue")))?;
    xml.write_event(Event::End(BytesEnd::new("outcomeDeclaration")))?;

    let mut part = BytesStart::new("testPart");
    part.push_attribute(("identifier", "testPart"));
    part.push_attribute(("navigationMode", "nonlinear"));
    part.push_attribute(("submissionMode", "simultaneous"));
    xml.write_event(Event::Start(part))?;

    for (index, group) in groups.iter().enumerate() {
        let number = index + 1;
        let section_id = prefixed_identifier(&format!("section_{number}"));
        let section_title = if group.stimulus.is_some() {
            format!("Section {number} - Questions with Stimulus")
        } else {
            format!("Section {number} - Individual Questions")
        };
        let mut section = BytesStart::new("assessmentSection");
        section.push_attribute(("identifier", section_id.as_str()));
        section.push_attribute(("title", section_title.as_str()));
        section.push_attribute(("visible", "true"));
        xml.write_event(Event::Start(section))?;

        if let Some(stimulus) = group.stimulus {
            let mut item_ref = BytesStart::new("assessmentItemRef");
            item_ref.push_attribute(("identifier", stimulus.identifier.as_str()));
            item_ref.push_attribute(("href", stimulus.filename.as_str()));
            item_ref.push_attribute(("category", "stimulus"));
            item_ref.push_attribute(("fixed", "true"));
            xml.write_event(Event::Empty(item_ref))?;
        }
        for question in &group.questions {
            let mut item_ref = BytesStart::new("assessmentItemRef");
            item_ref.push_attribute(("identifier", question.identifier.as_str()));
            item_ref.push_attribute(("href", question.filename.as_str()));
            xml.write_event(Event::Empty(item_ref))?;
        }
        xml.write_event(Event::End(BytesEnd::new("assessmentSection")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("testPart")))?;
    xml.write_event(Event::End(BytesEnd::new("assessmentTest")))?;
    Ok(String::from_utf8(xml.into_inner())?)
}
