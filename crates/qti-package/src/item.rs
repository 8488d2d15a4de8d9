//! Item and stimulus document builders.
//!
//! Every document is a standalone QTI 2.1 `assessmentItem`; stimulus and
//! context documents reuse the element with a body-only layout. Source ids
//! are embedded as XML comments so the assessment-test builder can recover
//! the stimulus relationships from the finished documents.

use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use qti_model::{EmqOption, EmqQuestion, McqQuestion, SaqQuestion};

use crate::escape::normalize_whitespace;
use crate::html::convert_tables;
use crate::ids::{context_identifier, item_identifier, response_identifier, stimulus_identifier};

pub const QTI_NS: &str = "http://www.imsglobal.org/xsd/imsqti_v2p1";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const QTI_SCHEMA_LOCATION: &str = "http://www.imsglobal.org/xsd/imsqti_v2p1 http://www.imsglobal.org/xsd/qti/qtiv2p1/imsqti_v2p1.xsd";
const MATCH_CORRECT_TEMPLATE: &str =
    "http://www.imsglobal.org/question/qti_v2p1/rptemplates/match_correct";

/// One generated document of the package.
#[derive(Debug, Clone)]
pub struct QtiItem {
    pub identifier: String,
    pub filename: String,
    pub xml: String,
}

type XmlWriter = Writer<Vec<u8>>;

fn new_document() -> Result<XmlWriter> {
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(xml)
}

fn finish(xml: XmlWriter) -> Result<String> {
    Ok(String::from_utf8(xml.into_inner())?)
}

fn assessment_item_start(identifier: &str, title: &str) -> BytesStart<'static> {
    let mut root = BytesStart::new("assessmentItem");
    root.push_attribute(("identifier", identifier));
    root.push_attribute(("title", normalize_whitespace(title).as_str()));
    root.push_attribute(("adaptive", "false"));
    root.push_attribute(("timeDependent", "false"));
    root.push_attribute(("xmlns", QTI_NS));
    root.push_attribute(("xmlns:xsi", XSI_NS));
    root.push_attribute(("xsi:schemaLocation", QTI_SCHEMA_LOCATION));
    root
}

fn write_comment(xml: &mut XmlWriter, content: &str) -> Result<()> {
    xml.write_event(Event::Comment(BytesText::new(&format!(" {content} "))))?;
    Ok(())
}

/// `<outcomeDeclaration identifier=".." cardinality="single" baseType="float">`
/// with a nested default value.
fn write_outcome_declaration(xml: &mut XmlWriter, identifier: &str, default: &str) -> Result<()> {
    let mut outcome = BytesStart::new("outcomeDeclaration");
    outcome.push_attribute(("identifier", identifier));
    outcome.push_attribute(("cardinality", "single"));
    outcome.push_attribute(("baseType", "float"));
    xml.write_event(Event::Start(outcome))?;
    xml.write_event(Event::Start(BytesStart::new("defaultValue")))?;
    write_text_element(xml, "value", default)?;
    xml.write_event(Event::End(BytesEnd::new("defaultValue")))?;
    xml.write_event(Event::End(BytesEnd::new("outcomeDeclaration")))?;
    Ok(())
}

fn write_text_element(xml: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_paragraph(xml: &mut XmlWriter, text: &str) -> Result<()> {
    write_text_element(xml, "p", &normalize_whitespace(text))
}

/// Single-response declaration recording the correct choice letter.
///
/// The recorded letter is emitted verbatim; when it names no parsed option
/// the grading template simply never matches (documented permissive
/// validation behavior).
fn write_choice_response_declaration(
    xml: &mut XmlWriter,
    response_id: &str,
    correct_letter: &str,
) -> Result<()> {
    let mut decl = BytesStart::new("responseDeclaration");
    decl.push_attribute(("identifier", response_id));
    decl.push_attribute(("cardinality", "single"));
    decl.push_attribute(("baseType", "identifier"));
    xml.write_event(Event::Start(decl))?;
    xml.write_event(Event::Start(BytesStart::new("correctResponse")))?;
    write_text_element(xml, "value", &format!("choice_{correct_letter}"))?;
    xml.write_event(Event::End(BytesEnd::new("correctResponse")))?;
    xml.write_event(Event::End(BytesEnd::new("responseDeclaration")))?;
    Ok(())
}

fn write_choice_interaction(
    xml: &mut XmlWriter,
    response_id: &str,
    prompt: &str,
    options: &[EmqOption],
) -> Result<()> {
    let mut interaction = BytesStart::new("choiceInteraction");
    interaction.push_attribute(("responseIdentifier", response_id));
    interaction.push_attribute(("shuffle", "false"));
    interaction.push_attribute(("maxChoices", "1"));
    xml.write_event(Event::Start(interaction))?;
    write_text_element(xml, "prompt", prompt)?;
    for option in options {
        let mut choice = BytesStart::new("simpleChoice");
        choice.push_attribute(("identifier", format!("choice_{}", option.letter).as_str()));
        choice.push_attribute(("fixed", "true"));
        xml.write_event(Event::Start(choice))?;
        xml.write_event(Event::Text(BytesText::new(&normalize_whitespace(&option.text))))?;
        xml.write_event(Event::End(BytesEnd::new("simpleChoice")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("choiceInteraction")))?;
    Ok(())
}

/// Item-body content: the converted HTML rendering when one exists, else the
/// plain question text as a paragraph.
fn write_question_content(xml: &mut XmlWriter, html: Option<&str>, text: &str) -> Result<()> {
    match html.filter(|fragment| !fragment.trim().is_empty()) {
        Some(fragment) => {
            // Converted markup is already valid escaped XML, injected as-is.
            let converted = convert_tables(fragment);
            xml.write_event(Event::Text(BytesText::from_escaped(converted)))?;
        }
        None => write_paragraph(xml, text)?,
    }
    Ok(())
}

pub fn generate_mcq_item(question: &McqQuestion) -> Result<QtiItem> {
    let identifier = item_identifier(&question.item_id);
    let response_id = response_identifier();
    let mut xml = new_document()?;

    xml.write_event(Event::Start(assessment_item_start(&identifier, &question.title)))?;
    write_comment(&mut xml, &format!("Item ID: {}", question.item_id))?;
    write_choice_response_declaration(&mut xml, &response_id, &question.correct_answer)?;
    write_outcome_declaration(&mut xml, "SCORE", "0")?;
    write_outcome_declaration(&mut xml, "MAXSCORE", "1")?;

    xml.write_event(Event::Start(BytesStart::new("itemBody")))?;
    xml.write_event(Event::Start(BytesStart::new("div")))?;
    write_question_content(&mut xml, question.html_content.as_deref(), &question.text)?;
    xml.write_event(Event::End(BytesEnd::new("div")))?;
    write_choice_interaction(&mut xml, &response_id, "Choose the correct answer:", &question.options)?;
    xml.write_event(Event::End(BytesEnd::new("itemBody")))?;

    let mut processing = BytesStart::new("responseProcessing");
    processing.push_attribute(("template", MATCH_CORRECT_TEMPLATE));
    xml.write_event(Event::Empty(processing))?;
    xml.write_event(Event::End(BytesEnd::new("assessmentItem")))?;

    Ok(QtiItem {
        filename: format!("{identifier}.xml"),
        xml: finish(xml)?,
        identifier,
    })
}

/// EMQ item document. The stem stays minimal: the shared topic, options, and
/// instructions live in the stimulus document, never duplicated here. The
/// `Options ID:` comment ties the item back to that stimulus.
pub fn generate_emq_item(question: &EmqQuestion) -> Result<QtiItem> {
    let identifier = item_identifier(&question.item_id);
    let response_id = response_identifier();
    let mut xml = new_document()?;

    xml.write_event(Event::Start(assessment_item_start(&identifier, &question.title)))?;
    write_comment(&mut xml, &format!("Item ID: {}", question.item_id))?;
    let options_id = if question.options_id.is_empty() {
        "N/A"
    } else {
        question.options_id.as_str()
    };
    write_comment(&mut xml, &format!("Options ID: {options_id}"))?;
    write_choice_response_declaration(&mut xml, &response_id, &question.correct_answer)?;
    write_outcome_declaration(&mut xml, "SCORE", "0")?;
    write_outcome_declaration(&mut xml, "MAXSCORE", "1")?;

    xml.write_event(Event::Start(BytesStart::new("itemBody")))?;
    if !question.text.trim().is_empty() {
        let mut div = BytesStart::new("div");
        div.push_attribute(("class", "question"));
        xml.write_event(Event::Start(div))?;
        xml.write_event(Event::Start(BytesStart::new("p")))?;
        write_text_element(&mut xml, "strong", &normalize_whitespace(&question.text))?;
        xml.write_event(Event::End(BytesEnd::new("p")))?;
        xml.write_event(Event::End(BytesEnd::new("div")))?;
    }
    write_choice_interaction(&mut xml, &response_id, "Select your answer:", &question.options)?;
    xml.write_event(Event::End(BytesEnd::new("itemBody")))?;

    let mut processing = BytesStart::new("responseProcessing");
    processing.push_attribute(("template", MATCH_CORRECT_TEMPLATE));
    xml.write_event(Event::Empty(processing))?;
    xml.write_event(Event::End(BytesEnd::new("assessmentItem")))?;

    Ok(QtiItem {
        filename: format!("{identifier}.xml"),
        xml: finish(xml)?,
        identifier,
    })
}

/// SAQ item document: free-text interaction, model answer in modal feedback,
/// `MAXSCORE` carrying the summed marks.
pub fn generate_saq_item(question: &SaqQuestion) -> Result<QtiItem> {
    let identifier = item_identifier(&question.item_id);
    let response_id = response_identifier();
    let total_marks = question.total_marks.to_string();
    let mut xml = new_document()?;

    xml.write_event(Event::Start(assessment_item_start(&identifier, &question.title)))?;
    write_comment(&mut xml, &format!("Item ID: {}", question.item_id))?;
    write_comment(&mut xml, &format!("Total Marks: {total_marks}"))?;

    let mut decl = BytesStart::new("responseDeclaration");
    decl.push_attribute(("identifier", response_id.as_str()));
    decl.push_attribute(("cardinality", "single"));
    decl.push_attribute(("baseType", "string"));
    xml.write_event(Event::Empty(decl))?;
    write_outcome_declaration(&mut xml, "SCORE", "0")?;
    write_outcome_declaration(&mut xml, "MAXSCORE", &total_marks)?;

    let mut feedback = BytesStart::new("modalFeedback");
    feedback.push_attribute(("outcomeIdentifier", "SCORE"));
    feedback.push_attribute(("identifier", "correct"));
    feedback.push_attribute(("showHide", "show"));
    xml.write_event(Event::Start(feedback))?;
    write_paragraph(&mut xml, &format!("Answer Key: {}", question.answer_key))?;
    xml.write_event(Event::End(BytesEnd::new("modalFeedback")))?;

    xml.write_event(Event::Start(BytesStart::new("itemBody")))?;
    xml.write_event(Event::Start(BytesStart::new("div")))?;
    if question.sub_questions.is_empty() {
        write_question_content(&mut xml, question.html_content.as_deref(), &question.text)?;
    } else {
        for sub in &question.sub_questions {
            xml.write_event(Event::Start(BytesStart::new("p")))?;
            write_text_element(&mut xml, "strong", &sub.part)?;
            xml.write_event(Event::Text(BytesText::new(&format!(
                " {}",
                normalize_whitespace(&sub.question)
            ))))?;
            xml.write_event(Event::End(BytesEnd::new("p")))?;
        }
    }
    xml.write_event(Event::End(BytesEnd::new("div")))?;

    let mut interaction = BytesStart::new("extendedTextInteraction");
    interaction.push_attribute(("responseIdentifier", response_id.as_str()));
    interaction.push_attribute(("expectedLength", "500"));
    xml.write_event(Event::Start(interaction))?;
    write_text_element(&mut xml, "prompt", "Provide your answer:")?;
    xml.write_event(Event::End(BytesEnd::new("extendedTextInteraction")))?;
    xml.write_event(Event::End(BytesEnd::new("itemBody")))?;

    xml.write_event(Event::Start(BytesStart::new("responseProcessing")))?;
    write_set_outcome(&mut xml, "SCORE", "0")?;
    write_set_outcome(&mut xml, "MAXSCORE", &total_marks)?;
    xml.write_event(Event::End(BytesEnd::new("responseProcessing")))?;
    xml.write_event(Event::End(BytesEnd::new("assessmentItem")))?;

    Ok(QtiItem {
        filename: format!("{identifier}.xml"),
        xml: finish(xml)?,
        identifier,
    })
}

fn write_set_outcome(xml: &mut XmlWriter, identifier: &str, value: &str) -> Result<()> {
    let mut set = BytesStart::new("setOutcomeValue");
    set.push_attribute(("identifier", identifier));
    xml.write_event(Event::Start(set))?;
    let mut base = BytesStart::new("baseValue");
    base.push_attribute(("baseType", "float"));
    xml.write_event(Event::Start(base))?;
    xml.write_event(Event::Text(BytesText::new(value)))?;
    xml.write_event(Event::End(BytesEnd::new("baseValue")))?;
    xml.write_event(Event::End(BytesEnd::new("setOutcomeValue")))?;
    Ok(())
}

/// EMQ stimulus document: the shared context split back into a bold topic
/// header, lettered option paragraphs, and an instruction paragraph.
pub fn generate_emq_stimulus(question: &EmqQuestion) -> Result<QtiItem> {
    let identifier = stimulus_identifier(&question.options_id);
    let mut xml = new_document()?;

    xml.write_event(Event::Start(assessment_item_start(
        &identifier,
        &format!("Stimulus for EMQ Options {}", question.options_id),
    )))?;
    write_comment(
        &mut xml,
        &format!("EMQ Stimulus Document for Options ID: {}", question.options_id),
    )?;
    xml.write_event(Event::Start(BytesStart::new("itemBody")))?;
    let mut div = BytesStart::new("div");
    div.push_attribute(("class", "stimulus"));
    xml.write_event(Event::Start(div))?;

    if let Some(context) = question.shared_context.as_deref() {
        let lines: Vec<&str> = context
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if let Some(topic) = lines.first() {
            xml.write_event(Event::Start(BytesStart::new("p")))?;
            write_text_element(&mut xml, "strong", &normalize_whitespace(topic))?;
            xml.write_event(Event::End(BytesEnd::new("p")))?;
        }
        let mut instructions: Vec<&str> = Vec::new();
        for line in lines.iter().copied().skip(1) {
            if instructions.is_empty() && is_option_paragraph(line) {
                write_paragraph(&mut xml, line)?;
            } else if !instructions.is_empty() || is_instruction_paragraph(line) {
                instructions.push(line);
            }
        }
        if !instructions.is_empty() {
            write_paragraph(&mut xml, &instructions.join(" "))?;
        }
    }

    xml.write_event(Event::End(BytesEnd::new("div")))?;
    xml.write_event(Event::End(BytesEnd::new("itemBody")))?;
    xml.write_event(Event::End(BytesEnd::new("assessmentItem")))?;

    Ok(QtiItem {
        filename: format!("{identifier}.xml"),
        xml: finish(xml)?,
        identifier,
    })
}

fn is_option_paragraph(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some('A'..='J'), Some('.'), Some(' '))
    )
}

fn is_instruction_paragraph(line: &str) -> bool {
    let lower = line.to_lowercase();
    ["select", "choose", "match", "may be used", "for each"]
        .iter()
        .any(|phrase| lower.contains(phrase))
}

/// SAQ context document: the common stem shared by one item's sub-questions.
pub fn generate_saq_context(parent_item_id: &str, shared_context: &str) -> Result<QtiItem> {
    let identifier = context_identifier(parent_item_id);
    let mut xml = new_document()?;

    xml.write_event(Event::Start(assessment_item_start(
        &identifier,
        &format!("Stimulus for Question {parent_item_id}"),
    )))?;
    write_comment(&mut xml, &format!("Context Document for Item ID: {parent_item_id}"))?;
    xml.write_event(Event::Start(BytesStart::new("itemBody")))?;
    let mut div = BytesStart::new("div");
    div.push_attribute(("class", "stimulus"));
    xml.write_event(Event::Start(div))?;
    xml.write_event(Event::Start(BytesStart::new("p")))?;
    write_text_element(&mut xml, "strong", "Context:")?;
    xml.write_event(Event::End(BytesEnd::new("p")))?;
    write_paragraph(&mut xml, shared_context)?;
    xml.write_event(Event::End(BytesEnd::new("div")))?;
    xml.write_event(Event::End(BytesEnd::new("itemBody")))?;
    xml.write_event(Event::End(BytesEnd::new("assessmentItem")))?;

    Ok(QtiItem {
        filename: format!("{identifier}.xml"),
        xml: finish(xml)?,
        identifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qti_model::McqOption;

    fn sample_mcq() -> McqQuestion {
        McqQuestion {
            item_id: "1".to_string(),
            title: "Question 1".to_string(),
            text: "What is 2+2?".to_string(),
            html_content: None,
            options: vec![McqOption::new('A', "3"), McqOption::new('B', "4")],
            correct_answer: "B".to_string(),
            metadata: None,
        }
    }

    #[test]
    fn mcq_item_carries_response_and_comment() {
        let item = generate_mcq_item(&sample_mcq()).unwrap();
        assert!(item.identifier.starts_with("item_1_"));
        assert_eq!(item.filename, format!("{}.xml", item.identifier));
        assert!(item.xml.contains("<!-- Item ID: 1 -->"));
        assert!(item.xml.contains("<value>choice_B</value>"));
        assert!(item.xml.contains(r#"<simpleChoice identifier="choice_A" fixed="true">3</simpleChoice>"#));
        assert!(item.xml.contains(r#"template="http://www.imsglobal.org/question/qti_v2p1/rptemplates/match_correct""#));
    }

    #[test]
    fn mcq_body_prefers_html_content() {
        let mut question = sample_mcq();
        question.html_content =
            Some("<table><tr><td>2+2</td></tr></table>".to_string());
        let item = generate_mcq_item(&question).unwrap();
        assert!(item.xml.contains("<td>2+2</td>"));
        assert!(!item.xml.contains("<p>What is 2+2?</p>"));
    }

    #[test]
    fn emq_item_embeds_options_id_comment() {
        let question = EmqQuestion {
            item_id: "22".to_string(),
            title: "Question 22".to_string(),
            text: "Dengue".to_string(),
            html_content: None,
            options_id: "10".to_string(),
            options: vec![McqOption::new('A', "one")],
            reference_id: "10".to_string(),
            correct_answer: "A".to_string(),
            shared_context: None,
            parent_item_id: None,
            metadata: None,
        };
        let item = generate_emq_item(&question).unwrap();
        assert!(item.xml.contains("<!-- Options ID: 10 -->"));
        assert!(item.xml.contains("<strong>Dengue</strong>"));
    }

    #[test]
    fn emq_item_without_options_id_records_na() {
        let question = EmqQuestion {
            item_id: "23".to_string(),
            title: "Question 23".to_string(),
            text: "Orphan".to_string(),
            html_content: None,
            options_id: String::new(),
            options: vec![McqOption::new('A', "one")],
            reference_id: String::new(),
            correct_answer: "A".to_string(),
            shared_context: None,
            parent_item_id: None,
            metadata: None,
        };
        let item = generate_emq_item(&question).unwrap();
        assert!(item.xml.contains("<!-- Options ID: N/A -->"));
    }

    #[test]
    fn saq_item_records_marks_and_answer_key() {
        let question = SaqQuestion {
            item_id: "40_a".to_string(),
            title: "Question 40 (a)".to_string(),
            text: "(a) Name the diagnosis.".to_string(),
            html_content: None,
            sub_questions: vec![qti_model::SubQuestion {
                part: "(a)".to_string(),
                question: "Name the diagnosis.".to_string(),
                marks: 2,
            }],
            answer_key: "Acute MI".to_string(),
            total_marks: 2,
            shared_context: Some("Chest pain.".to_string()),
            parent_item_id: Some("40".to_string()),
            metadata: None,
        };
        let item = generate_saq_item(&question).unwrap();
        assert!(item.xml.contains("<!-- Total Marks: 2 -->"));
        assert!(item.xml.contains("Answer Key: Acute MI"));
        assert!(item.xml.contains("<extendedTextInteraction"));
        assert!(item.xml.contains("<strong>(a)</strong> Name the diagnosis."));
    }

    #[test]
    fn emq_stimulus_splits_context_into_paragraphs() {
        let question = EmqQuestion {
            item_id: "21".to_string(),
            title: "Question 21".to_string(),
            text: "stem".to_string(),
            html_content: None,
            options_id: "10".to_string(),
            options: vec![McqOption::new('A', "Malaria"), McqOption::new('B', "Dengue")],
            reference_id: String::new(),
            correct_answer: "A".to_string(),
            shared_context: Some(
                "Tropical infections\nA. Malaria\nB. Dengue\n\nFor each patient, select one option. Each option may be used once."
                    .to_string(),
            ),
            parent_item_id: None,
            metadata: None,
        };
        let stimulus = generate_emq_stimulus(&question).unwrap();
        assert!(stimulus.identifier.starts_with("stimulus_10_"));
        assert!(stimulus.xml.contains("<strong>Tropical infections</strong>"));
        assert!(stimulus.xml.contains("<p>A. Malaria</p>"));
        assert!(stimulus.xml.contains("For each patient, select one option."));
        assert!(stimulus.xml.contains("<!-- EMQ Stimulus Document for Options ID: 10 -->"));
    }

    #[test]
    fn saq_context_document_wraps_the_shared_stem() {
        let context = generate_saq_context("40", "A 55-year-old presents with chest pain.").unwrap();
        assert!(context.identifier.starts_with("context_40_"));
        assert!(context.xml.contains("<strong>Context:</strong>"));
        assert!(context.xml.contains("A 55-year-old presents with chest pain."));
    }
}
