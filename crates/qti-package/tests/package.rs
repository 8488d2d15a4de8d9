use std::collections::BTreeSet;

use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;

use qti_model::{EmqQuestion, McqOption, McqQuestion, Question, SaqQuestion, SubQuestion};
use qti_package::generate_package;

fn assert_well_formed(label: &str, xml: &str) {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(error) => panic!("{label} is not well-formed XML: {error}"),
        }
    }
}

fn sample_questions() -> Vec<Question> {
    let options = vec![
        McqOption::new('A', "Plasmodium falciparum"),
        McqOption::new('B', "Dengue virus"),
    ];
    vec![
        Question::Mcq(McqQuestion {
            item_id: "1".to_string(),
            title: "Question 1".to_string(),
            text: "What is 2+2?".to_string(),
            html_content: None,
            options: vec![McqOption::new('A', "3"), McqOption::new('B', "4")],
            correct_answer: "B".to_string(),
            metadata: None,
        }),
        Question::Emq(EmqQuestion {
            item_id: "21".to_string(),
            title: "Question 21".to_string(),
            text: "Cyclical fever after Kenya".to_string(),
            html_content: None,
            options_id: "10".to_string(),
            options: options.clone(),
            reference_id: String::new(),
            correct_answer: "A".to_string(),
            shared_context: Some(
                "Tropical infections\nA. Plasmodium falciparum\nB. Dengue virus\nFor each patient, select one option."
                    .to_string(),
            ),
            parent_item_id: None,
            metadata: None,
        }),
        Question::Emq(EmqQuestion {
            item_id: "22".to_string(),
            title: "Question 22".to_string(),
            text: "Retro-orbital pain after Thailand".to_string(),
            html_content: None,
            options_id: "10".to_string(),
            options,
            reference_id: "10".to_string(),
            correct_answer: "B".to_string(),
            shared_context: None,
            parent_item_id: None,
            metadata: None,
        }),
        Question::Saq(SaqQuestion {
            item_id: "40_a".to_string(),
            title: "Question 40 (a)".to_string(),
            text: "(a) Name the diagnosis.".to_string(),
            html_content: None,
            sub_questions: vec![SubQuestion {
                part: "(a)".to_string(),
                question: "Name the diagnosis.".to_string(),
                marks: 2,
            }],
            answer_key: "Acute MI".to_string(),
            total_marks: 2,
            shared_context: Some("A 55-year-old with chest pain.".to_string()),
            parent_item_id: Some("40".to_string()),
            metadata: None,
        }),
        Question::Saq(SaqQuestion {
            item_id: "40_b".to_string(),
            title: "Question 40 (b)".to_string(),
            text: "(b) List two investigations.".to_string(),
            html_content: None,
            sub_questions: vec![SubQuestion {
                part: "(b)".to_string(),
                question: "List two investigations.".to_string(),
                marks: 4,
            }],
            answer_key: "ECG; troponin".to_string(),
            total_marks: 4,
            shared_context: Some("A 55-year-old with chest pain.".to_string()),
            parent_item_id: Some("40".to_string()),
            metadata: None,
        }),
    ]
}

#[test]
fn every_generated_document_is_well_formed() {
    let package = generate_package(&sample_questions(), "Mock Exam & Revision").unwrap();
    assert_well_formed("manifest", &package.manifest);
    assert_well_formed("assessment", &package.assessment);
    for item in &package.items {
        assert_well_formed(&item.filename, &item.xml);
    }
}

#[test]
fn all_references_resolve_to_produced_filenames() {
    let package = generate_package(&sample_questions(), "Mock Exam").unwrap();
    let filenames: BTreeSet<&str> = package
        .items
        .iter()
        .map(|item| item.filename.as_str())
        .collect();
    let identifiers: BTreeSet<&str> = package
        .items
        .iter()
        .map(|item| item.identifier.as_str())
        .collect();

    let href = Regex::new(r#"href="([^"]+)""#).unwrap();
    for document in [&package.manifest, &package.assessment] {
        for caps in href.captures_iter(document) {
            let target = &caps[1];
            assert!(
                target == "assessment.xml" || filenames.contains(target),
                "unresolved href {target}"
            );
        }
    }

    let identifierref = Regex::new(r#"identifierref="([^"]+)""#).unwrap();
    for caps in identifierref.captures_iter(&package.manifest) {
        assert!(identifiers.contains(&caps[1]), "unresolved dependency {}", &caps[1]);
    }
}

#[test]
fn package_has_one_stimulus_and_one_context_document() {
    let package = generate_package(&sample_questions(), "Mock Exam").unwrap();
    let stimuli = package
        .items
        .iter()
        .filter(|item| item.identifier.starts_with("stimulus_10_"))
        .count();
    let contexts = package
        .items
        .iter()
        .filter(|item| item.identifier.starts_with("context_40_"))
        .count();
    assert_eq!(stimuli, 1);
    assert_eq!(contexts, 1);
    // 5 question items + 2 shared documents.
    assert_eq!(package.items.len(), 7);
}

#[test]
fn sections_follow_the_stimulus_groups() {
    let package = generate_package(&sample_questions(), "Mock Exam").unwrap();
    // EMQ group, SAQ group, and the orphan MCQ section.
    assert_eq!(package.assessment.matches("<assessmentSection").count(), 3);
    assert_eq!(package.assessment.matches(r#"category="stimulus""#).count(), 2);
    assert_eq!(package.assessment.matches(r#"fixed="true""#).count(), 2);
}

#[test]
fn repeated_generation_mints_fresh_identifiers() {
    let questions = sample_questions();
    let first = generate_package(&questions, "Mock Exam").unwrap();
    let second = generate_package(&questions, "Mock Exam").unwrap();
    let first_ids: BTreeSet<String> = first.items.iter().map(|i| i.identifier.clone()).collect();
    let second_ids: BTreeSet<String> = second.items.iter().map(|i| i.identifier.clone()).collect();
    assert!(first_ids.is_disjoint(&second_ids));
}
