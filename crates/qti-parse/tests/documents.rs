use qti_model::{ParseError, ParseMode, Question, QuestionKind};
use qti_parse::{detect_parse_mode, parse_document};

const MCQ_DOC: &str = "\
Item ID: 1 A type: 4 options
What is 2+2?
A. 3
B. 4
C. 5
D. 6
Answer: B
Profile: <specialty>Mathematics

Item ID: 2 A type: 4 options
Which planet is closest to the sun?
A. Venus
B. Earth
C. Mercury
D. Mars
Answer: C
";

const EMQ_DOC: &str = "\
Item ID: 21 R type
Options ID: 10
Causes of fever in the returned traveller
A. Plasmodium falciparum
B. Dengue virus
C. Salmonella typhi
D. Rickettsia africae
For each patient below, select the most likely cause from the list of options above.
Each option may be used once, more than once, or not at all.
A traveller returns from Kenya with cyclical fever and thrombocytopenia.
Answer: A

Item ID: 22 R type
With reference to the previous Options ID: 10
Sudden high fever with retro-orbital pain after two weeks in Thailand.
Answer: B
";

const SAQ_DOC: &str = "\
Item ID: 40 Short Answer
A 55-year-old presents with crushing central chest pain.
(a) Name the most likely diagnosis. (2 marks)
Answer: (a) Acute myocardial infarction
(b) List two immediate investigations. (4 marks)
Answer: (b) ECG; troponin
";

#[test]
fn mcq_document_parses_both_items() {
    let questions = parse_document(MCQ_DOC, None, "week3_mcq.txt", None).expect("parse");
    assert_eq!(questions.len(), 2);
    let Question::Mcq(first) = &questions[0] else {
        panic!("expected MCQ");
    };
    assert_eq!(first.item_id, "1");
    assert_eq!(first.text, "What is 2+2?");
    assert_eq!(first.options.len(), 4);
    assert_eq!(first.correct_answer, "B");
    let metadata = first.metadata.as_ref().expect("metadata");
    assert_eq!(metadata.profile.get("specialty").map(String::as_str), Some("Mathematics"));
    assert!(questions[1].metadata().is_none());
}

#[test]
fn emq_reference_item_inherits_the_shared_set() {
    let questions = parse_document(EMQ_DOC, None, "emq_block.txt", None).expect("parse");
    assert_eq!(questions.len(), 2);
    let (Question::Emq(first), Question::Emq(second)) = (&questions[0], &questions[1]) else {
        panic!("expected EMQ records");
    };
    assert_eq!(first.options_id, "10");
    assert_eq!(first.options.len(), 4);
    assert_eq!(second.reference_id, "10");
    assert_eq!(second.options, first.options);
    assert_eq!(second.shared_context, first.shared_context);
    assert_eq!(second.correct_answer, "B");
}

#[test]
fn saq_marks_survive_the_split() {
    let questions = parse_document(SAQ_DOC, None, "saq_week1.txt", None).expect("parse");
    assert_eq!(questions.len(), 2);
    let total: u32 = questions
        .iter()
        .map(|q| match q {
            Question::Saq(saq) => saq.total_marks,
            _ => panic!("expected SAQ"),
        })
        .sum();
    assert_eq!(total, 6);
    assert_eq!(questions[0].item_id(), "40_a");
    assert_eq!(questions[1].item_id(), "40_b");
}

#[test]
fn mixed_document_dispatches_per_item() {
    let mixed = format!("{MCQ_DOC}\n{EMQ_DOC}\n{SAQ_DOC}");
    assert_eq!(detect_parse_mode(&mixed, ""), ParseMode::Mixed);

    let questions = parse_document(&mixed, None, "final_exam.txt", None).expect("parse");
    let kinds: Vec<QuestionKind> = questions.iter().map(Question::kind).collect();
    assert_eq!(
        kinds,
        vec![
            QuestionKind::Mcq,
            QuestionKind::Mcq,
            QuestionKind::Emq,
            QuestionKind::Emq,
            QuestionKind::Saq,
            QuestionKind::Saq,
        ]
    );
}

#[test]
fn document_without_items_fails() {
    let err = parse_document("hello world", None, "notes.txt", None).unwrap_err();
    assert!(matches!(err, ParseError::NoItems));
}
