pub mod error;
pub mod metadata;
pub mod mode;
pub mod question;

pub use error::ParseError;
pub use metadata::{QuestionMetadata, UsageStatistics};
pub use mode::ParseMode;
pub use question::{
    EmqOption, EmqQuestion, McqOption, McqQuestion, Question, QuestionKind, SaqQuestion,
    SubQuestion,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_enum_is_type_tagged() {
        let question = Question::Mcq(McqQuestion {
            item_id: "1".to_string(),
            title: "Question 1".to_string(),
            text: "What is 2+2?".to_string(),
            html_content: None,
            options: vec![
                McqOption::new('A', "3"),
                McqOption::new('B', "4"),
            ],
            correct_answer: "B".to_string(),
            metadata: None,
        });
        let json = serde_json::to_value(&question).expect("serialize question");
        assert_eq!(json["type"], "MCQ");
        assert_eq!(json["itemId"], "1");
        let round: Question = serde_json::from_value(json).expect("deserialize question");
        assert_eq!(round.kind(), QuestionKind::Mcq);
        assert_eq!(round.item_id(), "1");
    }

    #[test]
    fn saq_round_trips_sub_questions() {
        let question = Question::Saq(SaqQuestion {
            item_id: "7_a".to_string(),
            title: "Question 7 (a)".to_string(),
            text: "(a) Name the structure.".to_string(),
            html_content: None,
            sub_questions: vec![SubQuestion {
                part: "(a)".to_string(),
                question: "Name the structure.".to_string(),
                marks: 2,
            }],
            answer_key: "(a) The mitral valve".to_string(),
            total_marks: 2,
            shared_context: Some("A 54-year-old presents with dyspnoea.".to_string()),
            parent_item_id: Some("7".to_string()),
            metadata: None,
        });
        let json = serde_json::to_string(&question).expect("serialize question");
        let round: Question = serde_json::from_str(&json).expect("deserialize question");
        match round {
            Question::Saq(saq) => {
                assert_eq!(saq.total_marks, 2);
                assert_eq!(saq.parent_item_id.as_deref(), Some("7"));
            }
            other => panic!("expected SAQ, got {:?}", other.kind()),
        }
    }
}
