use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    Choices, EvaluationResult, GenerationRun, QuestionKind, QuestionRecord,
};

#[derive(Debug, Serialize)]
pub struct GenerateQuestionsResponse {
    pub saved_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoicesDto {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl From<Choices> for ChoicesDto {
    fn from(choices: Choices) -> Self {
        ChoicesDto {
            a: choices.a,
            b: choices.b,
            c: choices.c,
            d: choices.d,
        }
    }
}

/// Flat question shape consumed by the web application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionDto {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: &'static str,
    pub question: String,
    pub choices: Option<ChoicesDto>,
    pub correct_option: Option<String>,
    pub answer: Option<String>,
}

impl From<QuestionRecord> for QuestionDto {
    fn from(record: QuestionRecord) -> Self {
        let question_type = record.kind.type_name();
        let (choices, correct_option, answer) = match record.kind {
            QuestionKind::MultipleChoice { choices, correct } => {
                (Some(choices.into()), Some(correct.to_string()), None)
            }
            QuestionKind::ShortAnswer { answer } => (None, None, Some(answer)),
        };

        QuestionDto {
            id: record.id,
            question_type,
            question: record.question,
            choices,
            correct_option,
            answer,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunDto {
    pub id: i64,
    pub source_text: String,
    pub raw_output: String,
    pub question_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RunDto {
    pub fn new(run: GenerationRun, question_count: usize) -> Self {
        RunDto {
            id: run.id,
            source_text: run.source_text,
            raw_output: run.raw_output,
            question_count,
            created_at: run.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub score: f64,
    pub feedback: String,
}

impl From<EvaluationResult> for EvaluationResponse {
    fn from(result: EvaluationResult) -> Self {
        EvaluationResponse {
            score: result.score,
            feedback: result.feedback,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{ChoiceLabel, NewQuestion};

    #[test]
    fn mcq_record_maps_to_flat_dto() {
        let record = QuestionRecord::from_new(
            1,
            9,
            NewQuestion::multiple_choice(
                "What does photosynthesis convert?",
                Choices::new("Heat", "Light", "Sound", "Mass"),
                ChoiceLabel::B,
            ),
        );

        let json = serde_json::to_value(QuestionDto::from(record)).unwrap();
        assert_eq!(json["type"], "mcq");
        assert_eq!(json["choices"]["b"], "Light");
        assert_eq!(json["correct_option"], "b");
        assert!(json["answer"].is_null());
    }

    #[test]
    fn short_record_maps_to_flat_dto() {
        let record = QuestionRecord::from_new(
            2,
            9,
            NewQuestion::short_answer("Explain photosynthesis briefly.", "Light to energy.").unwrap(),
        );

        let json = serde_json::to_value(QuestionDto::from(record)).unwrap();
        assert_eq!(json["type"], "short");
        assert!(json["choices"].is_null());
        assert!(json["correct_option"].is_null());
        assert_eq!(json["answer"], "Light to energy.");
    }

    #[test]
    fn run_dto_reports_question_count() {
        let dto = RunDto::new(GenerationRun::new(3, "text", "reply"), 10);
        assert_eq!(dto.id, 3);
        assert_eq!(dto.question_count, 10);
    }
}
