use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{GenerationRun, QuestionRecord},
    repositories::QuizRepository,
    services::{
        model_service::{CompletionRequest, ModelClient, ModelSettings},
        prompt_builder::quiz_generation_prompt,
        quiz_parser::{parse_quiz, EXPECTED_MULTIPLE_CHOICE, EXPECTED_SHORT_ANSWER},
    },
};

/// Turns document text into a stored quiz and serves stored quizzes back.
pub struct QuizService {
    repository: Arc<dyn QuizRepository>,
    model: Arc<dyn ModelClient>,
    settings: ModelSettings,
}

impl QuizService {
    pub fn new(
        repository: Arc<dyn QuizRepository>,
        model: Arc<dyn ModelClient>,
        settings: ModelSettings,
    ) -> Self {
        Self {
            repository,
            model,
            settings,
        }
    }

    /// Generates, parses and stores a quiz for `document_text`.
    ///
    /// The returned run id only reaches the caller once every parsed question
    /// is stored. A model failure stores nothing. A reply with fewer questions
    /// than requested is still stored, possibly with none at all.
    pub async fn generate_from_text(&self, document_text: &str) -> AppResult<i64> {
        if document_text.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Document contains no text".to_string(),
            ));
        }

        let prompt = quiz_generation_prompt(document_text);
        let raw_output = self
            .model
            .complete(CompletionRequest::new(&self.settings, prompt))
            .await
            .map_err(|e| {
                log::error!("Quiz generation failed: {}", e);
                AppError::from(e)
            })?;

        let run = self.repository.create_run(document_text, &raw_output).await?;

        let parsed = parse_quiz(&raw_output);
        if parsed.is_degraded() {
            log::warn!(
                "Run {} parsed {}/{} multiple-choice and {}/{} short-answer questions",
                run.id,
                parsed.multiple_choice_count(),
                EXPECTED_MULTIPLE_CHOICE,
                parsed.short_answer_count(),
                EXPECTED_SHORT_ANSWER
            );
        }

        match self
            .repository
            .attach_questions(run.id, parsed.into_questions())
            .await
        {
            Ok(records) => {
                log::info!("Run {} stored with {} questions", run.id, records.len());
                Ok(run.id)
            }
            Err(err) => {
                log::error!("Storing questions for run {} failed: {}", run.id, err);
                if let Err(cleanup) = self.repository.delete_run(run.id).await {
                    log::error!("Removing run {} failed: {}", run.id, cleanup);
                }
                Err(err)
            }
        }
    }

    pub async fn list_questions(&self, run_id: i64) -> AppResult<Vec<QuestionRecord>> {
        self.repository.list_questions(run_id).await
    }

    /// The run with the number of questions stored for it.
    pub async fn get_run(&self, run_id: i64) -> AppResult<(GenerationRun, usize)> {
        let run = self
            .repository
            .find_run(run_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Run with id '{}' not found", run_id)))?;
        let questions = self.repository.list_questions(run_id).await?;

        Ok((run, questions.len()))
    }

    pub async fn delete_run(&self, run_id: i64) -> AppResult<()> {
        if self.repository.delete_run(run_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Run with id '{}' not found",
                run_id
            )))
        }
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.repository.health_check().await
    }
}
