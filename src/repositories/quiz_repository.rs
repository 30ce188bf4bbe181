use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{
        ChoiceLabel, Choices, GenerationRun, NewQuestion, QuestionKind, QuestionRecord,
    },
};

/// Storage for generation runs and the questions parsed from them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Stores a new run under a fresh, increasing identifier.
    async fn create_run(&self, source_text: &str, raw_output: &str) -> AppResult<GenerationRun>;
    async fn find_run(&self, run_id: i64) -> AppResult<Option<GenerationRun>>;
    /// Stores `questions` for `run_id`, keeping their order.
    async fn attach_questions(
        &self,
        run_id: i64,
        questions: Vec<NewQuestion>,
    ) -> AppResult<Vec<QuestionRecord>>;
    /// Questions of a run in creation order; empty for an unknown run.
    async fn list_questions(&self, run_id: i64) -> AppResult<Vec<QuestionRecord>>;
    /// Deletes the run and its questions. Returns false if there was no such run.
    async fn delete_run(&self, run_id: i64) -> AppResult<bool>;
    async fn health_check(&self) -> AppResult<()>;
}

const RUN_SEQUENCE: &str = "generation_runs";
const QUESTION_SEQUENCE: &str = "questions";

#[derive(Debug, Serialize, Deserialize)]
struct Counter {
    #[serde(rename = "_id")]
    id: String,
    seq: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RunDocument {
    id: i64,
    source_text: String,
    raw_output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl From<GenerationRun> for RunDocument {
    fn from(run: GenerationRun) -> Self {
        RunDocument {
            id: run.id,
            source_text: run.source_text,
            raw_output: run.raw_output,
            created_at: run.created_at,
        }
    }
}

impl From<RunDocument> for GenerationRun {
    fn from(doc: RunDocument) -> Self {
        GenerationRun {
            id: doc.id,
            source_text: doc.source_text,
            raw_output: doc.raw_output,
            created_at: doc.created_at,
        }
    }
}

/// Flat row layout: `mcq` rows use the option and correct_option columns,
/// `short` rows use answer_text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct QuestionDocument {
    pub id: i64,
    pub run_id: i64,
    pub position: i32,
    pub question_type: String,
    pub question_text: String,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
    pub option4: Option<String>,
    pub correct_option: Option<String>,
    pub answer_text: Option<String>,
}

impl QuestionDocument {
    pub(crate) fn new(record: &QuestionRecord, position: i32) -> Self {
        let mut document = QuestionDocument {
            id: record.id,
            run_id: record.run_id,
            position,
            question_type: record.kind.type_name().to_string(),
            question_text: record.question.clone(),
            option1: None,
            option2: None,
            option3: None,
            option4: None,
            correct_option: None,
            answer_text: None,
        };

        match &record.kind {
            QuestionKind::MultipleChoice { choices, correct } => {
                document.option1 = Some(choices.a.clone());
                document.option2 = Some(choices.b.clone());
                document.option3 = Some(choices.c.clone());
                document.option4 = Some(choices.d.clone());
                document.correct_option = Some(correct.to_string());
            }
            QuestionKind::ShortAnswer { answer } => {
                document.answer_text = Some(answer.clone());
            }
        }

        document
    }
}

impl TryFrom<QuestionDocument> for QuestionRecord {
    type Error = AppError;

    fn try_from(doc: QuestionDocument) -> Result<Self, Self::Error> {
        let corrupt = |what: &str| {
            AppError::InternalError(format!("Question {} is corrupt: {}", doc.id, what))
        };

        let kind = match doc.question_type.as_str() {
            "mcq" => {
                let (Some(a), Some(b), Some(c), Some(d)) =
                    (&doc.option1, &doc.option2, &doc.option3, &doc.option4)
                else {
                    return Err(corrupt("multiple-choice row without four options"));
                };
                let correct = doc
                    .correct_option
                    .as_deref()
                    .and_then(ChoiceLabel::parse)
                    .ok_or_else(|| corrupt("invalid correct_option"))?;
                QuestionKind::MultipleChoice {
                    choices: Choices::new(a, b, c, d),
                    correct,
                }
            }
            "short" => {
                let answer = doc
                    .answer_text
                    .as_deref()
                    .filter(|a| !a.trim().is_empty())
                    .ok_or_else(|| corrupt("short-answer row without answer"))?;
                QuestionKind::ShortAnswer {
                    answer: answer.to_string(),
                }
            }
            other => return Err(corrupt(&format!("unknown question_type '{}'", other))),
        };

        Ok(QuestionRecord {
            id: doc.id,
            run_id: doc.run_id,
            question: doc.question_text,
            kind,
        })
    }
}

pub struct MongoQuizRepository {
    runs: Collection<RunDocument>,
    questions: Collection<QuestionDocument>,
    counters: Collection<Counter>,
    db: Database,
}

impl MongoQuizRepository {
    pub fn new(db: &Database, config: &Config) -> Self {
        Self {
            runs: db.collection(&config.runs_collection),
            questions: db.collection(&config.questions_collection),
            counters: db.collection(&config.counters_collection),
            db: db.clone(),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for generation run and question collections");

        let id_unique = || {
            IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("id_unique".to_string())
                        .build(),
                )
                .build()
        };
        self.runs.create_index(id_unique()).await?;
        self.questions.create_index(id_unique()).await?;

        let by_run = IndexModel::builder()
            .keys(doc! { "run_id": 1, "position": 1 })
            .options(IndexOptions::builder().name("run_position".to_string()).build())
            .build();
        self.questions.create_index(by_run).await?;

        log::info!("Successfully created indexes for generation run and question collections");
        Ok(())
    }

    /// Reserves `count` consecutive ids from `sequence` and returns the first.
    async fn reserve_ids(&self, sequence: &str, count: i64) -> AppResult<i64> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let counter = self
            .counters
            .find_one_and_update(doc! { "_id": sequence }, doc! { "$inc": { "seq": count } })
            .with_options(options)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!("Counter '{}' could not be advanced", sequence))
            })?;

        Ok(counter.seq - count + 1)
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn create_run(&self, source_text: &str, raw_output: &str) -> AppResult<GenerationRun> {
        let id = self.reserve_ids(RUN_SEQUENCE, 1).await?;
        let run = GenerationRun::new(id, source_text, raw_output);

        self.runs.insert_one(RunDocument::from(run.clone())).await?;
        Ok(run)
    }

    async fn find_run(&self, run_id: i64) -> AppResult<Option<GenerationRun>> {
        let run = self.runs.find_one(doc! { "id": run_id }).await?;
        Ok(run.map(GenerationRun::from))
    }

    async fn attach_questions(
        &self,
        run_id: i64,
        questions: Vec<NewQuestion>,
    ) -> AppResult<Vec<QuestionRecord>> {
        if questions.is_empty() {
            return Ok(Vec::new());
        }

        let first_id = self
            .reserve_ids(QUESTION_SEQUENCE, questions.len() as i64)
            .await?;
        let records: Vec<QuestionRecord> = questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| QuestionRecord::from_new(first_id + i as i64, run_id, q))
            .collect();
        let documents: Vec<QuestionDocument> = records
            .iter()
            .enumerate()
            .map(|(position, record)| QuestionDocument::new(record, position as i32))
            .collect();

        // one batch, so readers never see a prefix of another batch
        self.questions.insert_many(&documents).await?;
        Ok(records)
    }

    async fn list_questions(&self, run_id: i64) -> AppResult<Vec<QuestionRecord>> {
        let find_options = FindOptions::builder()
            .sort(doc! { "position": 1 })
            .build();

        let cursor = self
            .questions
            .find(doc! { "run_id": run_id })
            .with_options(find_options)
            .await?;
        let documents: Vec<QuestionDocument> = cursor.try_collect().await?;

        documents.into_iter().map(QuestionRecord::try_from).collect()
    }

    async fn delete_run(&self, run_id: i64) -> AppResult<bool> {
        let questions = self.questions.delete_many(doc! { "run_id": run_id }).await?;
        let runs = self.runs.delete_one(doc! { "id": run_id }).await?;

        log::info!(
            "Deleted run {} ({} questions)",
            run_id,
            questions.deleted_count
        );
        Ok(runs.deleted_count > 0)
    }

    async fn health_check(&self) -> AppResult<()> {
        self.db.health_check().await
    }
}
