#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    io::{Cursor, Write},
    sync::Mutex,
};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::RwLock;
use zip::{write::SimpleFileOptions, ZipWriter};

use qnabase_server::{
    config::Config,
    errors::AppResult,
    models::domain::{GenerationRun, NewQuestion, QuestionRecord},
    repositories::QuizRepository,
    services::model_service::{CompletionRequest, ModelClient, ModelError},
};

#[derive(Default)]
struct Store {
    next_run_id: i64,
    next_question_id: i64,
    runs: HashMap<i64, GenerationRun>,
    questions: HashMap<i64, Vec<QuestionRecord>>,
}

/// In-memory `QuizRepository` with the same id and ordering rules as the
/// MongoDB store.
pub struct InMemoryQuizRepository {
    store: RwLock<Store>,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
        }
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn create_run(&self, source_text: &str, raw_output: &str) -> AppResult<GenerationRun> {
        let mut store = self.store.write().await;
        store.next_run_id += 1;
        let run = GenerationRun::new(store.next_run_id, source_text, raw_output);
        store.runs.insert(run.id, run.clone());
        Ok(run)
    }

    async fn find_run(&self, run_id: i64) -> AppResult<Option<GenerationRun>> {
        Ok(self.store.read().await.runs.get(&run_id).cloned())
    }

    async fn attach_questions(
        &self,
        run_id: i64,
        questions: Vec<NewQuestion>,
    ) -> AppResult<Vec<QuestionRecord>> {
        let mut store = self.store.write().await;
        let mut records = Vec::with_capacity(questions.len());
        for question in questions {
            store.next_question_id += 1;
            records.push(QuestionRecord::from_new(store.next_question_id, run_id, question));
        }
        store
            .questions
            .entry(run_id)
            .or_default()
            .extend(records.iter().cloned());
        Ok(records)
    }

    async fn list_questions(&self, run_id: i64) -> AppResult<Vec<QuestionRecord>> {
        Ok(self
            .store
            .read()
            .await
            .questions
            .get(&run_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_run(&self, run_id: i64) -> AppResult<bool> {
        let mut store = self.store.write().await;
        store.questions.remove(&run_id);
        Ok(store.runs.remove(&run_id).is_some())
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Replies with queued results in order and records every request.
pub struct ScriptedModelClient {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModelClient {
    pub fn new(replies: Vec<Result<String, ModelError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ModelError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ModelError::EmptyReply))
    }
}

pub fn test_config() -> Config {
    Config {
        mongo_conn_string: "mongodb://localhost:27017".to_string(),
        mongo_db_name: "qnabase-test".to_string(),
        runs_collection: "generation_runs".to_string(),
        questions_collection: "questions".to_string(),
        counters_collection: "counters".to_string(),
        mongo_max_pool_size: 10,
        mongo_min_pool_size: 2,
        mongo_timeout_secs: 5,
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 8001,
        cors_allowed_origin: None,
        model_api_key: SecretString::from("test-key".to_string()),
        model_api_base: "http://localhost:9".to_string(),
        generation_model: "test-model".to_string(),
        generation_temperature: 0.7,
        evaluation_model: "test-model".to_string(),
        evaluation_temperature: 0.2,
        model_timeout_secs: 5,
        model_max_retries: 0,
        max_upload_bytes: 1024 * 1024,
    }
}

/// Minimal .docx with one paragraph per entry.
pub fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .expect("start document part");
    writer
        .write_all(document.as_bytes())
        .expect("write document part");
    writer.finish().expect("finish docx").into_inner()
}
