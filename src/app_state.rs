use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{MongoQuizRepository, QuizRepository},
    services::{
        model_service::ModelSettings, EvaluationService, ModelClient, OpenAiModelClient,
        QuizService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub evaluation_service: Arc<EvaluationService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db, &config));
        quiz_repository.ensure_indexes().await?;

        let model = Arc::new(OpenAiModelClient::new(&config));

        Ok(Self::from_parts(config, quiz_repository, model))
    }

    /// Wires the services over any store and model client.
    pub fn from_parts(
        config: Config,
        repository: Arc<dyn QuizRepository>,
        model: Arc<dyn ModelClient>,
    ) -> Self {
        let quiz_service = Arc::new(QuizService::new(
            repository,
            Arc::clone(&model),
            ModelSettings::generation(&config),
        ));
        let evaluation_service = Arc::new(EvaluationService::new(
            model,
            ModelSettings::evaluation(&config),
        ));

        Self {
            quiz_service,
            evaluation_service,
            config: Arc::new(config),
        }
    }
}
