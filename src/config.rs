use std::{env, time::Duration};

use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};

const PLACEHOLDER_API_KEY: &str = "model_api_key";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub runs_collection: String,
    pub questions_collection: String,
    pub counters_collection: String,
    pub mongo_max_pool_size: u32,
    pub mongo_min_pool_size: u32,
    pub mongo_timeout_secs: u64,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: Option<String>,
    pub model_api_key: SecretString,
    pub model_api_base: String,
    pub generation_model: String,
    pub generation_temperature: f32,
    pub evaluation_model: String,
    pub evaluation_temperature: f32,
    pub model_timeout_secs: u64,
    pub model_max_retries: u32,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let generation_model =
            env::var("GENERATION_MODEL").unwrap_or_else(|_| "llama3-8b-8192".to_string());

        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "qnabase".to_string()),
            runs_collection: env::var("RUNS_COLLECTION")
                .unwrap_or_else(|_| "generation_runs".to_string()),
            questions_collection: env::var("QUESTIONS_COLLECTION")
                .unwrap_or_else(|_| "questions".to_string()),
            counters_collection: env::var("COUNTERS_COLLECTION")
                .unwrap_or_else(|_| "counters".to_string()),
            mongo_max_pool_size: parse_env("MONGO_MAX_POOL_SIZE", 10),
            mongo_min_pool_size: parse_env("MONGO_MIN_POOL_SIZE", 2),
            mongo_timeout_secs: parse_env("MONGO_TIMEOUT_SECS", 5),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            web_server_port: parse_env("WEB_SERVER_PORT", 8001),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok(),
            model_api_key: SecretString::from(
                env::var("MODEL_API_KEY")
                    .or_else(|_| env::var("GROQ_API_KEY"))
                    .unwrap_or_else(|_| PLACEHOLDER_API_KEY.to_string()),
            ),
            model_api_base: env::var("MODEL_API_BASE")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            evaluation_model: env::var("EVALUATION_MODEL")
                .unwrap_or_else(|_| generation_model.clone()),
            generation_model,
            generation_temperature: parse_env("GENERATION_TEMPERATURE", 0.7),
            evaluation_temperature: parse_env("EVALUATION_TEMPERATURE", 0.2),
            model_timeout_secs: parse_env("MODEL_TIMEOUT_SECS", 60),
            model_max_retries: parse_env("MODEL_MAX_RETRIES", 0),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
        }
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        let api_key = self.model_api_key.expose_secret();
        if api_key.is_empty() || api_key == PLACEHOLDER_API_KEY {
            return Err(AppError::ValidationError(
                "MODEL_API_KEY is not set".to_string(),
            ));
        }

        for (name, value) in [
            ("GENERATION_TEMPERATURE", self.generation_temperature),
            ("EVALUATION_TEMPERATURE", self.evaluation_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(AppError::ValidationError(format!(
                    "{} must be between 0 and 2, got {}",
                    name, value
                )));
            }
        }

        if self.mongo_max_pool_size == 0 || self.mongo_timeout_secs == 0 {
            return Err(AppError::ValidationError(
                "MONGO_MAX_POOL_SIZE and MONGO_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        if self.model_timeout_secs == 0 {
            return Err(AppError::ValidationError(
                "MODEL_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
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
            model_api_key: SecretString::from("test_model_key".to_string()),
            model_api_base: "http://localhost:9999/v1".to_string(),
            generation_model: "test-model".to_string(),
            generation_temperature: 0.7,
            evaluation_model: "test-model".to_string(),
            evaluation_temperature: 0.2,
            model_timeout_secs: 5,
            model_max_retries: 0,
            max_upload_bytes: 1024 * 1024,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
