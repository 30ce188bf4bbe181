use std::{future::Future, time::Duration};

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::{config::Config, services::prompt_builder::Prompt};

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("model service error: {0}")]
    Upstream(String),

    #[error("model returned an empty reply")]
    EmptyReply,
}

/// Model identifier and sampling temperature for one kind of call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
}

impl ModelSettings {
    pub fn new(model: &str, temperature: f32) -> Self {
        Self {
            model: model.to_string(),
            temperature,
        }
    }

    pub fn generation(config: &Config) -> Self {
        Self::new(&config.generation_model, config.generation_temperature)
    }

    pub fn evaluation(config: &Config) -> Self {
        Self::new(&config.evaluation_model, config.evaluation_temperature)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub settings: ModelSettings,
    pub prompt: Prompt,
}

impl CompletionRequest {
    pub fn new(settings: &ModelSettings, prompt: Prompt) -> Self {
        Self {
            settings: settings.clone(),
            prompt,
        }
    }
}

/// Text in, text out. Implementations must not interpret the reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ModelError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(0),
        }
    }

    pub fn with_retries(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (1-based), doubling each time.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Runs `call` until it succeeds or the policy is exhausted. Every attempt is
/// bounded by `timeout`.
pub async fn call_with_retry<F, Fut>(
    policy: RetryPolicy,
    timeout: Duration,
    mut call: F,
) -> Result<String, ModelError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, ModelError>>,
{
    let mut attempt = 0;
    loop {
        let result = match tokio::time::timeout(timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::Timeout(timeout)),
        };

        match result {
            Ok(reply) => return Ok(reply),
            Err(err) if attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "Model call failed ({}), retry {}/{} in {:?}",
                    err,
                    attempt,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    choices: Vec<ReplyChoice>,
}

#[derive(Debug, Deserialize)]
struct ReplyChoice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Chat-completions client for any OpenAI-compatible endpoint (Groq by default).
pub struct OpenAiModelClient {
    client: Client<OpenAIConfig>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl OpenAiModelClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.model_api_key.expose_secret())
            .with_api_base(&config.model_api_base);

        let retry = if config.model_max_retries == 0 {
            RetryPolicy::none()
        } else {
            RetryPolicy::with_retries(config.model_max_retries, Duration::from_millis(500))
        };

        Self {
            client: Client::with_config(openai_config),
            timeout: config.model_timeout(),
            retry,
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        let body = json!({
            "model": request.settings.model,
            "temperature": request.settings.temperature,
            "messages": [
                {"role": "system", "content": request.prompt.system},
                {"role": "user", "content": request.prompt.user}
            ]
        });

        let reply: ChatCompletionReply = self
            .client
            .chat()
            .create_byot(body)
            .await
            .map_err(|e| ModelError::Upstream(e.to_string()))?;

        extract_content(reply)
    }
}

fn extract_content(reply: ChatCompletionReply) -> Result<String, ModelError> {
    reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(ModelError::EmptyReply)
}

#[async_trait]
impl ModelClient for OpenAiModelClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ModelError> {
        log::debug!(
            "Calling model {} (temperature {})",
            request.settings.model,
            request.settings.temperature
        );
        call_with_retry(self.retry, self.timeout, || self.send(&request)).await
    }
}
