use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    models::domain::{DegradedReason, EvaluationOutcome, EvaluationResult},
    services::{
        model_service::{CompletionRequest, ModelClient, ModelSettings},
        prompt_builder::answer_evaluation_prompt,
    },
};

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    score: Value,
    feedback: String,
}

/// Scores free-text answers with the model. Never returns an error: a failed
/// call or an unreadable reply becomes a degraded zero-score outcome.
pub struct EvaluationService {
    model: Arc<dyn ModelClient>,
    settings: ModelSettings,
}

impl EvaluationService {
    pub fn new(model: Arc<dyn ModelClient>, settings: ModelSettings) -> Self {
        Self { model, settings }
    }

    pub async fn evaluate(&self, question: &str, expected: &str, student: &str) -> EvaluationOutcome {
        let prompt = answer_evaluation_prompt(question, expected, student);
        let reply = match self
            .model
            .complete(CompletionRequest::new(&self.settings, prompt))
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("Evaluation degraded, model call failed: {}", e);
                return EvaluationOutcome::degraded(DegradedReason::ModelUnavailable(e.to_string()));
            }
        };

        match parse_evaluation_reply(&reply) {
            Some(result) => EvaluationOutcome::Scored(result),
            None => {
                log::warn!(
                    "Evaluation degraded, unparseable reply ({} chars)",
                    reply.len()
                );
                EvaluationOutcome::degraded(DegradedReason::UnparseableReply)
            }
        }
    }
}

/// Reads a `{"score": .., "feedback": ..}` object. A surrounding Markdown code
/// fence is tolerated; any other text around the object is not.
pub fn parse_evaluation_reply(reply: &str) -> Option<EvaluationResult> {
    let body = strip_code_fence(reply.trim());
    let raw: RawEvaluation = serde_json::from_str(body).ok()?;

    let score = match raw.score {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    Some(EvaluationResult::new(score, &raw.feedback))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the info string (e.g. "json") on the opening line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
