use serde::{Deserialize, Serialize};

pub const MAX_SCORE: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EvaluationResult {
    pub score: f64,
    pub feedback: String,
}

impl EvaluationResult {
    /// Clamps the score into `0..=MAX_SCORE`; NaN becomes 0.
    pub fn new(score: f64, feedback: &str) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, MAX_SCORE)
        };

        EvaluationResult {
            score,
            feedback: feedback.trim().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DegradedReason {
    ModelUnavailable(String),
    UnparseableReply,
}

impl DegradedReason {
    pub fn feedback(&self) -> &'static str {
        match self {
            DegradedReason::ModelUnavailable(_) => {
                "Evaluation could not be completed: the model service is unavailable."
            }
            DegradedReason::UnparseableReply => "Could not parse model response.",
        }
    }
}

/// Result of scoring one answer. Both variants are valid outcomes; a degraded
/// one always carries a zero score.
#[derive(Clone, Debug, PartialEq)]
pub enum EvaluationOutcome {
    Scored(EvaluationResult),
    Degraded {
        result: EvaluationResult,
        reason: DegradedReason,
    },
}

impl EvaluationOutcome {
    pub fn degraded(reason: DegradedReason) -> Self {
        EvaluationOutcome::Degraded {
            result: EvaluationResult::new(0.0, reason.feedback()),
            reason,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, EvaluationOutcome::Degraded { .. })
    }

    pub fn result(&self) -> &EvaluationResult {
        match self {
            EvaluationOutcome::Scored(result) => result,
            EvaluationOutcome::Degraded { result, .. } => result,
        }
    }

    pub fn into_result(self) -> EvaluationResult {
        match self {
            EvaluationOutcome::Scored(result) => result,
            EvaluationOutcome::Degraded { result, .. } => result,
        }
    }
}
