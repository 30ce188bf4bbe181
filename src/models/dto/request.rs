use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EvaluateAnswerRequest {
    #[validate(length(min = 1, message = "Question prompt cannot be empty"))]
    pub prompt: String,

    #[validate(length(min = 1, message = "Expected answer cannot be empty"))]
    pub expected: String,

    // an empty answer is still scored (and will score 0)
    pub student: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_request_requires_prompt_and_expected() {
        let request = EvaluateAnswerRequest {
            prompt: String::new(),
            expected: "A".to_string(),
            student: "B".to_string(),
        };
        assert!(request.validate().is_err());

        let request = EvaluateAnswerRequest {
            prompt: "Q".to_string(),
            expected: "A".to_string(),
            student: String::new(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn evaluate_request_rejects_missing_fields() {
        let parsed = serde_json::from_str::<EvaluateAnswerRequest>(r#"{"prompt": "Q", "expected": "A"}"#);
        assert!(parsed.is_err());
    }
}
