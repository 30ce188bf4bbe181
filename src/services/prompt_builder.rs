use crate::constants::prompts::{
    EVALUATION_INSTRUCTIONS, EVALUATION_SYSTEM_PROMPT, GENERATION_INSTRUCTIONS,
    GENERATION_SYSTEM_PROMPT,
};

/// A system + user message pair sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

pub fn quiz_generation_prompt(document_text: &str) -> Prompt {
    Prompt {
        system: GENERATION_SYSTEM_PROMPT.to_string(),
        user: format!("{}\n\nDocument:\n{}", GENERATION_INSTRUCTIONS, document_text),
    }
}

pub fn answer_evaluation_prompt(question: &str, expected: &str, student: &str) -> Prompt {
    Prompt {
        system: EVALUATION_SYSTEM_PROMPT.to_string(),
        user: format!(
            "Question:\n{}\n\nExpected Answer:\n{}\n\nStudent's Answer:\n{}\n\n{}",
            question, expected, student, EVALUATION_INSTRUCTIONS
        ),
    }
}
