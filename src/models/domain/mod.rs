pub mod evaluation;
pub mod generation_run;
pub mod question;
pub use evaluation::{DegradedReason, EvaluationOutcome, EvaluationResult};
pub use generation_run::GenerationRun;
pub use question::{ChoiceLabel, Choices, NewQuestion, QuestionKind, QuestionRecord};
