pub mod evaluation_service;
pub mod model_service;
pub mod prompt_builder;
pub mod quiz_parser;
pub mod quiz_service;
pub mod text_extractor;

pub use evaluation_service::EvaluationService;
pub use model_service::{ModelClient, OpenAiModelClient};
pub use quiz_service::QuizService;
