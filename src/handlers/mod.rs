pub mod evaluation_handler;
pub mod health_handler;
pub mod quiz_handler;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::errors::AppError;

pub use evaluation_handler::evaluate_answer;
pub use health_handler::{health_check, health_check_live, health_check_ready, root};
pub use quiz_handler::{delete_run, generate_questions, get_questions, get_run};

/// Registers every route. The caller wraps the app in `NormalizePath::trim()`
/// so the trailing-slash paths used by the web application match too.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(root)
        .service(health_check)
        .service(health_check_live)
        .service(health_check_ready)
        .service(generate_questions)
        .service(get_questions)
        .service(get_run)
        .service(delete_run)
        .service(evaluate_answer);
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(err.to_string()).into()
}
