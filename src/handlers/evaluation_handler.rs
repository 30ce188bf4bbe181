use std::sync::Arc;

use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{request::EvaluateAnswerRequest, response::EvaluationResponse},
};

/// Always answers 200 for a well-formed request. Model trouble shows up as a
/// zero score with explanatory feedback.
#[post("/evaluate-answer")]
pub async fn evaluate_answer(
    state: web::Data<Arc<AppState>>,
    request: web::Json<EvaluateAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let outcome = state
        .evaluation_service
        .evaluate(&request.prompt, &request.expected, &request.student)
        .await;
    Ok(HttpResponse::Ok().json(EvaluationResponse::from(outcome.into_result())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        repositories::quiz_repository::MockQuizRepository,
        services::model_service::{MockModelClient, ModelError},
    };
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    async fn call_with_model(
        model: MockModelClient,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let state = web::Data::new(Arc::new(AppState::from_parts(
            Config::test_config(),
            Arc::new(MockQuizRepository::new()),
            Arc::new(model),
        )));
        let app =
            test::init_service(App::new().app_data(state).service(evaluate_answer)).await;

        let req = test::TestRequest::post()
            .uri("/evaluate-answer")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        (status, test::read_body_json(resp).await)
    }

    fn request_body() -> serde_json::Value {
        json!({
            "prompt": "Explain photosynthesis briefly.",
            "expected": "It converts light energy into chemical energy.",
            "student": "Plants turn light into food."
        })
    }

    #[actix_web::test]
    async fn test_scored_reply() {
        let mut model = MockModelClient::new();
        model
            .expect_complete()
            .returning(|_| Ok(r#"{"score": 4, "feedback": "Good"}"#.to_string()));

        let (status, body) = call_with_model(model, request_body()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 4.0);
        assert_eq!(body["feedback"], "Good");
    }

    #[actix_web::test]
    async fn test_free_text_reply_degrades_to_zero() {
        let mut model = MockModelClient::new();
        model
            .expect_complete()
            .returning(|_| Ok("Nice work! 4 out of 5.".to_string()));

        let (status, body) = call_with_model(model, request_body()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 0.0);
        assert!(!body["feedback"].as_str().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_model_outage_still_answers_ok() {
        let mut model = MockModelClient::new();
        model
            .expect_complete()
            .returning(|_| Err(ModelError::Upstream("connection refused".into())));

        let (status, body) = call_with_model(model, request_body()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 0.0);
    }

    #[actix_web::test]
    async fn test_empty_prompt_is_rejected() {
        let mut model = MockModelClient::new();
        model.expect_complete().never();

        let (status, body) = call_with_model(
            model,
            json!({"prompt": "", "expected": "A", "student": "B"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
