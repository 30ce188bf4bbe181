use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use futures::TryStreamExt;

use crate::{
    app_state::AppState,
    errors::{AppError, AppResult},
    middleware::get_request_id,
    models::dto::response::{GenerateQuestionsResponse, MessageResponse, QuestionDto, RunDto},
    services::text_extractor::{is_docx_filename, SpooledUpload},
};

const FILE_FIELD: &str = "file";

#[post("/generate-questions")]
pub async fn generate_questions(
    state: web::Data<Arc<AppState>>,
    req: HttpRequest,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let (filename, upload) = read_docx_upload(&mut payload, state.config.max_upload_bytes).await?;
    log::info!(
        "[{}] Generating questions from '{}' ({} bytes)",
        get_request_id(&req).unwrap_or_default(),
        filename,
        upload.len()
    );

    let text = web::block(move || upload.extract_text())
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))??;

    let saved_id = state.quiz_service.generate_from_text(&text).await?;
    Ok(HttpResponse::Ok().json(GenerateQuestionsResponse { saved_id }))
}

/// Spools the `file` field to a temporary file after checking its name.
async fn read_docx_upload(
    payload: &mut Multipart,
    limit: usize,
) -> AppResult<(String, SpooledUpload)> {
    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        if !is_docx_filename(&filename) {
            return Err(AppError::UnsupportedFormat(
                "Only .docx files allowed".to_string(),
            ));
        }

        let mut upload = SpooledUpload::new(limit)?;
        while let Some(chunk) = field.try_next().await? {
            upload.write_chunk(&chunk)?;
        }
        return Ok((filename, upload));
    }

    Err(AppError::ValidationError(format!(
        "Missing '{}' field in upload",
        FILE_FIELD
    )))
}

#[get("/questions/{run_id}")]
pub async fn get_questions(
    state: web::Data<Arc<AppState>>,
    run_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let questions: Vec<QuestionDto> = state
        .quiz_service
        .list_questions(run_id.into_inner())
        .await?
        .into_iter()
        .map(QuestionDto::from)
        .collect();
    Ok(HttpResponse::Ok().json(questions))
}

#[get("/runs/{run_id}")]
pub async fn get_run(
    state: web::Data<Arc<AppState>>,
    run_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let (run, question_count) = state.quiz_service.get_run(run_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(RunDto::new(run, question_count)))
}

#[delete("/runs/{run_id}")]
pub async fn delete_run(
    state: web::Data<Arc<AppState>>,
    run_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let run_id = run_id.into_inner();
    state.quiz_service.delete_run(run_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Run {} deleted", run_id),
    }))
}
