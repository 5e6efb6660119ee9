pub mod ai_routes;
pub mod candidate_routes;
pub mod health;
pub mod pipeline_routes;

use axum::{
    extract::{
        multipart::{Field, MultipartError},
        DefaultBodyLimit, Multipart,
    },
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::dto::ai_dto::{InterviewAnalysisInput, DEFAULT_EVALUATION_METRICS};
use crate::error::{Error, Result};
use crate::middleware::{
    auth::{require_bearer_auth, AuthKeys},
    rate_limit::{limit_requests, RequestBudget},
};
use crate::models::document::SessionFile;
use crate::utils::upload::resolve_content_type;
use crate::AppState;

pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Public health check plus the authenticated, rate-limited `/api` surface.
pub fn app_router(state: AppState, keys: AuthKeys, budget: RequestBudget) -> Router {
    let api = Router::new()
        .route(
            "/api/candidates",
            get(candidate_routes::list_candidates).post(candidate_routes::add_candidate),
        )
        .route("/api/candidates/stats", get(candidate_routes::candidate_stats))
        .route(
            "/api/candidates/:id",
            get(candidate_routes::get_candidate).patch(candidate_routes::update_candidate),
        )
        .route("/api/candidates/:id/status", post(candidate_routes::update_status))
        .route(
            "/api/candidates/:id/resume-screening",
            post(pipeline_routes::screen_resume),
        )
        .route(
            "/api/candidates/:id/interview-analysis",
            post(pipeline_routes::analyze_interview),
        )
        .route(
            "/api/candidates/:id/interview-schedule",
            post(pipeline_routes::schedule_interview),
        )
        .route("/api/ai/resume-screening", post(ai_routes::evaluate_resume))
        .route("/api/ai/interview-analysis", post(ai_routes::evaluate_interview))
        .route("/api/ai/job-description", post(ai_routes::generate_job_description))
        .route(
            "/api/ai/interview-questions",
            post(ai_routes::generate_interview_questions),
        )
        .route("/api/ai/skill-gap", post(ai_routes::analyze_skill_gap))
        .layer(from_fn_with_state(budget, limit_requests))
        .layer(from_fn_with_state(keys, require_bearer_auth));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Buffers a multipart file field into a session-only upload.
pub(crate) async fn read_file_field(field: Field<'_>) -> Result<SessionFile> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = resolve_content_type(&file_name, field.content_type());
    let data = field.bytes().await.map_err(|e| {
        tracing::error!("Failed to read upload {}: {}", file_name, e);
        Error::BadRequest(e.to_string())
    })?;
    Ok(SessionFile::new(file_name, content_type, data))
}

pub(crate) async fn read_text_field(field: Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))
}

fn multipart_error(e: MultipartError) -> Error {
    tracing::error!("Failed to get next field: {}", e);
    Error::BadRequest(e.to_string())
}

/// Multipart form with a single `resume` file.
pub(crate) async fn read_resume_form(mut multipart: Multipart) -> Result<SessionFile> {
    let mut resume = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        if field_name == "resume" {
            resume = Some(read_file_field(field).await?);
        }
    }
    resume.ok_or_else(|| Error::BadRequest("Resume file is required.".into()))
}

/// Multipart form: `audio` file plus `transcript`, `job_description` and an
/// optional `evaluation_metrics` text field.
pub(crate) async fn read_interview_form(mut multipart: Multipart) -> Result<InterviewAnalysisInput> {
    let mut audio = None;
    let mut transcript = String::new();
    let mut job_description = String::new();
    let mut evaluation_metrics = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "audio" => audio = Some(read_file_field(field).await?),
            "transcript" => transcript = read_text_field(field).await?,
            "job_description" => job_description = read_text_field(field).await?,
            "evaluation_metrics" => evaluation_metrics = read_text_field(field).await?,
            other => tracing::debug!("Ignoring unexpected field {}", other),
        }
    }

    let audio = audio.ok_or_else(|| Error::BadRequest("Audio file is required.".into()))?;
    if evaluation_metrics.trim().is_empty() {
        evaluation_metrics = DEFAULT_EVALUATION_METRICS.to_string();
    }

    Ok(InterviewAnalysisInput {
        audio,
        transcript: transcript.trim().to_string(),
        job_description: job_description.trim().to_string(),
        evaluation_metrics: evaluation_metrics.trim().to_string(),
    })
}
