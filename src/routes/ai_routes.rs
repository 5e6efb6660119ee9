use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};

use super::{read_file_field, read_interview_form, read_resume_form, read_text_field};
use crate::dto::ai_dto::{InterviewQuestionsInput, JobDescriptionInput, SkillGapInput};
use crate::error::{Error, Result};
use crate::AppState;

/// Screens a resume without a candidate record; nothing is stored.
#[axum::debug_handler]
pub async fn evaluate_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let resume = read_resume_form(multipart).await?;
    let output = state.pipeline_service.evaluate_resume(resume).await?;
    Ok(Json(output))
}

#[axum::debug_handler]
pub async fn evaluate_interview(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let input = read_interview_form(multipart).await?;
    let output = state.pipeline_service.evaluate_interview(input).await?;
    Ok(Json(output))
}

#[axum::debug_handler]
pub async fn generate_job_description(
    State(state): State<AppState>,
    Json(payload): Json<JobDescriptionInput>,
) -> Result<impl IntoResponse> {
    let output = state.pipeline_service.generate_job_description(payload).await?;
    Ok(Json(output))
}

#[axum::debug_handler]
pub async fn generate_interview_questions(
    State(state): State<AppState>,
    Json(payload): Json<InterviewQuestionsInput>,
) -> Result<impl IntoResponse> {
    let output = state.pipeline_service.generate_interview_questions(payload).await?;
    Ok(Json(output))
}

/// Multipart form with a `resume` file and a `job_description` text field.
/// The result is returned only; nothing is stored on a candidate.
#[axum::debug_handler]
pub async fn analyze_skill_gap(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut resume = None;
    let mut job_description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "resume" => resume = Some(read_file_field(field).await?),
            "job_description" => job_description = read_text_field(field).await?,
            _ => {}
        }
    }

    let resume = resume.ok_or_else(|| Error::BadRequest("Resume file is required.".into()))?;
    let output = state
        .pipeline_service
        .analyze_skill_gap(SkillGapInput {
            resume,
            job_description: job_description.trim().to_string(),
        })
        .await?;
    Ok(Json(output))
}
