use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use super::{read_interview_form, read_resume_form};
use crate::dto::candidate_dto::ScheduleInterviewRequest;
use crate::error::Result;
use crate::models::user::CurrentUser;
use crate::AppState;

#[axum::debug_handler]
pub async fn screen_resume(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let resume = read_resume_form(multipart).await?;
    tracing::info!(user_id = %user.id, candidate_id = %id, "Resume screening requested");
    let candidate = state.pipeline_service.screen_resume(id, resume).await?;
    Ok(Json(candidate))
}

#[axum::debug_handler]
pub async fn analyze_interview(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let input = read_interview_form(multipart).await?;
    tracing::info!(user_id = %user.id, candidate_id = %id, "Interview analysis requested");
    let candidate = state.pipeline_service.analyze_interview(id, input).await?;
    Ok(Json(candidate))
}

#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleInterviewRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!(user_id = %user.id, candidate_id = %id, "Interview scheduling requested");
    let candidate = state.pipeline_service.schedule_interview(id, payload).await?;
    Ok(Json(candidate))
}
