use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::candidate_dto::{
    AddCandidateRequest, CandidateStatsResponse, UpdateCandidateRequest, UpdateStatusRequest,
};
use crate::error::{Error, Result};
use crate::models::candidate::CandidatePatch;
use crate::models::user::CurrentUser;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_candidates(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let candidates = state.store.list_candidates().await?;
    Ok(Json(candidates))
}

#[axum::debug_handler]
pub async fn add_candidate(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AddCandidateRequest>,
) -> Result<impl IntoResponse> {
    let payload = payload.normalized();
    payload.validate()?;
    let candidate = state.store.add_candidate(payload.name, payload.email).await?;
    tracing::info!(user_id = %user.id, candidate_id = %candidate.id, "Candidate created");
    Ok((StatusCode::CREATED, Json(candidate)))
}

#[axum::debug_handler]
pub async fn candidate_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let by_status = state.store.status_counts().await?;
    let total = by_status.values().sum();
    Ok(Json(CandidateStatsResponse { total, by_status }))
}

#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate = state.store.get_candidate_by_id(id).await.into_result()?;
    Ok(Json(candidate))
}

#[axum::debug_handler]
pub async fn update_candidate(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCandidateRequest>,
) -> Result<impl IntoResponse> {
    let payload = payload.normalized();
    payload.validate()?;
    let candidate = state
        .store
        .update_candidate(id, CandidatePatch::from(payload))
        .await?
        .ok_or_else(|| Error::NotFound("Candidate not found".into()))?;
    tracing::info!(user_id = %user.id, candidate_id = %id, "Candidate updated");
    Ok(Json(candidate))
}

#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .store
        .update_candidate_status(id, payload.status)
        .await?
        .ok_or_else(|| Error::NotFound("Candidate not found".into()))?;
    tracing::info!(user_id = %user.id, candidate_id = %id, status = %payload.status, "Candidate status changed");
    Ok(Json(candidate))
}
