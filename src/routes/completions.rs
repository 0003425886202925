//! Exercise completion handlers, including the last-values prefill endpoint.

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Expand a completion with its exercise and ordered events. Shared with the
/// session detail and last-completion endpoints.
pub(crate) async fn completion_response(
    state: &AppState,
    completion: ExerciseCompletion,
) -> Result<CompletionResponse, AppError> {
    let exercise = db::exercises::get_exercise(&state.pool, &completion.exercise_id, &completion.user_id)
        .await?
        .ok_or(AppError::Internal("Completion references a missing exercise".to_string()))?;
    let events = db::events::list_events_for_completion(&state.pool, &completion.id).await?;
    Ok(CompletionResponse {
        completion,
        exercise,
        events,
    })
}

pub async fn create_completion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateCompletionRequest>,
) -> Result<(StatusCode, Json<CompletionResponse>), AppError> {
    let completion =
        db::completions::create_completion(&state.pool, &auth_user.user_id, &req).await?;
    let response = completion_response(&state, completion).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_completion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<CompletionResponse>, AppError> {
    let completion = db::completions::get_completion(&state.pool, &id, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(completion_response(&state, completion).await?))
}

pub async fn update_completion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateCompletionRequest>,
) -> Result<Json<CompletionResponse>, AppError> {
    let completion = db::completions::update_completion(&state.pool, &id, &auth_user.user_id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(completion_response(&state, completion).await?))
}

pub async fn delete_completion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if db::completions::delete_completion(&state.pool, &id, &auth_user.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// `GET /exercise-completions/{id}/last-values`: the previous set's metric
/// values, for prefilling the next-set form.
pub async fn last_values(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PrefillValues>, AppError> {
    let completion = db::completions::get_completion(&state.pool, &id, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let values = db::completions::last_values_for_prefill(&state.pool, &completion.id).await?;
    Ok(Json(values))
}
