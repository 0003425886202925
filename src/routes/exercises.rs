//! Exercise handlers: CRUD, filtered/sorted listing, and the
//! last-completion lookup used for "what did I lift last time".

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::{completions::completion_response, AppState},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// Attach catalog links and last-completed time to an exercise.
async fn exercise_response(
    state: &AppState,
    exercise: Exercise,
    last_completed_at: Option<String>,
) -> Result<ExerciseResponse, AppError> {
    let muscle_groups = db::exercises::muscle_groups_for_exercise(&state.pool, &exercise.id).await?;
    let tags = db::exercises::tags_for_exercise(&state.pool, &exercise.id).await?;
    Ok(ExerciseResponse {
        exercise,
        muscle_groups,
        tags,
        last_completed_at,
    })
}

pub async fn list_exercises(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ExerciseListQuery>,
) -> Result<Json<Value>, AppError> {
    let rows = db::exercises::list_exercises(&state.pool, &auth_user.user_id, &query).await?;

    let mut exercises = Vec::with_capacity(rows.len());
    for row in rows {
        exercises.push(exercise_response(&state, row.exercise, row.last_completed_at).await?);
    }

    Ok(Json(json!({ "exercises": exercises })))
}

pub async fn create_exercise(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateExerciseRequest>,
) -> Result<(StatusCode, Json<ExerciseResponse>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }

    let exercise = db::exercises::create_exercise(&state.pool, &auth_user.user_id, &req).await?;
    let response = exercise_response(&state, exercise, None).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_exercise(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ExerciseResponse>, AppError> {
    let exercise = db::exercises::get_exercise(&state.pool, &id, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let last_completed_at = db::exercises::last_completed_at(&state.pool, &exercise.id).await?;
    Ok(Json(exercise_response(&state, exercise, last_completed_at).await?))
}

pub async fn update_exercise(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateExerciseRequest>,
) -> Result<Json<ExerciseResponse>, AppError> {
    let exercise = db::exercises::update_exercise(&state.pool, &id, &auth_user.user_id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    let last_completed_at = db::exercises::last_completed_at(&state.pool, &exercise.id).await?;
    Ok(Json(exercise_response(&state, exercise, last_completed_at).await?))
}

pub async fn delete_exercise(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if db::exercises::delete_exercise(&state.pool, &id, &auth_user.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// `GET /exercises/{id}/last-completion`: the most recent completion of this
/// exercise that has events and sits in a closed session. 404 when the user
/// has not completed the exercise yet.
pub async fn last_completion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<CompletionResponse>, AppError> {
    // Scope the exercise first so a foreign id 404s rather than leaking
    // whether it exists.
    let exercise = db::exercises::get_exercise(&state.pool, &id, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let completion =
        db::completions::last_completion_for_exercise(&state.pool, &exercise.id, &auth_user.user_id)
            .await?
            .ok_or(AppError::NotFound)?;

    Ok(Json(completion_response(&state, completion).await?))
}
