//! Gym session handlers: CRUD plus the lifecycle actions (current, close,
//! reopen).

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::{completions::completion_response, AppState},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// Expand a session with `is_open` and its nested completions.
async fn session_response(
    state: &AppState,
    session: GymSession,
) -> Result<SessionResponse, AppError> {
    let completions = db::completions::list_completions_for_session(&state.pool, &session.id).await?;

    let mut exercise_completions = Vec::with_capacity(completions.len());
    for completion in completions {
        exercise_completions.push(completion_response(state, completion).await?);
    }

    let is_open = session.is_open();
    Ok(SessionResponse {
        session,
        is_open,
        exercise_completions,
    })
}

pub async fn list_sessions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let sessions = db::sessions::list_sessions(&state.pool, &auth_user.user_id).await?;

    let mut responses = Vec::with_capacity(sessions.len());
    for session in sessions {
        responses.push(session_response(&state, session).await?);
    }

    Ok(Json(json!({ "sessions": responses })))
}

/// `POST /sessions`: start a session. Any session the user still has open
/// is closed in the same transaction, so this never conflicts.
pub async fn create_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = db::sessions::create_session(&state.pool, &auth_user.user_id, &req).await?;
    let response = session_response(&state, session).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /sessions/current`: the open session, 404 when there is none.
pub async fn current_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<SessionResponse>, AppError> {
    let session = db::sessions::get_current_open(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(session_response(&state, session).await?))
}

pub async fn get_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = db::sessions::get_session(&state.pool, &id, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(session_response(&state, session).await?))
}

pub async fn update_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = db::sessions::update_session(&state.pool, &id, &auth_user.user_id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(session_response(&state, session).await?))
}

pub async fn delete_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if db::sessions::delete_session(&state.pool, &id, &auth_user.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// `POST /sessions/{id}/close`: close (or re-close) a session. Without an
/// explicit end_time the server falls back to the last event timestamp.
pub async fn close_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<CloseSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session =
        db::sessions::close_session(&state.pool, &id, &auth_user.user_id, req.end_time.as_deref())
            .await?
            .ok_or(AppError::NotFound)?;
    Ok(Json(session_response(&state, session).await?))
}

/// `POST /sessions/{id}/reopen`: resume an accidentally-closed session,
/// closing whichever other session was open.
pub async fn reopen_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = db::sessions::reopen_session(&state.pool, &id, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(session_response(&state, session).await?))
}
