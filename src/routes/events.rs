//! Exercise event handlers.
//!
//! Creating an event on someone else's completion is the one place an
//! ownership mismatch surfaces as 403 instead of 404: the completion id comes
//! from the request body, not the path.

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

pub async fn create_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<ExerciseEvent>), AppError> {
    let completion = db::completions::find_completion(&state.pool, &req.completion_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if completion.user_id != auth_user.user_id {
        return Err(AppError::Forbidden("Not your completion".to_string()));
    }

    if let Some(order_index) = req.order_index {
        if order_index < 1 {
            return Err(AppError::BadRequest(
                "order_index must be a positive integer".to_string(),
            ));
        }
    }

    let event = db::events::create_event(&state.pool, &req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /events?completion_id=...`: the completion's events in set order.
pub async fn list_events(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Value>, AppError> {
    let completion =
        db::completions::get_completion(&state.pool, &query.completion_id, &auth_user.user_id)
            .await?
            .ok_or(AppError::NotFound)?;

    let events = db::events::list_events_for_completion(&state.pool, &completion.id).await?;
    Ok(Json(json!({ "events": events })))
}

pub async fn get_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ExerciseEvent>, AppError> {
    let event = db::events::get_event(&state.pool, &id, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<ExerciseEvent>, AppError> {
    if let Some(order_index) = req.order_index {
        if order_index < 1 {
            return Err(AppError::BadRequest(
                "order_index must be a positive integer".to_string(),
            ));
        }
    }

    let event = db::events::update_event(&state.pool, &id, &auth_user.user_id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if db::events::delete_event(&state.pool, &id, &auth_user.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
