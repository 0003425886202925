//! Saved gym location handlers.

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
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

pub async fn list_locations(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let locations = db::locations::list_locations(&state.pool, &auth_user.user_id).await?;
    Ok(Json(json!({ "locations": locations })))
}

/// `GET /locations/most-recent`: the last location the user touched, or 204
/// when they have none saved (absence is normal here, not an error).
pub async fn most_recent_location(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Response, AppError> {
    match db::locations::most_recent_location(&state.pool, &auth_user.user_id).await? {
        Some(location) => Ok(Json(location).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

pub async fn create_location(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<UserLocation>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }

    let location = db::locations::create_location(&state.pool, &auth_user.user_id, &req).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn get_location(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserLocation>, AppError> {
    let location = db::locations::get_location(&state.pool, &id, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(location))
}

pub async fn update_location(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateLocationRequest>,
) -> Result<Json<UserLocation>, AppError> {
    let location = db::locations::update_location(&state.pool, &id, &auth_user.user_id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(location))
}

pub async fn delete_location(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if db::locations::delete_location(&state.pool, &id, &auth_user.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
