//! Muscle-group and tag handlers.
//!
//! `/muscle-groups` and `/tags` expose the same CRUD surface; the handlers
//! are thin wrappers fixing the [`CatalogKind`] for the shared helpers below.

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
use serde_json::{json, Value};

async fn list(
    state: &AppState,
    kind: CatalogKind,
    auth_user: &AuthUser,
) -> Result<Vec<CatalogEntry>, AppError> {
    db::catalog::list_entries(&state.pool, kind, &auth_user.user_id).await
}

async fn create(
    state: &AppState,
    kind: CatalogKind,
    auth_user: &AuthUser,
    req: &CreateCatalogEntryRequest,
) -> Result<CatalogEntry, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }
    db::catalog::create_entry(&state.pool, kind, &auth_user.user_id, req).await
}

async fn update(
    state: &AppState,
    kind: CatalogKind,
    auth_user: &AuthUser,
    id: &str,
    req: &UpdateCatalogEntryRequest,
) -> Result<CatalogEntry, AppError> {
    db::catalog::update_entry(&state.pool, kind, id, &auth_user.user_id, req)
        .await?
        .ok_or(AppError::NotFound)
}

async fn delete(
    state: &AppState,
    kind: CatalogKind,
    auth_user: &AuthUser,
    id: &str,
) -> Result<(), AppError> {
    if db::catalog::delete_entry(&state.pool, kind, id, &auth_user.user_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn list_muscle_groups(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let entries = list(&state, CatalogKind::MuscleGroup, &auth_user).await?;
    Ok(Json(json!({ "muscle_groups": entries })))
}

pub async fn create_muscle_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateCatalogEntryRequest>,
) -> Result<(StatusCode, Json<CatalogEntry>), AppError> {
    let entry = create(&state, CatalogKind::MuscleGroup, &auth_user, &req).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_muscle_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateCatalogEntryRequest>,
) -> Result<Json<CatalogEntry>, AppError> {
    let entry = update(&state, CatalogKind::MuscleGroup, &auth_user, &id, &req).await?;
    Ok(Json(entry))
}

pub async fn delete_muscle_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    delete(&state, CatalogKind::MuscleGroup, &auth_user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_tags(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let entries = list(&state, CatalogKind::Tag, &auth_user).await?;
    Ok(Json(json!({ "tags": entries })))
}

pub async fn create_tag(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateCatalogEntryRequest>,
) -> Result<(StatusCode, Json<CatalogEntry>), AppError> {
    let entry = create(&state, CatalogKind::Tag, &auth_user, &req).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_tag(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateCatalogEntryRequest>,
) -> Result<Json<CatalogEntry>, AppError> {
    let entry = update(&state, CatalogKind::Tag, &auth_user, &id, &req).await?;
    Ok(Json(entry))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    delete(&state, CatalogKind::Tag, &auth_user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
