//! Saved gym location queries. Ordered most-recently-updated first so the
//! top entry is the best "where are you training today" suggestion.

use crate::db::now_utc;
use crate::error::AppError;
use crate::models::{CreateLocationRequest, UpdateLocationRequest, UserLocation};
use sqlx::SqlitePool;

const LOCATION_COLUMNS: &str = "id, user_id, name, created_at, updated_at";

pub async fn list_locations(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<UserLocation>, AppError> {
    let locations = sqlx::query_as::<_, UserLocation>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM user_locations \
         WHERE user_id = ? ORDER BY updated_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(locations)
}

pub async fn most_recent_location(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Option<UserLocation>, AppError> {
    let location = sqlx::query_as::<_, UserLocation>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM user_locations \
         WHERE user_id = ? ORDER BY updated_at DESC, id DESC LIMIT 1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(location)
}

pub async fn get_location(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Option<UserLocation>, AppError> {
    let location = sqlx::query_as::<_, UserLocation>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM user_locations WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(location)
}

pub async fn create_location(
    pool: &SqlitePool,
    user_id: &str,
    req: &CreateLocationRequest,
) -> Result<UserLocation, AppError> {
    let existing = sqlx::query_as::<_, (String,)>(
        "SELECT id FROM user_locations WHERE user_id = ? AND name = ?",
    )
    .bind(user_id)
    .bind(&req.name)
    .fetch_optional(pool)
    .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "You already have a location named '{}'",
            req.name
        )));
    }

    let id = uuid::Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO user_locations (id, user_id, name) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(user_id)
        .bind(&req.name)
        .execute(pool)
        .await?;

    get_location(pool, &id, user_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created location".to_string()))
}

pub async fn update_location(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    req: &UpdateLocationRequest,
) -> Result<Option<UserLocation>, AppError> {
    if get_location(pool, id, user_id).await?.is_none() {
        return Ok(None);
    }

    if let Some(name) = &req.name {
        sqlx::query("UPDATE user_locations SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(pool)
            .await?;
    }

    sqlx::query("UPDATE user_locations SET updated_at = ? WHERE id = ?")
        .bind(now_utc())
        .bind(id)
        .execute(pool)
        .await?;

    get_location(pool, id, user_id).await
}

pub async fn delete_location(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM user_locations WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
