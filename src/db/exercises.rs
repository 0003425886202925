//! Exercise definition queries: CRUD, catalog links, and the filtered /
//! searched / sorted listing.
//!
//! Muscle-group and tag links use set-replacement semantics: an update that
//! carries id lists replaces the whole association set inside one
//! transaction.

use crate::db::now_utc;
use crate::error::AppError;
use crate::models::{
    CatalogEntryMini, CreateExerciseRequest, Exercise, ExerciseListQuery, UpdateExerciseRequest,
};
use sqlx::{Sqlite, SqlitePool, Transaction};

const EXERCISE_COLUMNS: &str = "id, user_id, name, image_ref, track_reps, track_weight, \
                                track_distance, track_duration, track_resistance, track_notes, \
                                created_at, updated_at";

/// Listing row: the exercise plus the time it was last completed (any
/// completion, open or closed sessions alike).
#[derive(Debug, sqlx::FromRow)]
pub struct ExerciseListRow {
    #[sqlx(flatten)]
    pub exercise: Exercise,
    pub last_completed_at: Option<String>,
}

pub async fn create_exercise(
    pool: &SqlitePool,
    user_id: &str,
    req: &CreateExerciseRequest,
) -> Result<Exercise, AppError> {
    let existing = sqlx::query_as::<_, (String,)>(
        "SELECT id FROM exercises WHERE user_id = ? AND name = ?",
    )
    .bind(user_id)
    .bind(&req.name)
    .fetch_optional(pool)
    .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Exercise name already exists".to_string()));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO exercises
            (id, user_id, name, image_ref, track_reps, track_weight, track_distance,
             track_duration, track_resistance, track_notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.name)
    .bind(req.image_ref.as_deref())
    .bind(req.track_reps.unwrap_or(true))
    .bind(req.track_weight.unwrap_or(false))
    .bind(req.track_distance.unwrap_or(false))
    .bind(req.track_duration.unwrap_or(false))
    .bind(req.track_resistance.unwrap_or(false))
    .bind(req.track_notes.unwrap_or(false))
    .execute(&mut *tx)
    .await?;

    replace_links(&mut tx, &id, user_id, "muscle_groups", &req.muscle_group_ids).await?;
    replace_links(&mut tx, &id, user_id, "tags", &req.tag_ids).await?;

    tx.commit().await?;

    get_exercise(pool, &id, user_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created exercise".to_string()))
}

pub async fn get_exercise(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Option<Exercise>, AppError> {
    let exercise = sqlx::query_as::<_, Exercise>(&format!(
        "SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(exercise)
}

/// List the user's exercises with optional tag/muscle-group filters, a
/// case-insensitive search over exercise, muscle-group, and tag names, and
/// name or recency ordering.
///
/// Filters are baked into one statement with `(? IS NULL OR ...)` guards so
/// the SQL stays static; only the ORDER BY fragment is chosen at runtime.
pub async fn list_exercises(
    pool: &SqlitePool,
    user_id: &str,
    query: &ExerciseListQuery,
) -> Result<Vec<ExerciseListRow>, AppError> {
    let order_sql = match query.ordering.as_deref() {
        Some("recent") => "last_completed_at DESC, x.name ASC",
        _ => "x.name ASC",
    };

    let sql = format!(
        r#"
        SELECT x.id, x.user_id, x.name, x.image_ref, x.track_reps, x.track_weight,
               x.track_distance, x.track_duration, x.track_resistance, x.track_notes,
               x.created_at, x.updated_at,
               MAX(c.created_at) AS last_completed_at
        FROM exercises x
        LEFT JOIN exercise_completions c ON c.exercise_id = x.id
        WHERE x.user_id = ?1
          AND (?2 IS NULL OR EXISTS (
                SELECT 1 FROM exercise_tags et
                WHERE et.exercise_id = x.id AND et.tag_id = ?2))
          AND (?3 IS NULL OR EXISTS (
                SELECT 1 FROM exercise_muscle_groups em
                WHERE em.exercise_id = x.id AND em.muscle_group_id = ?3))
          AND (?4 IS NULL
               OR x.name LIKE '%' || ?4 || '%'
               OR EXISTS (
                    SELECT 1 FROM exercise_muscle_groups em
                    JOIN muscle_groups mg ON mg.id = em.muscle_group_id
                    WHERE em.exercise_id = x.id AND mg.name LIKE '%' || ?4 || '%')
               OR EXISTS (
                    SELECT 1 FROM exercise_tags et
                    JOIN tags t ON t.id = et.tag_id
                    WHERE et.exercise_id = x.id AND t.name LIKE '%' || ?4 || '%'))
        GROUP BY x.id
        ORDER BY {order_sql}
        "#
    );

    let rows = sqlx::query_as::<_, ExerciseListRow>(&sql)
        .bind(user_id)
        .bind(query.tag_id.as_deref())
        .bind(query.muscle_group_id.as_deref())
        .bind(query.search.as_deref())
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Max created_at over all completions of one exercise.
pub async fn last_completed_at(
    pool: &SqlitePool,
    exercise_id: &str,
) -> Result<Option<String>, AppError> {
    let row = sqlx::query_as::<_, (Option<String>,)>(
        "SELECT MAX(created_at) FROM exercise_completions WHERE exercise_id = ?",
    )
    .bind(exercise_id)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

pub async fn muscle_groups_for_exercise(
    pool: &SqlitePool,
    exercise_id: &str,
) -> Result<Vec<CatalogEntryMini>, AppError> {
    let entries = sqlx::query_as::<_, CatalogEntryMini>(
        r#"
        SELECT mg.id, mg.name, mg.icon
        FROM muscle_groups mg
        JOIN exercise_muscle_groups em ON em.muscle_group_id = mg.id
        WHERE em.exercise_id = ?
        ORDER BY mg.name
        "#,
    )
    .bind(exercise_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn tags_for_exercise(
    pool: &SqlitePool,
    exercise_id: &str,
) -> Result<Vec<CatalogEntryMini>, AppError> {
    let entries = sqlx::query_as::<_, CatalogEntryMini>(
        r#"
        SELECT t.id, t.name, t.icon
        FROM tags t
        JOIN exercise_tags et ON et.tag_id = t.id
        WHERE et.exercise_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(exercise_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn update_exercise(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    req: &UpdateExerciseRequest,
) -> Result<Option<Exercise>, AppError> {
    if get_exercise(pool, id, user_id).await?.is_none() {
        return Ok(None);
    }

    let mut tx = pool.begin().await?;

    if let Some(name) = &req.name {
        sqlx::query("UPDATE exercises SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    if let Some(image_ref) = &req.image_ref {
        sqlx::query("UPDATE exercises SET image_ref = ? WHERE id = ?")
            .bind(image_ref)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    for (column, value) in [
        ("track_reps", req.track_reps),
        ("track_weight", req.track_weight),
        ("track_distance", req.track_distance),
        ("track_duration", req.track_duration),
        ("track_resistance", req.track_resistance),
        ("track_notes", req.track_notes),
    ] {
        if let Some(flag) = value {
            sqlx::query(&format!("UPDATE exercises SET {column} = ? WHERE id = ?"))
                .bind(flag)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
    }

    // Present id lists replace the whole association set.
    if let Some(muscle_group_ids) = &req.muscle_group_ids {
        replace_links(&mut tx, id, user_id, "muscle_groups", muscle_group_ids).await?;
    }
    if let Some(tag_ids) = &req.tag_ids {
        replace_links(&mut tx, id, user_id, "tags", tag_ids).await?;
    }

    sqlx::query("UPDATE exercises SET updated_at = ? WHERE id = ?")
        .bind(now_utc())
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get_exercise(pool, id, user_id).await
}

/// Delete an exercise. Protected while completions reference it: history
/// would dangle otherwise.
pub async fn delete_exercise(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<bool, AppError> {
    if get_exercise(pool, id, user_id).await?.is_none() {
        return Ok(false);
    }

    let (references,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM exercise_completions WHERE exercise_id = ?",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if references > 0 {
        return Err(AppError::Conflict(
            "Exercise is still referenced by recorded completions".to_string(),
        ));
    }

    let result = sqlx::query("DELETE FROM exercises WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Wipe and re-insert one of the two link sets. Linked entries must be
/// visible to the user (their own or a global default).
async fn replace_links(
    tx: &mut Transaction<'_, Sqlite>,
    exercise_id: &str,
    user_id: &str,
    catalog: &str,
    ids: &[String],
) -> Result<(), AppError> {
    let (link_table, link_column) = match catalog {
        "muscle_groups" => ("exercise_muscle_groups", "muscle_group_id"),
        _ => ("exercise_tags", "tag_id"),
    };

    sqlx::query(&format!("DELETE FROM {link_table} WHERE exercise_id = ?"))
        .bind(exercise_id)
        .execute(&mut **tx)
        .await?;

    for entry_id in ids {
        let visible = sqlx::query_as::<_, (String,)>(&format!(
            "SELECT id FROM {catalog} WHERE id = ? AND (user_id = ? OR user_id IS NULL)"
        ))
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
        if visible.is_none() {
            return Err(AppError::BadRequest(format!(
                "Unknown {} id: {}",
                catalog.trim_end_matches('s').replace('_', " "),
                entry_id
            )));
        }

        sqlx::query(&format!(
            "INSERT INTO {link_table} (exercise_id, {link_column}) VALUES (?, ?)"
        ))
        .bind(exercise_id)
        .bind(entry_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
