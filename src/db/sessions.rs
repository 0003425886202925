//! Gym session queries and the open/close lifecycle.
//!
//! Invariant: at most one session per user has `end_time IS NULL`. Creating
//! and reopening both close competing open sessions first, inside the same
//! transaction as the write that opens a session, so the invariant holds even
//! when two requests race. Close is never rejected: auto-close replaces any
//! "you already have an open session" conflict.

use crate::db::now_utc;
use crate::error::AppError;
use crate::models::{CreateSessionRequest, GymSession, UpdateSessionRequest};
use sqlx::SqlitePool;

const SESSION_COLUMNS: &str =
    "id, user_id, start_time, end_time, location, note, created_at, updated_at";

/// Create a session for `user_id`, auto-closing any open ones first.
///
/// The close and the insert share one transaction: the new session is only
/// visible once the old ones are closed, and a failure rolls both back.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: &str,
    req: &CreateSessionRequest,
) -> Result<GymSession, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    let now = now_utc();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE gym_sessions SET end_time = ?, updated_at = ? \
         WHERE user_id = ? AND end_time IS NULL",
    )
    .bind(&now)
    .bind(&now)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO gym_sessions (id, user_id, start_time, location, note)
        VALUES (?, ?, COALESCE(?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now')), ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(req.start_time.as_deref())
    .bind(req.location.as_deref().unwrap_or(""))
    .bind(req.note.as_deref().unwrap_or(""))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_session(pool, &id, user_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created session".to_string()))
}

/// Session by id, scoped to its owner.
pub async fn get_session(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Option<GymSession>, AppError> {
    let session = sqlx::query_as::<_, GymSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM gym_sessions WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// All of a user's sessions, newest start first.
pub async fn list_sessions(pool: &SqlitePool, user_id: &str) -> Result<Vec<GymSession>, AppError> {
    let sessions = sqlx::query_as::<_, GymSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM gym_sessions \
         WHERE user_id = ? ORDER BY start_time DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(sessions)
}

/// The user's open session, if any. Most recent start wins should more than
/// one ever exist.
pub async fn get_current_open(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Option<GymSession>, AppError> {
    let session = sqlx::query_as::<_, GymSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM gym_sessions \
         WHERE user_id = ? AND end_time IS NULL \
         ORDER BY start_time DESC LIMIT 1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// Partial update of start_time/location/note. Only present fields change.
pub async fn update_session(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    req: &UpdateSessionRequest,
) -> Result<Option<GymSession>, AppError> {
    if get_session(pool, id, user_id).await?.is_none() {
        return Ok(None);
    }

    if let Some(start_time) = &req.start_time {
        sqlx::query("UPDATE gym_sessions SET start_time = ? WHERE id = ?")
            .bind(start_time)
            .bind(id)
            .execute(pool)
            .await?;
    }
    if let Some(location) = &req.location {
        sqlx::query("UPDATE gym_sessions SET location = ? WHERE id = ?")
            .bind(location)
            .bind(id)
            .execute(pool)
            .await?;
    }
    if let Some(note) = &req.note {
        sqlx::query("UPDATE gym_sessions SET note = ? WHERE id = ?")
            .bind(note)
            .bind(id)
            .execute(pool)
            .await?;
    }

    sqlx::query("UPDATE gym_sessions SET updated_at = ? WHERE id = ?")
        .bind(now_utc())
        .bind(id)
        .execute(pool)
        .await?;

    get_session(pool, id, user_id).await
}

pub async fn delete_session(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM gym_sessions WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Close a session, overwriting `end_time` even when it is already closed
/// (close doubles as a timestamp-correction tool, so this never rejects).
///
/// Without an explicit `when`, the end time defaults to the created_at of the
/// latest event recorded under this session, or now if it has none.
pub async fn close_session(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    when: Option<&str>,
) -> Result<Option<GymSession>, AppError> {
    if get_session(pool, id, user_id).await?.is_none() {
        return Ok(None);
    }

    let end_time = match when {
        Some(t) => t.to_string(),
        None => last_event_time(pool, id).await?.unwrap_or_else(now_utc),
    };

    sqlx::query("UPDATE gym_sessions SET end_time = ?, updated_at = ? WHERE id = ?")
        .bind(&end_time)
        .bind(now_utc())
        .bind(id)
        .execute(pool)
        .await?;

    get_session(pool, id, user_id).await
}

/// created_at of the most recent event belonging to this session.
async fn last_event_time(pool: &SqlitePool, session_id: &str) -> Result<Option<String>, AppError> {
    let row = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT e.created_at
        FROM exercise_events e
        JOIN exercise_completions c ON c.id = e.completion_id
        WHERE c.session_id = ?
        ORDER BY e.created_at DESC, e.id DESC
        LIMIT 1
        "#,
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(t,)| t))
}

/// Reopen a closed session: close every other open session of the same user,
/// then clear this one's end_time. Both steps share one transaction.
pub async fn reopen_session(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Option<GymSession>, AppError> {
    if get_session(pool, id, user_id).await?.is_none() {
        return Ok(None);
    }

    let now = now_utc();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE gym_sessions SET end_time = ?, updated_at = ? \
         WHERE user_id = ? AND end_time IS NULL AND id != ?",
    )
    .bind(&now)
    .bind(&now)
    .bind(user_id)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE gym_sessions SET end_time = NULL, updated_at = ? WHERE id = ?")
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get_session(pool, id, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_event_at, insert_user, pool};
    use crate::db::{completions, exercises};
    use crate::models::{CreateCompletionRequest, CreateExerciseRequest, CreateSessionRequest};

    fn blank_exercise(name: &str) -> CreateExerciseRequest {
        CreateExerciseRequest {
            name: name.to_string(),
            image_ref: None,
            muscle_group_ids: vec![],
            tag_ids: vec![],
            track_reps: None,
            track_weight: None,
            track_distance: None,
            track_duration: None,
            track_resistance: None,
            track_notes: None,
        }
    }

    async fn open_count(pool: &SqlitePool, user_id: &str) -> i64 {
        sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM gym_sessions WHERE user_id = ? AND end_time IS NULL",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
        .0
    }

    #[tokio::test]
    async fn create_closes_prior_open_session() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;

        let first = create_session(&pool, &user, &CreateSessionRequest::default())
            .await
            .unwrap();
        assert!(first.is_open());

        let second = create_session(&pool, &user, &CreateSessionRequest::default())
            .await
            .unwrap();
        assert!(second.is_open());

        let first = get_session(&pool, &first.id, &user).await.unwrap().unwrap();
        assert!(!first.is_open());
        assert_eq!(open_count(&pool, &user).await, 1);
    }

    #[tokio::test]
    async fn create_does_not_touch_other_users_sessions() {
        let pool = pool().await;
        let ann = insert_user(&pool, "ann").await;
        let bob = insert_user(&pool, "bob").await;

        create_session(&pool, &ann, &CreateSessionRequest::default())
            .await
            .unwrap();
        create_session(&pool, &bob, &CreateSessionRequest::default())
            .await
            .unwrap();

        assert_eq!(open_count(&pool, &ann).await, 1);
        assert_eq!(open_count(&pool, &bob).await, 1);
    }

    #[tokio::test]
    async fn current_open_returns_none_after_close() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;

        let session = create_session(&pool, &user, &CreateSessionRequest::default())
            .await
            .unwrap();
        assert!(get_current_open(&pool, &user).await.unwrap().is_some());

        close_session(&pool, &session.id, &user, None).await.unwrap();
        assert!(get_current_open(&pool, &user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn close_is_idempotent_and_overwrites_end_time() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;

        let session = create_session(&pool, &user, &CreateSessionRequest::default())
            .await
            .unwrap();

        let closed = close_session(&pool, &session.id, &user, Some("2026-01-01T10:00:00.000Z"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(closed.end_time.as_deref(), Some("2026-01-01T10:00:00.000Z"));

        // Closing again corrects the timestamp instead of failing.
        let reclosed = close_session(&pool, &session.id, &user, Some("2026-01-01T11:30:00.000Z"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reclosed.end_time.as_deref(), Some("2026-01-01T11:30:00.000Z"));
    }

    #[tokio::test]
    async fn close_defaults_to_last_event_timestamp() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;

        let exercise = exercises::create_exercise(&pool, &user, &blank_exercise("Squat"))
            .await
            .unwrap();
        let session = create_session(&pool, &user, &CreateSessionRequest::default())
            .await
            .unwrap();
        let completion = completions::create_completion(
            &pool,
            &user,
            &CreateCompletionRequest {
                session_id: session.id.clone(),
                exercise_id: exercise.id.clone(),
                note: None,
            },
        )
        .await
        .unwrap();

        insert_event_at(&pool, &completion.id, 1, "2026-03-01T09:00:00.000Z").await;
        insert_event_at(&pool, &completion.id, 2, "2026-03-01T09:12:00.000Z").await;

        let closed = close_session(&pool, &session.id, &user, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(closed.end_time.as_deref(), Some("2026-03-01T09:12:00.000Z"));
    }

    #[tokio::test]
    async fn reopen_closes_the_competing_open_session() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;

        let old = create_session(&pool, &user, &CreateSessionRequest::default())
            .await
            .unwrap();
        close_session(&pool, &old.id, &user, None).await.unwrap();

        let fresh = create_session(&pool, &user, &CreateSessionRequest::default())
            .await
            .unwrap();

        let reopened = reopen_session(&pool, &old.id, &user).await.unwrap().unwrap();
        assert!(reopened.is_open());

        let fresh = get_session(&pool, &fresh.id, &user).await.unwrap().unwrap();
        assert!(!fresh.is_open());
        assert_eq!(open_count(&pool, &user).await, 1);
    }

    #[tokio::test]
    async fn sessions_are_invisible_across_users() {
        let pool = pool().await;
        let ann = insert_user(&pool, "ann").await;
        let bob = insert_user(&pool, "bob").await;

        let session = create_session(&pool, &ann, &CreateSessionRequest::default())
            .await
            .unwrap();

        assert!(get_session(&pool, &session.id, &bob).await.unwrap().is_none());
        assert!(!delete_session(&pool, &session.id, &bob).await.unwrap());
        assert!(reopen_session(&pool, &session.id, &bob).await.unwrap().is_none());
    }
}
