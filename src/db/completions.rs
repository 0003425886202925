//! Exercise completion queries, including the two derived views: last-values
//! prefill and last-completion-for-exercise.

use crate::db::now_utc;
use crate::error::AppError;
use crate::models::{
    CreateCompletionRequest, ExerciseCompletion, PrefillValues, UpdateCompletionRequest,
};
use sqlx::SqlitePool;

const COMPLETION_COLUMNS: &str =
    "id, user_id, session_id, exercise_id, note, created_at, updated_at";

/// Record an exercise performed in a session. The session and the exercise
/// must both resolve within the owner's scope; the session may already be
/// closed (completions can be attached retroactively).
pub async fn create_completion(
    pool: &SqlitePool,
    user_id: &str,
    req: &CreateCompletionRequest,
) -> Result<ExerciseCompletion, AppError> {
    let session_visible = sqlx::query_as::<_, (String,)>(
        "SELECT id FROM gym_sessions WHERE id = ? AND user_id = ?",
    )
    .bind(&req.session_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    if session_visible.is_none() {
        return Err(AppError::NotFound);
    }

    let exercise_visible = sqlx::query_as::<_, (String,)>(
        "SELECT id FROM exercises WHERE id = ? AND user_id = ?",
    )
    .bind(&req.exercise_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    if exercise_visible.is_none() {
        return Err(AppError::NotFound);
    }

    let id = uuid::Uuid::now_v7().to_string();
    sqlx::query(
        r#"
        INSERT INTO exercise_completions (id, user_id, session_id, exercise_id, note)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.session_id)
    .bind(&req.exercise_id)
    .bind(req.note.as_deref().unwrap_or(""))
    .execute(pool)
    .await?;

    get_completion(pool, &id, user_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created completion".to_string()))
}

/// Completion by id, scoped to its owner.
pub async fn get_completion(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Option<ExerciseCompletion>, AppError> {
    let completion = sqlx::query_as::<_, ExerciseCompletion>(&format!(
        "SELECT {COMPLETION_COLUMNS} FROM exercise_completions WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(completion)
}

/// Completion by id regardless of owner. Used where an ownership mismatch
/// must surface as Forbidden rather than NotFound (event creation on someone
/// else's completion).
pub async fn find_completion(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<ExerciseCompletion>, AppError> {
    let completion = sqlx::query_as::<_, ExerciseCompletion>(&format!(
        "SELECT {COMPLETION_COLUMNS} FROM exercise_completions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(completion)
}

/// Completions of one session in the order they were added.
pub async fn list_completions_for_session(
    pool: &SqlitePool,
    session_id: &str,
) -> Result<Vec<ExerciseCompletion>, AppError> {
    let completions = sqlx::query_as::<_, ExerciseCompletion>(&format!(
        "SELECT {COMPLETION_COLUMNS} FROM exercise_completions \
         WHERE session_id = ? ORDER BY created_at, id"
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(completions)
}

pub async fn update_completion(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    req: &UpdateCompletionRequest,
) -> Result<Option<ExerciseCompletion>, AppError> {
    if get_completion(pool, id, user_id).await?.is_none() {
        return Ok(None);
    }

    if let Some(note) = &req.note {
        sqlx::query("UPDATE exercise_completions SET note = ?, updated_at = ? WHERE id = ?")
            .bind(note)
            .bind(now_utc())
            .bind(id)
            .execute(pool)
            .await?;
    }

    get_completion(pool, id, user_id).await
}

pub async fn delete_completion(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM exercise_completions WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Metric values of the completion's most recent event, for prefilling the
/// next-set form. All-null when the completion has no events yet.
pub async fn last_values_for_prefill(
    pool: &SqlitePool,
    completion_id: &str,
) -> Result<PrefillValues, AppError> {
    let row = sqlx::query_as::<_, (Option<i64>, Option<f64>, Option<f64>, Option<i64>, Option<f64>)>(
        r#"
        SELECT reps, weight, distance, duration_seconds, resistance
        FROM exercise_events
        WHERE completion_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(completion_id)
    .fetch_optional(pool)
    .await?;

    Ok(match row {
        Some((reps, weight, distance, duration_seconds, resistance)) => PrefillValues {
            reps,
            weight,
            distance,
            duration_seconds,
            resistance,
        },
        None => PrefillValues::default(),
    })
}

/// The most recent completion of `exercise_id` that actually happened:
/// it must belong to the caller, have at least one event (an exercise added
/// to a session but never performed does not count), and sit in a closed
/// session, because an in-progress session's own completions would otherwise feed
/// back the values the user is entering right now. Candidates rank by their
/// latest event timestamp.
pub async fn last_completion_for_exercise(
    pool: &SqlitePool,
    exercise_id: &str,
    user_id: &str,
) -> Result<Option<ExerciseCompletion>, AppError> {
    let completion = sqlx::query_as::<_, ExerciseCompletion>(
        r#"
        SELECT c.id, c.user_id, c.session_id, c.exercise_id, c.note,
               c.created_at, c.updated_at
        FROM exercise_completions c
        JOIN gym_sessions s ON s.id = c.session_id
        JOIN exercise_events e ON e.completion_id = c.id
        WHERE c.exercise_id = ?
          AND c.user_id = ?
          AND s.end_time IS NOT NULL
        GROUP BY c.id
        ORDER BY MAX(e.created_at) DESC
        LIMIT 1
        "#,
    )
    .bind(exercise_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(completion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_event_at, insert_user, pool};
    use crate::db::{events, exercises, sessions};
    use crate::models::{CreateEventRequest, CreateExerciseRequest, CreateSessionRequest};

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

    async fn completion_in_new_session(
        pool: &SqlitePool,
        user: &str,
        exercise_id: &str,
    ) -> ExerciseCompletion {
        let session = sessions::create_session(pool, user, &CreateSessionRequest::default())
            .await
            .unwrap();
        create_completion(
            pool,
            user,
            &CreateCompletionRequest {
                session_id: session.id,
                exercise_id: exercise_id.to_string(),
                note: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_rejects_foreign_session_and_exercise() {
        let pool = pool().await;
        let ann = insert_user(&pool, "ann").await;
        let bob = insert_user(&pool, "bob").await;

        let ann_exercise = exercises::create_exercise(&pool, &ann, &blank_exercise("Squat"))
            .await
            .unwrap();
        let ann_session = sessions::create_session(&pool, &ann, &CreateSessionRequest::default())
            .await
            .unwrap();

        // Bob cannot attach work to Ann's session or exercise.
        let err = create_completion(
            &pool,
            &bob,
            &CreateCompletionRequest {
                session_id: ann_session.id.clone(),
                exercise_id: ann_exercise.id.clone(),
                note: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn completions_attach_to_closed_sessions() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;

        let exercise = exercises::create_exercise(&pool, &user, &blank_exercise("Squat"))
            .await
            .unwrap();
        let session = sessions::create_session(&pool, &user, &CreateSessionRequest::default())
            .await
            .unwrap();
        sessions::close_session(&pool, &session.id, &user, None)
            .await
            .unwrap();

        let completion = create_completion(
            &pool,
            &user,
            &CreateCompletionRequest {
                session_id: session.id.clone(),
                exercise_id: exercise.id,
                note: Some("added after the fact".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(completion.session_id, session.id);
    }

    #[tokio::test]
    async fn prefill_projects_latest_event_values() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;
        let exercise = exercises::create_exercise(&pool, &user, &blank_exercise("Bench"))
            .await
            .unwrap();
        let completion = completion_in_new_session(&pool, &user, &exercise.id).await;

        for (weight, created_at) in [
            (100.0, "2026-04-02T10:00:00.000Z"),
            (105.0, "2026-04-02T10:04:00.000Z"),
        ] {
            let event = events::create_event(
                &pool,
                &CreateEventRequest {
                    completion_id: completion.id.clone(),
                    order_index: None,
                    reps: Some(5),
                    duration_seconds: None,
                    weight: Some(weight),
                    distance: None,
                    resistance: None,
                    note: None,
                },
            )
            .await
            .unwrap();
            // Pin timestamps so the second event is unambiguously later.
            sqlx::query("UPDATE exercise_events SET created_at = ? WHERE id = ?")
                .bind(created_at)
                .bind(&event.id)
                .execute(&pool)
                .await
                .unwrap();
        }

        let prefill = last_values_for_prefill(&pool, &completion.id).await.unwrap();
        assert_eq!(prefill.reps, Some(5));
        assert_eq!(prefill.weight, Some(105.0));
        assert_eq!(prefill.distance, None);
        assert_eq!(prefill.duration_seconds, None);
        assert_eq!(prefill.resistance, None);
    }

    #[tokio::test]
    async fn prefill_is_empty_without_events() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;
        let exercise = exercises::create_exercise(&pool, &user, &blank_exercise("Bench"))
            .await
            .unwrap();
        let completion = completion_in_new_session(&pool, &user, &exercise.id).await;

        let prefill = last_values_for_prefill(&pool, &completion.id).await.unwrap();
        assert_eq!(prefill.reps, None);
        assert_eq!(prefill.weight, None);
        // No events means the client gets an empty object, not a null-filled one.
        assert_eq!(
            serde_json::to_value(&prefill).unwrap(),
            serde_json::json!({})
        );
    }

    #[tokio::test]
    async fn last_completion_skips_open_sessions_and_empty_completions() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;
        let exercise = exercises::create_exercise(&pool, &user, &blank_exercise("Deadlift"))
            .await
            .unwrap();

        // C3: closed session, one (older) event; the only eligible candidate.
        let c3 = completion_in_new_session(&pool, &user, &exercise.id).await;
        insert_event_at(&pool, &c3.id, 1, "2026-05-01T08:00:00.000Z").await;
        sessions::close_session(&pool, &c3.session_id, &user, None)
            .await
            .unwrap();

        // C2: closed session, zero events.
        let c2 = completion_in_new_session(&pool, &user, &exercise.id).await;
        sessions::close_session(&pool, &c2.session_id, &user, None)
            .await
            .unwrap();

        // C1: open session with a newer event; excluded while in progress.
        let c1 = completion_in_new_session(&pool, &user, &exercise.id).await;
        insert_event_at(&pool, &c1.id, 1, "2026-05-02T09:00:00.000Z").await;

        let last = last_completion_for_exercise(&pool, &exercise.id, &user)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.id, c3.id);
    }

    #[tokio::test]
    async fn last_completion_ranks_by_latest_event() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;
        let exercise = exercises::create_exercise(&pool, &user, &blank_exercise("Row"))
            .await
            .unwrap();

        let older = completion_in_new_session(&pool, &user, &exercise.id).await;
        insert_event_at(&pool, &older.id, 1, "2026-05-03T08:00:00.000Z").await;
        sessions::close_session(&pool, &older.session_id, &user, None)
            .await
            .unwrap();

        let newer = completion_in_new_session(&pool, &user, &exercise.id).await;
        insert_event_at(&pool, &newer.id, 1, "2026-05-04T08:00:00.000Z").await;
        sessions::close_session(&pool, &newer.session_id, &user, None)
            .await
            .unwrap();

        let last = last_completion_for_exercise(&pool, &exercise.id, &user)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.id, newer.id);
    }

    #[tokio::test]
    async fn last_completion_is_none_for_other_users() {
        let pool = pool().await;
        let ann = insert_user(&pool, "ann").await;
        let bob = insert_user(&pool, "bob").await;
        let exercise = exercises::create_exercise(&pool, &ann, &blank_exercise("Curl"))
            .await
            .unwrap();

        let completion = completion_in_new_session(&pool, &ann, &exercise.id).await;
        insert_event_at(&pool, &completion.id, 1, "2026-05-05T08:00:00.000Z").await;
        sessions::close_session(&pool, &completion.session_id, &ann, None)
            .await
            .unwrap();

        assert!(last_completion_for_exercise(&pool, &exercise.id, &bob)
            .await
            .unwrap()
            .is_none());
    }
}
