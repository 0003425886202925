//! Exercise event queries. An event has no user column of its own; every
//! scoped query joins through its completion's owner.

use crate::db::now_utc;
use crate::error::AppError;
use crate::models::{CreateEventRequest, ExerciseEvent, UpdateEventRequest};
use sqlx::SqlitePool;

const EVENT_COLUMNS: &str = "id, completion_id, order_index, reps, duration_seconds, \
                             weight, distance, resistance, note, created_at, updated_at";

/// Insert a set/split. The caller is responsible for having verified that the
/// completion belongs to the acting user. `order_index` defaults to 1 and is
/// never auto-incremented; duplicates are allowed and resolve by insertion
/// time when listing.
pub async fn create_event(
    pool: &SqlitePool,
    req: &CreateEventRequest,
) -> Result<ExerciseEvent, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO exercise_events
            (id, completion_id, order_index, reps, duration_seconds,
             weight, distance, resistance, note)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&req.completion_id)
    .bind(req.order_index.unwrap_or(1))
    .bind(req.reps)
    .bind(req.duration_seconds)
    .bind(req.weight)
    .bind(req.distance)
    .bind(req.resistance)
    .bind(req.note.as_deref().unwrap_or(""))
    .execute(pool)
    .await?;

    let event = sqlx::query_as::<_, ExerciseEvent>(&format!(
        "SELECT {EVENT_COLUMNS} FROM exercise_events WHERE id = ?"
    ))
    .bind(&id)
    .fetch_optional(pool)
    .await?;

    event.ok_or(AppError::Internal("Failed to retrieve created event".to_string()))
}

/// Event by id, scoped through its completion's owner.
pub async fn get_event(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Option<ExerciseEvent>, AppError> {
    let event = sqlx::query_as::<_, ExerciseEvent>(
        r#"
        SELECT e.id, e.completion_id, e.order_index, e.reps, e.duration_seconds,
               e.weight, e.distance, e.resistance, e.note, e.created_at, e.updated_at
        FROM exercise_events e
        JOIN exercise_completions c ON c.id = e.completion_id
        WHERE e.id = ? AND c.user_id = ?
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

/// Events of one completion in set order: (order_index, created_at, id).
pub async fn list_events_for_completion(
    pool: &SqlitePool,
    completion_id: &str,
) -> Result<Vec<ExerciseEvent>, AppError> {
    let events = sqlx::query_as::<_, ExerciseEvent>(&format!(
        "SELECT {EVENT_COLUMNS} FROM exercise_events \
         WHERE completion_id = ? ORDER BY order_index, created_at, id"
    ))
    .bind(completion_id)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

pub async fn update_event(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    req: &UpdateEventRequest,
) -> Result<Option<ExerciseEvent>, AppError> {
    if get_event(pool, id, user_id).await?.is_none() {
        return Ok(None);
    }

    if let Some(order_index) = req.order_index {
        sqlx::query("UPDATE exercise_events SET order_index = ? WHERE id = ?")
            .bind(order_index)
            .bind(id)
            .execute(pool)
            .await?;
    }
    if let Some(reps) = req.reps {
        sqlx::query("UPDATE exercise_events SET reps = ? WHERE id = ?")
            .bind(reps)
            .bind(id)
            .execute(pool)
            .await?;
    }
    if let Some(duration_seconds) = req.duration_seconds {
        sqlx::query("UPDATE exercise_events SET duration_seconds = ? WHERE id = ?")
            .bind(duration_seconds)
            .bind(id)
            .execute(pool)
            .await?;
    }
    if let Some(weight) = req.weight {
        sqlx::query("UPDATE exercise_events SET weight = ? WHERE id = ?")
            .bind(weight)
            .bind(id)
            .execute(pool)
            .await?;
    }
    if let Some(distance) = req.distance {
        sqlx::query("UPDATE exercise_events SET distance = ? WHERE id = ?")
            .bind(distance)
            .bind(id)
            .execute(pool)
            .await?;
    }
    if let Some(resistance) = req.resistance {
        sqlx::query("UPDATE exercise_events SET resistance = ? WHERE id = ?")
            .bind(resistance)
            .bind(id)
            .execute(pool)
            .await?;
    }
    if let Some(note) = &req.note {
        sqlx::query("UPDATE exercise_events SET note = ? WHERE id = ?")
            .bind(note)
            .bind(id)
            .execute(pool)
            .await?;
    }

    sqlx::query("UPDATE exercise_events SET updated_at = ? WHERE id = ?")
        .bind(now_utc())
        .bind(id)
        .execute(pool)
        .await?;

    get_event(pool, id, user_id).await
}

pub async fn delete_event(pool: &SqlitePool, id: &str, user_id: &str) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        DELETE FROM exercise_events
        WHERE id = ? AND completion_id IN (
            SELECT id FROM exercise_completions WHERE user_id = ?
        )
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_event_at, insert_user, pool};
    use crate::db::{completions, exercises, sessions};
    use crate::models::{
        CreateCompletionRequest, CreateExerciseRequest, CreateSessionRequest,
    };

    async fn new_completion(pool: &SqlitePool, user: &str) -> String {
        let exercise = exercises::create_exercise(
            pool,
            user,
            &CreateExerciseRequest {
                name: format!("exercise-{}", uuid::Uuid::now_v7()),
                image_ref: None,
                muscle_group_ids: vec![],
                tag_ids: vec![],
                track_reps: None,
                track_weight: None,
                track_distance: None,
                track_duration: None,
                track_resistance: None,
                track_notes: None,
            },
        )
        .await
        .unwrap();
        let session = sessions::create_session(pool, user, &CreateSessionRequest::default())
            .await
            .unwrap();
        completions::create_completion(
            pool,
            user,
            &CreateCompletionRequest {
                session_id: session.id,
                exercise_id: exercise.id,
                note: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn order_index_defaults_to_one() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;
        let completion_id = new_completion(&pool, &user).await;

        let event = create_event(
            &pool,
            &CreateEventRequest {
                completion_id: completion_id.clone(),
                order_index: None,
                reps: Some(8),
                duration_seconds: None,
                weight: None,
                distance: None,
                resistance: None,
                note: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(event.order_index, 1);
    }

    #[tokio::test]
    async fn listing_orders_by_index_then_insertion_time() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;
        let completion_id = new_completion(&pool, &user).await;

        // Inserted as order_index 2, 1, 1; the duplicate 1s keep insertion order.
        let e_two = insert_event_at(&pool, &completion_id, 2, "2026-06-01T10:00:00.000Z").await;
        let e_one_first = insert_event_at(&pool, &completion_id, 1, "2026-06-01T10:01:00.000Z").await;
        let e_one_second = insert_event_at(&pool, &completion_id, 1, "2026-06-01T10:02:00.000Z").await;

        let listed = list_events_for_completion(&pool, &completion_id).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec![&e_one_first[..], &e_one_second[..], &e_two[..]]);
    }

    #[tokio::test]
    async fn events_are_scoped_through_completion_owner() {
        let pool = pool().await;
        let ann = insert_user(&pool, "ann").await;
        let bob = insert_user(&pool, "bob").await;
        let completion_id = new_completion(&pool, &ann).await;

        let event = create_event(
            &pool,
            &CreateEventRequest {
                completion_id,
                order_index: None,
                reps: Some(5),
                duration_seconds: None,
                weight: None,
                distance: None,
                resistance: None,
                note: None,
            },
        )
        .await
        .unwrap();

        assert!(get_event(&pool, &event.id, &ann).await.unwrap().is_some());
        assert!(get_event(&pool, &event.id, &bob).await.unwrap().is_none());
        assert!(!delete_event(&pool, &event.id, &bob).await.unwrap());
        assert!(delete_event(&pool, &event.id, &ann).await.unwrap());
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;
        let completion_id = new_completion(&pool, &user).await;

        let event = create_event(
            &pool,
            &CreateEventRequest {
                completion_id,
                order_index: Some(3),
                reps: Some(10),
                duration_seconds: None,
                weight: Some(60.0),
                distance: None,
                resistance: None,
                note: None,
            },
        )
        .await
        .unwrap();

        let updated = update_event(
            &pool,
            &event.id,
            &user,
            &UpdateEventRequest {
                weight: Some(62.5),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.weight, Some(62.5));
        assert_eq!(updated.reps, Some(10));
        assert_eq!(updated.order_index, 3);
    }
}
