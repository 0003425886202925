//! Exercise events: one set or timed split within a completion.
//!
//! Which metric fields are meaningful is governed by the exercise's `track_*`
//! flags; storage accepts any combination. Events are ordered within a
//! completion by (order_index, created_at, id); duplicate order_index values
//! are allowed and resolve by insertion time.

use serde::{Deserialize, Serialize};

/// One row of `exercise_events`. Ownership derives through the completion's
/// user, not an independent field on the event.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExerciseEvent {
    pub id: String,
    pub completion_id: String,
    pub order_index: i64,
    pub reps: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub weight: Option<f64>,
    pub distance: Option<f64>,
    pub resistance: Option<f64>,
    pub note: String,
    pub created_at: String,
    pub updated_at: String,
}

/// `POST /events` request body. `order_index` defaults to 1; callers are
/// responsible for sequencing.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub completion_id: String,
    pub order_index: Option<i64>,
    pub reps: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub weight: Option<f64>,
    pub distance: Option<f64>,
    pub resistance: Option<f64>,
    pub note: Option<String>,
}

/// `PATCH /events/{id}` request body.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub order_index: Option<i64>,
    pub reps: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub weight: Option<f64>,
    pub distance: Option<f64>,
    pub resistance: Option<f64>,
    pub note: Option<String>,
}

/// `GET /events?completion_id=...` query parameters.
#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    pub completion_id: String,
}
