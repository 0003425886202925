//! Exercise completions: one exercise performed within one session.

use serde::{Deserialize, Serialize};

use crate::models::event::ExerciseEvent;
use crate::models::exercise::Exercise;

/// One row of `exercise_completions`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExerciseCompletion {
    pub id: String,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub session_id: String,
    pub exercise_id: String,
    pub note: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Completion with its exercise and events expanded, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResponse {
    #[serde(flatten)]
    pub completion: ExerciseCompletion,
    pub exercise: Exercise,
    pub events: Vec<ExerciseEvent>,
}

/// `POST /exercise-completions` request body. Completions may be attached to
/// closed sessions; no open-session check is made.
#[derive(Debug, Deserialize)]
pub struct CreateCompletionRequest {
    pub session_id: String,
    pub exercise_id: String,
    pub note: Option<String>,
}

/// `PATCH /exercise-completions/{id}` request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCompletionRequest {
    pub note: Option<String>,
}

/// Projection of the latest event's metrics, used to prefill the next-set
/// form. Absent fields are omitted, so a completion with no events serializes
/// as an empty object.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PrefillValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
}
