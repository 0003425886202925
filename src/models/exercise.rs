//! Exercise definitions.
//!
//! An exercise belongs to one user and carries a set of `track_*` flags that
//! tell the UI which inputs to show when recording events. Links to muscle
//! groups and tags are many-to-many with set-replacement update semantics.

use serde::{Deserialize, Serialize};

use crate::models::catalog::CatalogEntryMini;

/// One row of `exercises`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Exercise {
    pub id: String,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub name: String,
    /// Optional reference to a stored image (path or URL).
    pub image_ref: Option<String>,
    pub track_reps: bool,
    pub track_weight: bool,
    pub track_distance: bool,
    pub track_duration: bool,
    pub track_resistance: bool,
    pub track_notes: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Exercise plus its catalog links and the last time it was completed.
/// This is what list/get endpoints return.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseResponse {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub muscle_groups: Vec<CatalogEntryMini>,
    pub tags: Vec<CatalogEntryMini>,
    /// Max created_at over all completions of this exercise, any session.
    pub last_completed_at: Option<String>,
}

/// `POST /exercises` request body.
#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    pub name: String,
    pub image_ref: Option<String>,
    #[serde(default)]
    pub muscle_group_ids: Vec<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub track_reps: Option<bool>,
    pub track_weight: Option<bool>,
    pub track_distance: Option<bool>,
    pub track_duration: Option<bool>,
    pub track_resistance: Option<bool>,
    pub track_notes: Option<bool>,
}

/// `PATCH /exercises/{id}` request body. `muscle_group_ids` / `tag_ids`,
/// when present, replace the whole association set.
#[derive(Debug, Deserialize)]
pub struct UpdateExerciseRequest {
    pub name: Option<String>,
    pub image_ref: Option<String>,
    pub muscle_group_ids: Option<Vec<String>>,
    pub tag_ids: Option<Vec<String>>,
    pub track_reps: Option<bool>,
    pub track_weight: Option<bool>,
    pub track_distance: Option<bool>,
    pub track_duration: Option<bool>,
    pub track_resistance: Option<bool>,
    pub track_notes: Option<bool>,
}

/// `GET /exercises` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ExerciseListQuery {
    pub tag_id: Option<String>,
    pub muscle_group_id: Option<String>,
    /// Case-insensitive substring match on exercise, muscle-group, or tag name.
    pub search: Option<String>,
    /// "name" (default) or "recent".
    pub ordering: Option<String>,
}
