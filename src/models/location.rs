//! Saved gym locations, per user. Listed most recently updated first so the
//! frontend can suggest the most likely gym when starting a session.

use serde::{Deserialize, Serialize};

/// One row of `user_locations`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserLocation {
    pub id: String,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// `POST /locations` request body.
#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
}

/// `PATCH /locations/{id}` request body.
#[derive(Debug, Deserialize)]
pub struct UpdateLocationRequest {
    pub name: Option<String>,
}
