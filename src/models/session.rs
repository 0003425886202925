//! Gym sessions.
//!
//! A session is open while `end_time` is NULL; at most one session per user
//! is open at a time. Creating a new session auto-closes the previous one,
//! and reopening closes whichever other session was open.

use serde::{Deserialize, Serialize};

use crate::models::completion::CompletionResponse;

/// One row of `gym_sessions`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GymSession {
    pub id: String,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub start_time: String,
    /// NULL while the session is in progress.
    pub end_time: Option<String>,
    pub location: String,
    pub note: String,
    pub created_at: String,
    pub updated_at: String,
}

impl GymSession {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Session with `is_open` and its nested completions, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: GymSession,
    pub is_open: bool,
    pub exercise_completions: Vec<CompletionResponse>,
}

/// `POST /sessions` request body. There is no `end_time`: sessions are always
/// created open, and closing goes through the close action.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Defaults to now when absent.
    pub start_time: Option<String>,
    pub location: Option<String>,
    pub note: Option<String>,
}

/// `PATCH /sessions/{id}` request body. Only present fields are applied;
/// `end_time` is managed through close/reopen.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSessionRequest {
    pub start_time: Option<String>,
    pub location: Option<String>,
    pub note: Option<String>,
}

/// `POST /sessions/{id}/close` request body. Without `end_time` the server
/// falls back to the session's latest event timestamp.
#[derive(Debug, Default, Deserialize)]
pub struct CloseSessionRequest {
    pub end_time: Option<String>,
}
