//! HTTP handlers, one submodule per resource.
//!
//! Handlers extract the authenticated user via `AuthUser`, call into the db
//! layer, and translate `None` results into 404s. They hold no business
//! logic of their own beyond request validation.

pub mod auth;
pub mod catalog;
pub mod completions;
pub mod events;
pub mod exercises;
pub mod health;
pub mod locations;
pub mod sessions;

pub use catalog::*;
pub use completions::*;
pub use events::*;
pub use exercises::*;
pub use health::*;
pub use locations::*;
pub use sessions::*;

use sqlx::SqlitePool;

/// Shared application state, cloned into every handler by axum.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt_secret: String,
    /// Invite code required at registration; None disables the check.
    pub signup_access_code: Option<String>,
}
