//! Database access layer.
//!
//! Every function takes a `&SqlitePool` and, for user-owned entities, the
//! acting user's id; cross-entity queries always filter through the ownership
//! chain (event → completion → session → user). A scoped lookup miss comes
//! back as `None` and is turned into 404 by the route layer.
//!
//! Multi-step writes (auto-close + insert on session create, close-others +
//! open on reopen, link replacement on exercise updates) run inside a single
//! sqlx transaction.

pub mod catalog;
pub mod completions;
pub mod events;
pub mod exercises;
pub mod locations;
pub mod sessions;
pub mod users;

/// Current UTC time formatted the same way as the SQLite column defaults
/// (`strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`), so string comparison stays
/// consistent between server- and database-assigned timestamps.
pub fn now_utc() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
