//! Data structures shared between the db layer and the route handlers.
//!
//! One submodule per domain:
//! - `catalog`: muscle groups and tags (global defaults + per-user entries)
//! - `exercise`: exercise definitions and their tracked-metric flags
//! - `session`: gym sessions (open/closed lifecycle)
//! - `completion`: an exercise performed within a session
//! - `event`: one set/split within a completion
//! - `location`: saved gym locations
//! - `user`: accounts and auth payloads

pub mod catalog;
pub mod completion;
pub mod event;
pub mod exercise;
pub mod location;
pub mod session;
pub mod user;

pub use catalog::*;
pub use completion::*;
pub use event::*;
pub use exercise::*;
pub use location::*;
pub use session::*;
pub use user::*;
