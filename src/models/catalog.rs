//! Catalog entries: muscle groups and tags.
//!
//! Both tables share the same shape, so one struct serves both; the db layer
//! picks the table via [`CatalogKind`]. `user_id = NULL` marks a global
//! default entry that is visible to every user but cannot be edited or
//! deleted through the API. Uniqueness is (user_id, name).

use serde::{Deserialize, Serialize};

/// Which catalog table an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    MuscleGroup,
    Tag,
}

impl CatalogKind {
    pub fn table(self) -> &'static str {
        match self {
            CatalogKind::MuscleGroup => "muscle_groups",
            CatalogKind::Tag => "tags",
        }
    }

    /// Human-readable plural for error messages ("Default tags cannot be edited.").
    pub fn label(self) -> &'static str {
        match self {
            CatalogKind::MuscleGroup => "muscle groups",
            CatalogKind::Tag => "tags",
        }
    }
}

/// One row of `muscle_groups` or `tags`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogEntry {
    pub id: String,
    /// None for global default entries.
    #[serde(skip_serializing)]
    pub user_id: Option<String>,
    pub name: String,
    /// Icon name for the frontend (e.g. "sym_o_rib_cage").
    pub icon: String,
    pub is_default: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Trimmed entry embedded in exercise responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CatalogEntryMini {
    pub id: String,
    pub name: String,
    pub icon: String,
}

/// `POST /muscle-groups` / `POST /tags` request body.
#[derive(Debug, Deserialize)]
pub struct CreateCatalogEntryRequest {
    pub name: String,
    pub icon: Option<String>,
}

/// `PATCH /muscle-groups/{id}` / `PATCH /tags/{id}` request body.
/// Only present fields are applied.
#[derive(Debug, Deserialize)]
pub struct UpdateCatalogEntryRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
}
