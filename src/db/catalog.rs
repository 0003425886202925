//! Muscle-group and tag queries. The two tables are interchangeable in shape,
//! so one set of functions serves both via [`CatalogKind`].
//!
//! A user sees global default entries (user_id NULL) alongside their own.
//! Defaults can be linked to exercises but never edited or deleted through
//! the API.

use crate::db::now_utc;
use crate::error::AppError;
use crate::models::{
    CatalogEntry, CatalogKind, CreateCatalogEntryRequest, UpdateCatalogEntryRequest,
};
use sqlx::SqlitePool;

const ENTRY_COLUMNS: &str = "id, user_id, name, icon, is_default, created_at, updated_at";

/// Default entries seeded at startup, with their frontend icon names.
const DEFAULT_TAGS: &[(&str, &str)] = &[
    ("push", "sym_o_arrow_circle_up"),
    ("pull", "sym_o_arrow_circle_down"),
    ("cardio", "sym_o_favorite"),
    ("machine", "sym_o_precision_manufacturing"),
    ("physical therapy", "sym_o_personal_injury"),
];

const DEFAULT_MUSCLE_GROUPS: &[(&str, &str)] = &[
    ("Chest", "sym_o_rib_cage"),
    ("Back", "sym_o_orthopedics"),
    ("Shoulders", "sym_o_person_2"),
    ("Arms", "sym_o_humerus_alt"),
    ("Legs", "sym_o_tibia_alt"),
    ("Core", "sym_o_format_align_center"),
    ("Full Body", "sym_o_all_inclusive"),
    ("Cardio", "sym_o_directions_run"),
];

/// Idempotent seeding of the global default entries. The partial unique
/// indexes on (name) WHERE user_id IS NULL make INSERT OR IGNORE safe to run
/// on every startup.
pub async fn seed_defaults(pool: &SqlitePool) -> Result<(), AppError> {
    for (kind, defaults) in [
        (CatalogKind::Tag, DEFAULT_TAGS),
        (CatalogKind::MuscleGroup, DEFAULT_MUSCLE_GROUPS),
    ] {
        for (name, icon) in defaults {
            sqlx::query(&format!(
                "INSERT OR IGNORE INTO {} (id, user_id, name, icon, is_default) \
                 VALUES (?, NULL, ?, ?, 1)",
                kind.table()
            ))
            .bind(uuid::Uuid::now_v7().to_string())
            .bind(name)
            .bind(icon)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

/// The user's entries plus the global defaults, by name.
pub async fn list_entries(
    pool: &SqlitePool,
    kind: CatalogKind,
    user_id: &str,
) -> Result<Vec<CatalogEntry>, AppError> {
    let entries = sqlx::query_as::<_, CatalogEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM {} \
         WHERE user_id = ? OR user_id IS NULL ORDER BY name",
        kind.table()
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Entry by id, if visible to the user (their own or a default).
pub async fn get_entry(
    pool: &SqlitePool,
    kind: CatalogKind,
    id: &str,
    user_id: &str,
) -> Result<Option<CatalogEntry>, AppError> {
    let entry = sqlx::query_as::<_, CatalogEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM {} \
         WHERE id = ? AND (user_id = ? OR user_id IS NULL)",
        kind.table()
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(entry)
}

pub async fn create_entry(
    pool: &SqlitePool,
    kind: CatalogKind,
    user_id: &str,
    req: &CreateCatalogEntryRequest,
) -> Result<CatalogEntry, AppError> {
    let existing = sqlx::query_as::<_, (String,)>(&format!(
        "SELECT id FROM {} WHERE user_id = ? AND name = ?",
        kind.table()
    ))
    .bind(user_id)
    .bind(&req.name)
    .fetch_optional(pool)
    .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "You already have an entry named '{}'",
            req.name
        )));
    }

    let id = uuid::Uuid::now_v7().to_string();
    sqlx::query(&format!(
        "INSERT INTO {} (id, user_id, name, icon) VALUES (?, ?, ?, ?)",
        kind.table()
    ))
    .bind(&id)
    .bind(user_id)
    .bind(&req.name)
    .bind(req.icon.as_deref().unwrap_or(""))
    .execute(pool)
    .await?;

    get_entry(pool, kind, &id, user_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created entry".to_string()))
}

/// Partial update. Default entries are immutable: attempting to edit one is a
/// validation failure, not a permission one, matching how the API treats them
/// as fixed vocabulary.
pub async fn update_entry(
    pool: &SqlitePool,
    kind: CatalogKind,
    id: &str,
    user_id: &str,
    req: &UpdateCatalogEntryRequest,
) -> Result<Option<CatalogEntry>, AppError> {
    let entry = match get_entry(pool, kind, id, user_id).await? {
        Some(entry) => entry,
        None => return Ok(None),
    };
    if entry.user_id.is_none() {
        return Err(AppError::BadRequest(format!(
            "Default {} cannot be edited.",
            kind.label()
        )));
    }

    if let Some(name) = &req.name {
        sqlx::query(&format!("UPDATE {} SET name = ? WHERE id = ?", kind.table()))
            .bind(name)
            .bind(id)
            .execute(pool)
            .await?;
    }
    if let Some(icon) = &req.icon {
        sqlx::query(&format!("UPDATE {} SET icon = ? WHERE id = ?", kind.table()))
            .bind(icon)
            .bind(id)
            .execute(pool)
            .await?;
    }

    sqlx::query(&format!("UPDATE {} SET updated_at = ? WHERE id = ?", kind.table()))
        .bind(now_utc())
        .bind(id)
        .execute(pool)
        .await?;

    get_entry(pool, kind, id, user_id).await
}

pub async fn delete_entry(
    pool: &SqlitePool,
    kind: CatalogKind,
    id: &str,
    user_id: &str,
) -> Result<bool, AppError> {
    let entry = match get_entry(pool, kind, id, user_id).await? {
        Some(entry) => entry,
        None => return Ok(false),
    };
    if entry.user_id.is_none() {
        return Err(AppError::BadRequest(format!(
            "Default {} cannot be deleted.",
            kind.label()
        )));
    }

    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE id = ? AND user_id = ?",
        kind.table()
    ))
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_user, pool};

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let pool = pool().await;
        seed_defaults(&pool).await.unwrap();
        seed_defaults(&pool).await.unwrap();

        let user = insert_user(&pool, "ann").await;
        let tags = list_entries(&pool, CatalogKind::Tag, &user).await.unwrap();
        assert_eq!(tags.len(), DEFAULT_TAGS.len());
        assert!(tags.iter().all(|t| t.is_default));

        let groups = list_entries(&pool, CatalogKind::MuscleGroup, &user)
            .await
            .unwrap();
        assert_eq!(groups.len(), DEFAULT_MUSCLE_GROUPS.len());
    }

    #[tokio::test]
    async fn users_see_defaults_plus_their_own_entries_only() {
        let pool = pool().await;
        seed_defaults(&pool).await.unwrap();
        let ann = insert_user(&pool, "ann").await;
        let bob = insert_user(&pool, "bob").await;

        create_entry(
            &pool,
            CatalogKind::Tag,
            &ann,
            &CreateCatalogEntryRequest {
                name: "mobility".to_string(),
                icon: None,
            },
        )
        .await
        .unwrap();

        let ann_tags = list_entries(&pool, CatalogKind::Tag, &ann).await.unwrap();
        let bob_tags = list_entries(&pool, CatalogKind::Tag, &bob).await.unwrap();
        assert_eq!(ann_tags.len(), DEFAULT_TAGS.len() + 1);
        assert_eq!(bob_tags.len(), DEFAULT_TAGS.len());
    }

    #[tokio::test]
    async fn default_entries_are_immutable() {
        let pool = pool().await;
        seed_defaults(&pool).await.unwrap();
        let user = insert_user(&pool, "ann").await;

        let default_tag = list_entries(&pool, CatalogKind::Tag, &user)
            .await
            .unwrap()
            .into_iter()
            .find(|t| t.is_default)
            .unwrap();

        let err = update_entry(
            &pool,
            CatalogKind::Tag,
            &default_tag.id,
            &user,
            &UpdateCatalogEntryRequest {
                name: Some("renamed".to_string()),
                icon: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = delete_entry(&pool, CatalogKind::Tag, &default_tag.id, &user)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn own_entries_are_editable_and_deletable() {
        let pool = pool().await;
        let user = insert_user(&pool, "ann").await;

        let entry = create_entry(
            &pool,
            CatalogKind::MuscleGroup,
            &user,
            &CreateCatalogEntryRequest {
                name: "Neck".to_string(),
                icon: None,
            },
        )
        .await
        .unwrap();

        let updated = update_entry(
            &pool,
            CatalogKind::MuscleGroup,
            &entry.id,
            &user,
            &UpdateCatalogEntryRequest {
                name: Some("Traps".to_string()),
                icon: Some("sym_o_fitness_center".to_string()),
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.name, "Traps");
        assert_eq!(updated.icon, "sym_o_fitness_center");

        assert!(delete_entry(&pool, CatalogKind::MuscleGroup, &entry.id, &user)
            .await
            .unwrap());
    }
}
