//! Skill-profile snapshots

use lxp_common::time::parse_rfc3339;
use lxp_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;

use crate::models::SkillProfileSnapshot;

/// Most recent snapshot by `created_at`, if the user has any
///
/// Compared as instants: rows written by other services may carry offsets.
pub async fn latest_for_user(pool: &SqlitePool, user_id: &str) -> Result<Option<SkillProfileSnapshot>> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, categories, created_at
        FROM skill_profiles
        WHERE user_id = ?
        ORDER BY julianday(created_at) DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let categories: String = row.get("categories");
    let categories: BTreeMap<String, f64> = serde_json::from_str(&categories)
        .map_err(|e| Error::Internal(format!("Failed to deserialize categories: {}", e)))?;
    let created_at: String = row.get("created_at");

    Ok(Some(SkillProfileSnapshot {
        id: row.get("id"),
        user_id: row.get("user_id"),
        categories,
        created_at: parse_rfc3339(&created_at)?,
    }))
}

/// Store a snapshot (seeding and tests; snapshots are produced elsewhere)
pub async fn insert(pool: &SqlitePool, profile: &SkillProfileSnapshot) -> Result<()> {
    let categories = serde_json::to_string(&profile.categories)
        .map_err(|e| Error::Internal(format!("Failed to serialize categories: {}", e)))?;

    sqlx::query(
        "INSERT INTO skill_profiles (id, user_id, categories, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&profile.id)
    .bind(&profile.user_id)
    .bind(categories)
    .bind(lxp_common::time::to_rfc3339(&profile.created_at))
    .execute(pool)
    .await?;

    Ok(())
}
