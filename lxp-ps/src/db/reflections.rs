//! Journal reflections

use lxp_common::time::{parse_rfc3339, to_rfc3339};
use lxp_common::Result;
use sqlx::{Row, SqlitePool};

use crate::models::ReflectionRow;

/// All reflections of a user, oldest first
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<ReflectionRow>> {
    let rows = sqlx::query(
        r#"
        SELECT id, question_id, response_text, capability_scores, created_at
        FROM reflections
        WHERE user_id = ?
        ORDER BY julianday(created_at) ASC, id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let created_at: String = row.get("created_at");
            Ok(ReflectionRow {
                id: row.get("id"),
                question_id: row.get("question_id"),
                response_text: row.get("response_text"),
                capability_scores: row.get("capability_scores"),
                created_at: parse_rfc3339(&created_at)?,
            })
        })
        .collect()
}

/// Store a reflection (seeding and tests; the journal service owns writes)
pub async fn insert(pool: &SqlitePool, user_id: &str, reflection: &ReflectionRow) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reflections (id, user_id, question_id, response_text, capability_scores, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&reflection.id)
    .bind(user_id)
    .bind(&reflection.question_id)
    .bind(&reflection.response_text)
    .bind(&reflection.capability_scores)
    .bind(to_rfc3339(&reflection.created_at))
    .execute(pool)
    .await?;

    Ok(())
}
