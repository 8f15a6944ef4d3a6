//! Identity rows

use sqlx::{Row, SqlitePool};
use lxp_common::Result;

use crate::models::UserIdentity;

/// Load the identity row for a user
pub async fn get_identity(pool: &SqlitePool, user_id: &str) -> Result<Option<UserIdentity>> {
    let row = sqlx::query("SELECT id, email, display_name FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| UserIdentity {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
    }))
}

/// Insert or update an identity row
///
/// Identity is owned by the account service; this exists for seeding and tests.
pub async fn upsert_identity(pool: &SqlitePool, user: &UserIdentity) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, display_name) VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            email = excluded.email,
            display_name = excluded.display_name
        "#,
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.display_name)
    .execute(pool)
    .await?;

    Ok(())
}
