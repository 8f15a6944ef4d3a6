//! Database initialization
//!
//! Creates the SQLite file on first run and brings the schema up to date.
//! Every statement is `IF NOT EXISTS`, so running this against an existing
//! database is a no-op.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL lets status reads proceed while a sync writes the connection record
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every table and index used by the services
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_skill_profiles_table(pool).await?;
    create_reflections_table(pool).await?;
    Ok(())
}

/// Create the users table
///
/// The `pod_*` columns hold the Pod connection record and are written only by
/// the Pod Sync service.
pub async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            display_name TEXT NOT NULL DEFAULT '',
            pod_url TEXT,
            pod_webid TEXT,
            pod_provider TEXT NOT NULL DEFAULT 'none',
            pod_connected_at TEXT,
            pod_last_synced_at TEXT,
            pod_sync_status TEXT NOT NULL DEFAULT 'none',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the skill_profiles table
///
/// `categories` is a JSON object mapping category name to score.
pub async fn create_skill_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skill_profiles (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            categories TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_skill_profiles_user_created ON skill_profiles(user_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the reflections table
///
/// `capability_scores` is stored exactly as the journal service wrote it.
pub async fn create_reflections_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reflections (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            question_id TEXT NOT NULL,
            response_text TEXT NOT NULL DEFAULT '',
            capability_scores TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reflections_user_created ON reflections(user_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
