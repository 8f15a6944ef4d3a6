//! Relational store access for lxp-ps
//!
//! Identity, skill-profile and reflection rows are owned by other services
//! and only read here. The `pod_*` columns of `users` are owned by this
//! service.

pub mod connections;
pub mod reflections;
pub mod skill_profiles;
pub mod users;

use sqlx::SqlitePool;
use std::path::Path;

/// Open the shared database and make sure the schema exists
pub async fn init_database_pool(db_path: &Path) -> lxp_common::Result<SqlitePool> {
    lxp_common::db::init_database(db_path).await
}

/// Cheap liveness query used by the readiness probe
pub async fn ping(pool: &SqlitePool) -> lxp_common::Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
