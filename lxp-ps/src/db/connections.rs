//! Pod connection record (`users.pod_*` columns)

use chrono::{DateTime, Utc};
use lxp_common::time::{parse_optional, to_rfc3339};
use lxp_common::{Error, Result};
use sqlx::{Row, SqlitePool};

use crate::models::{PodConnection, PodProvider, SyncStatus};

/// Load the connection record; `None` when the user row does not exist
pub async fn load_connection(pool: &SqlitePool, user_id: &str) -> Result<Option<PodConnection>> {
    let row = sqlx::query(
        r#"
        SELECT id, pod_url, pod_webid, pod_provider, pod_connected_at,
               pod_last_synced_at, pod_sync_status
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let provider: String = row.get("pod_provider");
    let status: String = row.get("pod_sync_status");

    Ok(Some(PodConnection {
        user_id: row.get("id"),
        pod_url: non_empty(row.get("pod_url")),
        webid: non_empty(row.get("pod_webid")),
        provider: provider.parse().map_err(Error::Internal)?,
        connected_at: parse_optional(row.get("pod_connected_at"))?,
        last_synced_at: parse_optional(row.get("pod_last_synced_at"))?,
        sync_status: status.parse().map_err(Error::Internal)?,
    }))
}

/// Overwrite the connection record after a successful connect
///
/// Returns false when no user row matched.
pub async fn save_connection(
    pool: &SqlitePool,
    user_id: &str,
    pod_url: &str,
    webid: &str,
    provider: PodProvider,
    connected_at: &DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users SET
            pod_url = ?,
            pod_webid = ?,
            pod_provider = ?,
            pod_connected_at = ?,
            pod_last_synced_at = NULL,
            pod_sync_status = ?
        WHERE id = ?
        "#,
    )
    .bind(pod_url)
    .bind(webid)
    .bind(provider.as_str())
    .bind(to_rfc3339(connected_at))
    .bind(SyncStatus::Connected.as_str())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Reset every pod column to the disconnected state
pub async fn clear_connection(pool: &SqlitePool, user_id: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users SET
            pod_url = NULL,
            pod_webid = NULL,
            pod_provider = ?,
            pod_connected_at = NULL,
            pod_last_synced_at = NULL,
            pod_sync_status = ?
        WHERE id = ?
        "#,
    )
    .bind(PodProvider::None.as_str())
    .bind(SyncStatus::None.as_str())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record the outcome of a sync run
pub async fn record_sync(
    pool: &SqlitePool,
    user_id: &str,
    synced_at: &DateTime<Utc>,
    status: SyncStatus,
) -> Result<()> {
    sqlx::query(
        "UPDATE users SET pod_last_synced_at = ?, pod_sync_status = ? WHERE id = ?",
    )
    .bind(to_rfc3339(synced_at))
    .bind(status.as_str())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
