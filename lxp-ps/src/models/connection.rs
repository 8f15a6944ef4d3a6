//! Pod connection record
//!
//! The record lives in the `pod_*` columns of the `users` row. Its lifecycle:
//! none → connected (Connect) → synced | partial (Sync) → none (Disconnect).
//! Connect may be repeated from any state and simply overwrites the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who operates the Pod server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PodProvider {
    #[default]
    None,
    /// Pod server run alongside this deployment
    Managed,
    /// Pod server chosen by the user
    External,
}

impl PodProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PodProvider::None => "none",
            PodProvider::Managed => "managed",
            PodProvider::External => "external",
        }
    }
}

impl FromStr for PodProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "" => Ok(PodProvider::None),
            "managed" => Ok(PodProvider::Managed),
            "external" => Ok(PodProvider::External),
            other => Err(format!("unknown pod provider '{}'", other)),
        }
    }
}

impl fmt::Display for PodProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the most recent connect/sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    None,
    /// Connected, never synced
    Connected,
    /// Last sync completed without errors
    Synced,
    /// Last sync recorded at least one step error
    Partial,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::None => "none",
            SyncStatus::Connected => "connected",
            SyncStatus::Synced => "synced",
            SyncStatus::Partial => "partial",
        }
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "" => Ok(SyncStatus::None),
            "connected" => Ok(SyncStatus::Connected),
            "synced" => Ok(SyncStatus::Synced),
            "partial" => Ok(SyncStatus::Partial),
            other => Err(format!("unknown sync status '{}'", other)),
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted connection record for one user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodConnection {
    pub user_id: String,
    pub pod_url: Option<String>,
    pub webid: Option<String>,
    pub provider: PodProvider,
    pub connected_at: Option<DateTime<Utc>>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
}

impl PodConnection {
    /// True when both the Pod URL and WebID are recorded
    pub fn is_connected(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.pod_url) && present(&self.webid) && self.provider != PodProvider::None
    }
}

/// Connection status reported to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodStatus {
    pub connected: bool,
    pub provider: PodProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webid: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
}

impl PodStatus {
    /// Status of a user with no usable record
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            provider: PodProvider::None,
            pod_url: None,
            webid: None,
            connected_at: None,
            last_synced_at: None,
            sync_status: SyncStatus::None,
        }
    }
}

impl From<&PodConnection> for PodStatus {
    fn from(record: &PodConnection) -> Self {
        if !record.is_connected() {
            return PodStatus::disconnected();
        }
        Self {
            connected: true,
            provider: record.provider,
            pod_url: record.pod_url.clone(),
            webid: record.webid.clone(),
            connected_at: record.connected_at,
            last_synced_at: record.last_synced_at,
            sync_status: record.sync_status,
        }
    }
}

/// POST /api/pod/connect body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectRequest {
    /// "managed" or "external"; empty means "managed"
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub pod_url: String,
}
