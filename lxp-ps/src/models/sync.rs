//! Sync request/response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Engagement counters supplied by the client at sync time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    pub total_xp: i64,
    pub level: i64,
    pub streak: i64,
    #[serde(default)]
    pub title: String,
}

/// Progress through one journey type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JourneyProgress {
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub stations_completed: i64,
    #[serde(default)]
    pub dimension_scores: BTreeMap<String, f64>,
}

/// Journey type key → progress
pub type JourneyProgressMap = BTreeMap<String, JourneyProgress>;

/// POST /api/pod/sync body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub engagement: Option<EngagementSnapshot>,
    #[serde(default)]
    pub journey_progress: Option<JourneyProgressMap>,
}

/// Aggregated outcome of one sync run
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    /// Steps that were applicable and fully succeeded
    pub synced_entities: u32,
    pub last_synced_at: DateTime<Utc>,
    /// "{step}: {message}" per failed step, in step order
    pub errors: Vec<String>,
}

impl SyncResult {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Raw Turtle documents read back from the Pod
#[derive(Debug, Clone, Default, Serialize)]
pub struct PodData {
    pub profile: BTreeMap<String, Option<String>>,
    pub journey: BTreeMap<String, Option<String>>,
}

/// Outcome of deleting synced resources from the Pod
#[derive(Debug, Clone, Default, Serialize)]
pub struct PurgeResult {
    pub deleted: u32,
    pub errors: Vec<String>,
}
