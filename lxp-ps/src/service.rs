//! Pod Sync service handle
//!
//! `PodService` bundles the store pool, the Pod client and the tunables.
//! Its operations are implemented in `connection`, `sync`, `reader` and
//! `readiness`. Every operation is request-scoped; the only persistent state
//! is the connection record in the database.

use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::pod::{http::DEFAULT_TIMEOUT, PodClient};

/// Tunables for the Pod Sync operations
#[derive(Debug, Clone)]
pub struct PodSettings {
    /// Pod server operated for the "managed" provider, probed by readiness
    pub managed_pod_url: Option<String>,
    /// Upper bound for each sync step and each read-back
    pub step_timeout: Duration,
}

impl Default for PodSettings {
    fn default() -> Self {
        Self {
            managed_pod_url: None,
            step_timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone)]
pub struct PodService {
    pub(crate) db: SqlitePool,
    pub(crate) client: Arc<dyn PodClient>,
    pub(crate) settings: PodSettings,
}

impl PodService {
    pub fn new(db: SqlitePool, client: Arc<dyn PodClient>, settings: PodSettings) -> Self {
        Self { db, client, settings }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    pub fn settings(&self) -> &PodSettings {
        &self.settings
    }
}
