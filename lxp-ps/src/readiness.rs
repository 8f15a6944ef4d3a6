//! Readiness probe

use serde::Serialize;
use tracing::warn;

use crate::db;
use crate::service::PodService;

pub const REASON_DATABASE_UNAVAILABLE: &str = "database_unavailable";
pub const REASON_POD_SERVER_UNAVAILABLE: &str = "pod_server_unavailable";

/// Whether the service can currently do useful work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl Readiness {
    fn ready() -> Self {
        Self {
            available: true,
            reason: None,
        }
    }

    fn unavailable(reason: &'static str) -> Self {
        Self {
            available: false,
            reason: Some(reason),
        }
    }
}

impl PodService {
    /// Check the store, then the managed Pod server if one is configured
    pub async fn readiness(&self) -> Readiness {
        if let Err(e) = db::ping(&self.db).await {
            warn!(error = %e, "Readiness: database unavailable");
            return Readiness::unavailable(REASON_DATABASE_UNAVAILABLE);
        }

        if let Some(server_url) = &self.settings.managed_pod_url {
            match tokio::time::timeout(self.settings.step_timeout, self.client.ping(server_url)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(server = %server_url, error = %e, "Readiness: pod server unavailable");
                    return Readiness::unavailable(REASON_POD_SERVER_UNAVAILABLE);
                }
                Err(_) => {
                    warn!(server = %server_url, "Readiness: pod server ping timed out");
                    return Readiness::unavailable(REASON_POD_SERVER_UNAVAILABLE);
                }
            }
        }

        Readiness::ready()
    }
}
