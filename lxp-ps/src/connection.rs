//! Connection manager
//!
//! Connect/disconnect/status lifecycle of a user's Pod connection record.
//! Connect is last-write-wins: a second connect replaces the first record
//! without merging. Disconnect only drops the local pointer; whatever was
//! written to the Pod stays there because the Pod belongs to the user.

use lxp_common::time;
use tracing::info;

use crate::db;
use crate::error::{PodSyncError, PodSyncResult};
use crate::guard::{self, ValidationError};
use crate::models::{ConnectRequest, PodProvider, PodStatus};
use crate::pod::PodLocation;
use crate::provisioner::{self, sanitize};
use crate::service::PodService;

impl PodService {
    /// Validate, provision and persist a new connection
    ///
    /// Nothing is persisted when provisioning fails.
    pub async fn connect(&self, user_id: &str, mut request: ConnectRequest) -> PodSyncResult<PodStatus> {
        guard::validate_connect(&mut request)?;
        let provider: PodProvider = request
            .provider
            .parse()
            .map_err(|_| ValidationError::UnsupportedProvider(request.provider.clone()))?;

        if db::users::get_identity(&self.db, user_id).await?.is_none() {
            return Err(PodSyncError::UserNotFound);
        }

        let pod = PodLocation::new(&request.pod_url, &sanitize(user_id));
        provisioner::initialize(self.client.as_ref(), &pod).await?;

        let webid = pod.webid();
        let updated = db::connections::save_connection(
            &self.db,
            user_id,
            pod.base(),
            &webid,
            provider,
            &time::now(),
        )
        .await?;
        if !updated {
            return Err(PodSyncError::UserNotFound);
        }

        info!(
            user_id = %user_id,
            pod_url = %pod.base(),
            webid = %webid,
            provider = %provider,
            "Pod connected"
        );

        self.status(user_id).await
    }

    /// Forget the connection; remote content is left untouched
    pub async fn disconnect(&self, user_id: &str) -> PodSyncResult<PodStatus> {
        db::connections::clear_connection(&self.db, user_id).await?;
        info!(user_id = %user_id, "Pod disconnected");
        Ok(PodStatus::disconnected())
    }

    /// Current connection state; "not connected" is a normal answer
    pub async fn status(&self, user_id: &str) -> PodSyncResult<PodStatus> {
        let record = db::connections::load_connection(&self.db, user_id).await?;
        Ok(record
            .as_ref()
            .map(PodStatus::from)
            .unwrap_or_else(PodStatus::disconnected))
    }

    /// Where the user's data lives, if connected
    pub async fn pod_location(&self, user_id: &str) -> PodSyncResult<Option<PodLocation>> {
        let record = db::connections::load_connection(&self.db, user_id).await?;
        Ok(record
            .filter(|r| r.is_connected())
            .and_then(|r| r.pod_url)
            .map(|url| PodLocation::new(&url, &sanitize(user_id))))
    }

    /// Like `pod_location`, but absence is an error
    pub(crate) async fn require_pod(&self, user_id: &str) -> PodSyncResult<PodLocation> {
        self.pod_location(user_id).await?.ok_or(PodSyncError::NotConnected)
    }
}
