//! Read-back of synced documents
//!
//! Fetches the raw Turtle the last sync left in the Pod. A document that is
//! missing or unreadable is left out of the result instead of failing the
//! whole read.

use tracing::debug;

use crate::error::PodSyncResult;
use crate::models::PodData;
use crate::pod::{PodError, PodLocation, ENGAGEMENT_PATH, JOURNEY_PATH, PROFILE_STATE_PATH, SKILL_PROFILE_PATH};
use crate::service::PodService;

impl PodService {
    /// Profile documents under `profile`, journey state under `journey`
    pub async fn data(&self, user_id: &str) -> PodSyncResult<PodData> {
        let pod = self.require_pod(user_id).await?;

        let (state, skill_profile, engagement, vuca_state) = tokio::join!(
            self.read_document(&pod, PROFILE_STATE_PATH),
            self.read_document(&pod, SKILL_PROFILE_PATH),
            self.read_document(&pod, ENGAGEMENT_PATH),
            self.read_document(&pod, JOURNEY_PATH),
        );

        let mut data = PodData::default();
        for (name, document) in [("state", state), ("skill-profile", skill_profile), ("engagement", engagement)] {
            if let Some(document) = document {
                data.profile.insert(name.to_string(), Some(document));
            }
        }
        if let Some(document) = vuca_state {
            data.journey.insert("vuca-state".to_string(), Some(document));
        }

        Ok(data)
    }

    async fn read_document(&self, pod: &PodLocation, path: &str) -> Option<String> {
        let result = tokio::time::timeout(self.settings.step_timeout, self.client.get_resource(pod, path))
            .await
            .unwrap_or_else(|_| Err(PodError::Timeout(pod.url(path))));

        match result {
            Ok(document) => Some(document),
            Err(PodError::NotFound(_)) => None,
            Err(e) => {
                debug!(path = %path, error = %e, "Pod read failed; omitting document");
                None
            }
        }
    }
}
