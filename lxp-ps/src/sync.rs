//! Sync orchestrator
//!
//! Pushes the user's learning state to their Pod in a fixed order:
//!
//! 1. `profile`: identity row → `/profile/state`
//! 2. `skill-profile`: latest snapshot → `/profile/skill-profile` (skipped when none)
//! 3. `engagement`: request data → `/profile/engagement` (when supplied)
//! 4. `journey`: request data → `/journey/vuca-state` (when supplied)
//! 5. `reflections`: every journal row → `/journal/reflections/{id}`
//!
//! A failing step never stops the steps after it. Each step runs under its
//! own timeout (reflections: each row), and the connection record is updated
//! whatever the outcome.

use chrono::{DateTime, Utc};
use lxp_common::time;
use std::future::Future;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db;
use crate::error::PodSyncResult;
use crate::guard;
use crate::models::{
    EngagementSnapshot, JourneyProgressMap, PurgeResult, SyncRequest, SyncResult, SyncStatus,
};
use crate::pod::{
    reflection_path, PodError, PodLocation, ENGAGEMENT_PATH, JOURNEY_PATH, PROFILE_STATE_PATH,
    SKILL_PROFILE_PATH,
};
use crate::rdf;
use crate::service::PodService;

pub const STEP_PROFILE: &str = "profile";
pub const STEP_SKILL_PROFILE: &str = "skill-profile";
pub const STEP_ENGAGEMENT: &str = "engagement";
pub const STEP_JOURNEY: &str = "journey";
pub const STEP_REFLECTIONS: &str = "reflections";

/// Result of one sync step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Everything the step had to write was written
    Written,
    /// Nothing to write (no snapshot, no request data)
    NotApplicable,
    /// Caller-safe failure message
    Failed(String),
}

/// Collects step outcomes into a `SyncResult`
#[derive(Debug, Default)]
pub struct SyncAccumulator {
    synced: u32,
    errors: Vec<String>,
}

impl SyncAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: &str, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Written => self.synced += 1,
            StepOutcome::NotApplicable => debug!(step, "Sync step skipped"),
            StepOutcome::Failed(message) => self.errors.push(format!("{}: {}", step, message)),
        }
    }

    pub fn status(&self) -> SyncStatus {
        if self.errors.is_empty() {
            SyncStatus::Synced
        } else {
            SyncStatus::Partial
        }
    }

    pub fn finish(self, last_synced_at: DateTime<Utc>) -> SyncResult {
        SyncResult {
            synced_entities: self.synced,
            last_synced_at,
            errors: self.errors,
        }
    }
}

/// Caller-safe description of a Pod failure; the full error is logged
pub(crate) fn describe(err: &PodError) -> String {
    match err {
        PodError::NotFound(_) => "resource not found".to_string(),
        PodError::AlreadyExists(_) => "resource conflict".to_string(),
        PodError::Status { status, .. } => format!("pod server returned {}", status),
        PodError::Network(_) => "pod server unreachable".to_string(),
        PodError::Timeout(_) => "timed out".to_string(),
        PodError::InvalidUrl(_) => "invalid pod URL".to_string(),
    }
}

fn write_outcome(step: &str, result: Result<(), PodError>) -> StepOutcome {
    match result {
        Ok(()) => StepOutcome::Written,
        Err(e) => {
            warn!(step, error = %e, "Pod write failed");
            StepOutcome::Failed(describe(&e))
        }
    }
}

/// Driver failures and undecodable rows get different caller-safe messages
fn store_failure(step: &str, err: lxp_common::Error) -> StepOutcome {
    warn!(step, error = %err, "Store read failed during sync");
    match err {
        lxp_common::Error::Database(_) | lxp_common::Error::Io(_) => {
            StepOutcome::Failed("store unavailable".to_string())
        }
        _ => StepOutcome::Failed("malformed stored data".to_string()),
    }
}

impl PodService {
    /// Push the user's state to their Pod
    ///
    /// Fails outright only for invalid input, a missing connection, or when
    /// the store cannot record the outcome. Per-step failures are reported in
    /// `SyncResult::errors`.
    pub async fn sync(&self, user_id: &str, request: SyncRequest) -> PodSyncResult<SyncResult> {
        guard::validate_sync(&request)?;
        let pod = self.require_pod(user_id).await?;

        let sync_id = Uuid::new_v4();
        let started_at = time::now();
        info!(%sync_id, user_id = %user_id, pod = %pod.url(""), "Sync started");

        let mut acc = SyncAccumulator::new();

        let outcome = self.run_step(STEP_PROFILE, self.sync_profile(&pod, user_id, &started_at)).await;
        acc.record(STEP_PROFILE, outcome);

        let outcome = self.run_step(STEP_SKILL_PROFILE, self.sync_skill_profile(&pod, user_id)).await;
        acc.record(STEP_SKILL_PROFILE, outcome);

        let outcome = self
            .run_step(STEP_ENGAGEMENT, self.sync_engagement(&pod, request.engagement.as_ref(), &started_at))
            .await;
        acc.record(STEP_ENGAGEMENT, outcome);

        let outcome = self
            .run_step(STEP_JOURNEY, self.sync_journey(&pod, request.journey_progress.as_ref(), &started_at))
            .await;
        acc.record(STEP_JOURNEY, outcome);

        // Bounded per row instead of per step, so one slow row cannot starve the rest
        let outcome = self.sync_reflections(&pod, user_id).await;
        acc.record(STEP_REFLECTIONS, outcome);

        let status = acc.status();
        let synced_at = time::now();
        db::connections::record_sync(&self.db, user_id, &synced_at, status).await?;

        let result = acc.finish(synced_at);
        info!(
            %sync_id,
            user_id = %user_id,
            synced_entities = result.synced_entities,
            failed_steps = result.errors.len(),
            status = %status,
            "Sync finished"
        );
        Ok(result)
    }

    /// Delete every resource a sync writes
    ///
    /// The container tree and the identity card are left in place so the Pod
    /// stays connected. Individual delete failures are reported, not fatal.
    pub async fn purge(&self, user_id: &str) -> PodSyncResult<PurgeResult> {
        let pod = self.require_pod(user_id).await?;
        let reflections = db::reflections::list_for_user(&self.db, user_id).await?;

        let mut paths: Vec<String> = [PROFILE_STATE_PATH, SKILL_PROFILE_PATH, ENGAGEMENT_PATH, JOURNEY_PATH]
            .iter()
            .map(|p| p.to_string())
            .collect();
        paths.extend(reflections.iter().map(|r| reflection_path(&r.id)));

        let mut result = PurgeResult::default();
        for path in &paths {
            let deleted = tokio::time::timeout(self.settings.step_timeout, self.client.delete_resource(&pod, path))
                .await
                .unwrap_or_else(|_| Err(PodError::Timeout(pod.url(path))));
            match deleted {
                Ok(()) => result.deleted += 1,
                Err(e) => {
                    warn!(user_id = %user_id, path = %path, error = %e, "Pod delete failed");
                    result.errors.push(format!("{}: {}", path, describe(&e)));
                }
            }
        }

        info!(user_id = %user_id, deleted = result.deleted, failed = result.errors.len(), "Pod data purged");
        Ok(result)
    }

    async fn run_step<F>(&self, step: &str, future: F) -> StepOutcome
    where
        F: Future<Output = StepOutcome>,
    {
        match tokio::time::timeout(self.settings.step_timeout, future).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(step, timeout_secs = self.settings.step_timeout.as_secs_f64(), "Sync step timed out");
                StepOutcome::Failed("timed out".to_string())
            }
        }
    }

    async fn sync_profile(&self, pod: &PodLocation, user_id: &str, now: &DateTime<Utc>) -> StepOutcome {
        let user = match db::users::get_identity(&self.db, user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return StepOutcome::Failed("user not found".to_string()),
            Err(e) => return store_failure(STEP_PROFILE, e),
        };
        let turtle = rdf::user_profile(&user, now);
        write_outcome(STEP_PROFILE, self.client.put_resource(pod, PROFILE_STATE_PATH, &turtle).await)
    }

    async fn sync_skill_profile(&self, pod: &PodLocation, user_id: &str) -> StepOutcome {
        let snapshot = match db::skill_profiles::latest_for_user(&self.db, user_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return StepOutcome::NotApplicable,
            Err(e) => return store_failure(STEP_SKILL_PROFILE, e),
        };
        let turtle = rdf::skill_profile(&snapshot);
        write_outcome(
            STEP_SKILL_PROFILE,
            self.client.put_resource(pod, SKILL_PROFILE_PATH, &turtle).await,
        )
    }

    async fn sync_engagement(
        &self,
        pod: &PodLocation,
        engagement: Option<&EngagementSnapshot>,
        now: &DateTime<Utc>,
    ) -> StepOutcome {
        let Some(engagement) = engagement else {
            return StepOutcome::NotApplicable;
        };
        let turtle = rdf::engagement_state(engagement, now);
        write_outcome(STEP_ENGAGEMENT, self.client.put_resource(pod, ENGAGEMENT_PATH, &turtle).await)
    }

    async fn sync_journey(
        &self,
        pod: &PodLocation,
        journeys: Option<&JourneyProgressMap>,
        now: &DateTime<Utc>,
    ) -> StepOutcome {
        let Some(journeys) = journeys else {
            return StepOutcome::NotApplicable;
        };
        let turtle = rdf::journey_progress(journeys, now);
        write_outcome(STEP_JOURNEY, self.client.put_resource(pod, JOURNEY_PATH, &turtle).await)
    }

    /// One write per reflection, each under its own timeout
    ///
    /// Every row is attempted; failures are folded into a single message.
    async fn sync_reflections(&self, pod: &PodLocation, user_id: &str) -> StepOutcome {
        let rows = match db::reflections::list_for_user(&self.db, user_id).await {
            Ok(rows) => rows,
            Err(e) => return store_failure(STEP_REFLECTIONS, e),
        };

        let mut failed = 0usize;
        let mut first_error: Option<String> = None;
        for row in &rows {
            let path = reflection_path(&row.id);
            let turtle = rdf::reflection(row);
            let written = tokio::time::timeout(
                self.settings.step_timeout,
                self.client.put_resource(pod, &path, &turtle),
            )
            .await
            .unwrap_or_else(|_| Err(PodError::Timeout(pod.url(&path))));
            if let Err(e) = written {
                warn!(reflection_id = %row.id, error = %e, "Reflection write failed");
                failed += 1;
                first_error.get_or_insert_with(|| describe(&e));
            }
        }

        match first_error {
            None => StepOutcome::Written,
            Some(first) => StepOutcome::Failed(format!("{} of {} failed; first: {}", failed, rows.len(), first)),
        }
    }
}
