//! Shared fixtures for lxp-ps integration tests

#![allow(dead_code)]

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use lxp_ps::db;
use lxp_ps::models::{ConnectRequest, ReflectionRow, SkillProfileSnapshot, UserIdentity};
use lxp_ps::pod::MemoryPodClient;
use lxp_ps::{PodService, PodSettings};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub const USER_ID: &str = "user@email.com";
pub const OWNER_KEY: &str = "user-email-com";
pub const POD_URL: &str = "https://pod.example.org";

/// In-memory database with the full schema
///
/// A single connection keeps every query on the same in-memory database.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    lxp_common::db::create_schema(&pool).await.expect("schema");
    pool
}

pub struct TestEnv {
    pub pool: SqlitePool,
    pub client: Arc<MemoryPodClient>,
    pub service: PodService,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self::with_settings(PodSettings::default()).await
    }

    pub async fn with_settings(settings: PodSettings) -> Self {
        let pool = memory_pool().await;
        let client = Arc::new(MemoryPodClient::new());
        let service = PodService::new(pool.clone(), client.clone(), settings);
        Self { pool, client, service }
    }

    pub async fn with_step_timeout(timeout: Duration) -> Self {
        Self::with_settings(PodSettings {
            step_timeout: timeout,
            ..PodSettings::default()
        })
        .await
    }

    pub async fn add_user(&self, user_id: &str) {
        db::users::upsert_identity(
            &self.pool,
            &UserIdentity {
                id: user_id.to_string(),
                email: user_id.to_string(),
                display_name: "Ada Learner".to_string(),
            },
        )
        .await
        .expect("insert user");
    }

    pub async fn add_skill_profile(&self, user_id: &str) {
        let mut categories = BTreeMap::new();
        categories.insert("adaptability".to_string(), 0.8);
        categories.insert("collaboration".to_string(), 0.65);
        db::skill_profiles::insert(
            &self.pool,
            &SkillProfileSnapshot {
                id: "sp-1".to_string(),
                user_id: user_id.to_string(),
                categories,
                created_at: Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap(),
            },
        )
        .await
        .expect("insert skill profile");
    }

    pub async fn add_reflections(&self, user_id: &str, ids: &[&str]) {
        let base = Utc.with_ymd_and_hms(2026, 9, 2, 8, 0, 0).unwrap();
        for (i, id) in ids.iter().enumerate() {
            db::reflections::insert(
                &self.pool,
                user_id,
                &ReflectionRow {
                    id: id.to_string(),
                    question_id: format!("q-{}", i + 1),
                    response_text: format!("Reflection number {}", i + 1),
                    capability_scores: r#"{"resilience":0.7}"#.to_string(),
                    created_at: base + ChronoDuration::minutes(i as i64),
                },
            )
            .await
            .expect("insert reflection");
        }
    }

    /// Add the default user and connect them to `POD_URL`
    pub async fn connected_user(&self) {
        self.add_user(USER_ID).await;
        self.service
            .connect(USER_ID, connect_request("external", POD_URL))
            .await
            .expect("connect");
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}{}", POD_URL, OWNER_KEY, path)
    }
}

pub fn connect_request(provider: &str, pod_url: &str) -> ConnectRequest {
    ConnectRequest {
        provider: provider.to_string(),
        pod_url: pod_url.to_string(),
    }
}
