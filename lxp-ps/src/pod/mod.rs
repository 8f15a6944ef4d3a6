//! Pod client
//!
//! Transport abstraction over a remote Solid Pod server. The trait is the
//! seam between the sync logic and the network: `HttpPodClient` talks LDP
//! over HTTP, `MemoryPodClient` keeps documents in a map for tests.
//!
//! Implementations never retry; every call is a single request bounded by a
//! per-call timeout. Retrying is the caller's decision.

pub mod http;
pub mod memory;

pub use http::HttpPodClient;
pub use memory::MemoryPodClient;

use async_trait::async_trait;
use thiserror::Error;

/// Identity document written during provisioning
pub const CARD_PATH: &str = "/profile/card";
/// Snapshot of the identity row
pub const PROFILE_STATE_PATH: &str = "/profile/state";
pub const SKILL_PROFILE_PATH: &str = "/profile/skill-profile";
pub const ENGAGEMENT_PATH: &str = "/profile/engagement";
pub const JOURNEY_PATH: &str = "/journey/vuca-state";
pub const REFLECTIONS_CONTAINER: &str = "/journal/reflections";

/// Containers created for a new owner, parents first
pub const CONTAINER_PATHS: &[&str] = &["", "/profile", "/journey", "/journal", REFLECTIONS_CONTAINER];

/// Path of one reflection resource
pub fn reflection_path(reflection_id: &str) -> String {
    format!("{}/{}", REFLECTIONS_CONTAINER, urlencoding::encode(reflection_id))
}

/// Pod client errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PodError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("container already exists: {0}")]
    AlreadyExists(String),

    #[error("pod server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid pod URL: {0}")]
    InvalidUrl(String),
}

/// Where a user's data lives: `{base}/{owner_key}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodLocation {
    base: String,
    owner_key: String,
}

impl PodLocation {
    pub fn new(base: &str, owner_key: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            owner_key: owner_key.to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn owner_key(&self) -> &str {
        &self.owner_key
    }

    /// Absolute URL of a resource under the owner's root
    ///
    /// `path` is either empty (the root itself) or starts with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}{}", self.base, self.owner_key, path)
    }

    /// Absolute URL of a container; LDP container URLs end in `/`
    pub fn container_url(&self, path: &str) -> String {
        format!("{}/", self.url(path))
    }

    /// WebID of the owner
    pub fn webid(&self) -> String {
        format!("{}#me", self.url(CARD_PATH))
    }
}

/// Capability set of a remote Pod server
#[async_trait]
pub trait PodClient: Send + Sync {
    /// Create an LDP BasicContainer
    ///
    /// Returns `PodError::AlreadyExists` when the server reports a conflict.
    async fn create_container(&self, pod: &PodLocation, path: &str) -> Result<(), PodError>;

    /// Replace a resource with a Turtle document
    async fn put_resource(&self, pod: &PodLocation, path: &str, turtle: &str) -> Result<(), PodError>;

    /// Fetch a Turtle document; `PodError::NotFound` when absent
    async fn get_resource(&self, pod: &PodLocation, path: &str) -> Result<String, PodError>;

    /// Delete a resource; deleting something already gone succeeds
    async fn delete_resource(&self, pod: &PodLocation, path: &str) -> Result<(), PodError>;

    /// Liveness probe against the server's discovery document
    async fn ping(&self, server_url: &str) -> Result<(), PodError>;
}
