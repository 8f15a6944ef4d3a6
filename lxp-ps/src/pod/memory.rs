//! In-memory Pod client
//!
//! Stands in for a Pod server in tests and local development. Documents are
//! keyed by absolute URL, every call is recorded, and failures or delays can
//! be injected for any URL containing a given fragment.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{PodClient, PodError, PodLocation};

/// One recorded call, with the absolute URL it targeted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodOperation {
    CreateContainer(String),
    Put(String),
    Get(String),
    Delete(String),
    Ping(String),
}

impl PodOperation {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            PodOperation::CreateContainer(_) | PodOperation::Put(_) | PodOperation::Delete(_)
        )
    }
}

#[derive(Default)]
struct MemoryState {
    documents: BTreeMap<String, String>,
    containers: BTreeSet<String>,
    failures: Vec<String>,
    delays: Vec<(String, Duration)>,
    operations: Vec<PodOperation>,
    unreachable: bool,
}

/// Map-backed Pod client
#[derive(Default)]
pub struct MemoryPodClient {
    state: Mutex<MemoryState>,
}

impl MemoryPodClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fail every call whose URL contains `fragment` with a 500
    pub fn fail_on(&self, fragment: &str) {
        self.lock().failures.push(fragment.to_string());
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Delay every call whose URL contains `fragment`
    pub fn delay_on(&self, fragment: &str, delay: Duration) {
        self.lock().delays.push((fragment.to_string(), delay));
    }

    /// Make `ping` fail
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Seed a document without recording an operation
    pub fn insert_document(&self, url: &str, turtle: &str) {
        self.lock().documents.insert(url.to_string(), turtle.to_string());
    }

    pub fn document(&self, url: &str) -> Option<String> {
        self.lock().documents.get(url).cloned()
    }

    pub fn document_urls(&self) -> Vec<String> {
        self.lock().documents.keys().cloned().collect()
    }

    pub fn containers(&self) -> Vec<String> {
        self.lock().containers.iter().cloned().collect()
    }

    pub fn operations(&self) -> Vec<PodOperation> {
        self.lock().operations.clone()
    }

    /// Number of container creations, PUTs and DELETEs attempted
    pub fn write_count(&self) -> usize {
        self.lock().operations.iter().filter(|op| op.is_write()).count()
    }

    /// Record the call, apply any injected delay, then any injected failure
    async fn begin(&self, operation: PodOperation, url: &str) -> Result<(), PodError> {
        let delay = {
            let mut state = self.lock();
            state.operations.push(operation);
            state
                .delays
                .iter()
                .find(|(fragment, _)| url.contains(fragment.as_str()))
                .map(|(_, delay)| *delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.lock().failures.iter().any(|fragment| url.contains(fragment.as_str())) {
            return Err(PodError::Status {
                status: 500,
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PodClient for MemoryPodClient {
    async fn create_container(&self, pod: &PodLocation, path: &str) -> Result<(), PodError> {
        let url = pod.container_url(path);
        self.begin(PodOperation::CreateContainer(url.clone()), &url).await?;

        if self.lock().containers.insert(url.clone()) {
            Ok(())
        } else {
            Err(PodError::AlreadyExists(url))
        }
    }

    async fn put_resource(&self, pod: &PodLocation, path: &str, turtle: &str) -> Result<(), PodError> {
        let url = pod.url(path);
        self.begin(PodOperation::Put(url.clone()), &url).await?;

        self.lock().documents.insert(url, turtle.to_string());
        Ok(())
    }

    async fn get_resource(&self, pod: &PodLocation, path: &str) -> Result<String, PodError> {
        let url = pod.url(path);
        self.begin(PodOperation::Get(url.clone()), &url).await?;

        self.lock()
            .documents
            .get(&url)
            .cloned()
            .ok_or(PodError::NotFound(url))
    }

    async fn delete_resource(&self, pod: &PodLocation, path: &str) -> Result<(), PodError> {
        let url = pod.url(path);
        self.begin(PodOperation::Delete(url.clone()), &url).await?;

        self.lock().documents.remove(&url);
        Ok(())
    }

    async fn ping(&self, server_url: &str) -> Result<(), PodError> {
        self.begin(PodOperation::Ping(server_url.to_string()), server_url).await?;

        if self.lock().unreachable {
            Err(PodError::Network(format!("{}: connection refused", server_url)))
        } else {
            Ok(())
        }
    }
}
