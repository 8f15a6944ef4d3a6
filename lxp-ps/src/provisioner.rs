//! Container provisioning
//!
//! Lays out the fixed container tree for a new Pod owner and writes the
//! identity card. Safe to run repeatedly: a container that already exists is
//! treated as created, and the card is a full replace.

use thiserror::Error;

use crate::pod::{PodClient, PodError, PodLocation, CARD_PATH, CONTAINER_PATHS};
use crate::rdf;

/// Provisioning aborted at `path`
#[derive(Debug, Error)]
#[error("failed to provision {path}: {source}")]
pub struct ProvisionError {
    pub path: String,
    #[source]
    pub source: PodError,
}

/// Map an owner key to a URL-safe path segment
///
/// Every character outside `[A-Za-z0-9-]` becomes `-`.
pub fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

/// Create the owner's containers (parents first) and the identity card
pub async fn initialize(client: &dyn PodClient, pod: &PodLocation) -> Result<(), ProvisionError> {
    for path in CONTAINER_PATHS {
        match client.create_container(pod, path).await {
            Ok(()) => {}
            Err(PodError::AlreadyExists(_)) => {
                tracing::debug!(owner = %pod.owner_key(), path = %path, "Container already present");
            }
            Err(source) => {
                return Err(ProvisionError {
                    path: display_path(path),
                    source,
                });
            }
        }
    }

    client
        .put_resource(pod, CARD_PATH, &rdf::identity_card(pod.owner_key()))
        .await
        .map_err(|source| ProvisionError {
            path: CARD_PATH.to_string(),
            source,
        })?;

    tracing::info!(owner = %pod.owner_key(), base = %pod.base(), "Pod containers provisioned");
    Ok(())
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
