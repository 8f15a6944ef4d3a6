//! HTTP Pod client
//!
//! Speaks the Linked Data Platform subset a Solid server needs for this
//! service: PUT for containers and documents, GET for reads, DELETE for
//! removal and a GET against the discovery document for liveness.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LINK};
use reqwest::{StatusCode, Url};
use std::time::Duration;

use super::{PodClient, PodError, PodLocation};

const USER_AGENT: &str = concat!("lxp-ps/", env!("CARGO_PKG_VERSION"));
const TURTLE: &str = "text/turtle";
const BASIC_CONTAINER_LINK: &str = "<http://www.w3.org/ns/ldp#BasicContainer>; rel=\"type\"";
const DISCOVERY_PATH: &str = "/.well-known/solid";

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed Pod client
#[derive(Clone)]
pub struct HttpPodClient {
    http_client: reqwest::Client,
}

impl HttpPodClient {
    pub fn new(timeout: Duration) -> Result<Self, PodError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            // Redirects would let a vetted host bounce requests elsewhere
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| PodError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }

    async fn put_turtle(&self, url: &str, body: String, container: bool) -> Result<StatusCode, PodError> {
        let url = parse_url(url)?;
        let mut request = self
            .http_client
            .put(url.clone())
            .header(CONTENT_TYPE, TURTLE)
            .body(body);
        if container {
            request = request.header(LINK, BASIC_CONTAINER_LINK);
        }

        let response = request.send().await.map_err(|e| transport_error(&url, e))?;
        Ok(response.status())
    }
}

#[async_trait]
impl PodClient for HttpPodClient {
    async fn create_container(&self, pod: &PodLocation, path: &str) -> Result<(), PodError> {
        let url = pod.container_url(path);
        tracing::debug!(url = %url, "Creating pod container");

        match self.put_turtle(&url, String::new(), true).await? {
            status if is_write_success(status) => Ok(()),
            StatusCode::CONFLICT => Err(PodError::AlreadyExists(url)),
            status => Err(PodError::Status {
                status: status.as_u16(),
                url,
            }),
        }
    }

    async fn put_resource(&self, pod: &PodLocation, path: &str, turtle: &str) -> Result<(), PodError> {
        let url = pod.url(path);
        tracing::debug!(url = %url, bytes = turtle.len(), "Writing pod resource");

        match self.put_turtle(&url, turtle.to_string(), false).await? {
            status if is_write_success(status) => Ok(()),
            status => Err(PodError::Status {
                status: status.as_u16(),
                url,
            }),
        }
    }

    async fn get_resource(&self, pod: &PodLocation, path: &str) -> Result<String, PodError> {
        let url = parse_url(&pod.url(path))?;
        tracing::debug!(url = %url, "Reading pod resource");

        let response = self
            .http_client
            .get(url.clone())
            .header(ACCEPT, TURTLE)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PodError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(PodError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| transport_error(&url, e))
    }

    async fn delete_resource(&self, pod: &PodLocation, path: &str) -> Result<(), PodError> {
        let url = parse_url(&pod.url(path))?;
        tracing::debug!(url = %url, "Deleting pod resource");

        let response = self
            .http_client
            .delete(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        match response.status() {
            StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            status => Err(PodError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    async fn ping(&self, server_url: &str) -> Result<(), PodError> {
        let url = parse_url(&format!("{}{}", server_url.trim_end_matches('/'), DISCOVERY_PATH))?;

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        if response.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(PodError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            })
        }
    }
}

fn is_write_success(status: StatusCode) -> bool {
    matches!(status, StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT)
}

fn parse_url(url: &str) -> Result<Url, PodError> {
    Url::parse(url).map_err(|e| PodError::InvalidUrl(format!("{}: {}", url, e)))
}

fn transport_error(url: &Url, err: reqwest::Error) -> PodError {
    if err.is_timeout() {
        PodError::Timeout(url.to_string())
    } else {
        PodError::Network(format!("{}: {}", url, err))
    }
}
