//! Request validation and SSRF guard
//!
//! Pod URLs come straight from users and are later dereferenced by this
//! server, so the host is checked against cloud-metadata endpoints and
//! private address ranges before anything is provisioned.
//!
//! `localhost`/`127.0.0.1` stay allowed: the managed Pod server runs on the
//! same machine in single-host deployments.

use reqwest::Url;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;

use crate::models::{ConnectRequest, SyncRequest};

/// Longest Pod URL accepted, in characters
pub const MAX_POD_URL_LEN: usize = 512;

pub const MAX_TOTAL_XP: i64 = 1_000_000;
pub const MAX_LEVEL: i64 = 100;
pub const MAX_STREAK: i64 = 10_000;
pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_JOURNEY_TYPES: usize = 20;
pub const MAX_JOURNEY_KEY_LEN: usize = 64;
pub const MAX_DIMENSION_SCORES: usize = 50;

/// Host prefixes that are never dereferenced (compared lower-cased)
const BLOCKED_HOST_PREFIXES: &[&str] = &[
    // cloud metadata
    "169.254.169.254",
    "metadata.",
    "instance-data",
    "[fd00:ec2::254]",
    // RFC 1918
    "10.",
    "192.168.",
    "172.16.",
    "172.17.",
    "172.18.",
    "172.19.",
    "172.20.",
    "172.21.",
    "172.22.",
    "172.23.",
    "172.24.",
    "172.25.",
    "172.26.",
    "172.27.",
    "172.28.",
    "172.29.",
    "172.30.",
    "172.31.",
    // unspecified / IPv6 loopback
    "0.0.0.0",
    "[::1]",
    "[0:0:0:0:0:0:0:1]",
    "::1",
    "[::]",
];

/// Rejected request shape; the message is safe to show to the caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("provider must be \"managed\" or \"external\"")]
    UnsupportedProvider(String),

    #[error("pod_url is required")]
    MissingUrl,

    #[error("pod_url must be at most {MAX_POD_URL_LEN} characters")]
    UrlTooLong,

    #[error("pod_url is not a valid URL")]
    MalformedUrl,

    #[error("pod_url must use http or https")]
    UnsupportedScheme,

    #[error("pod_url must include a host")]
    MissingHost,

    #[error("pod_url host is not allowed")]
    BlockedHost,

    #[error("pod_url must not contain credentials, a query or a fragment")]
    UnexpectedUrlParts,

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must have at most {max} entries")]
    TooManyEntries { field: String, max: usize },

    #[error("{field} must be a finite number")]
    NotFinite { field: String },
}

/// Validate a connect request
///
/// Defaults an empty provider to "managed" and replaces `pod_url` with its
/// normalized form (lower-cased host, no trailing `/`).
pub fn validate_connect(request: &mut ConnectRequest) -> Result<(), ValidationError> {
    if request.provider.trim().is_empty() {
        request.provider = "managed".to_string();
    }
    if request.provider != "managed" && request.provider != "external" {
        return Err(ValidationError::UnsupportedProvider(request.provider.clone()));
    }

    let url = validate_pod_url(&request.pod_url)?;
    request.pod_url = url.as_str().trim_end_matches('/').to_string();
    Ok(())
}

/// Validate a user-supplied Pod URL and return it parsed
pub fn validate_pod_url(raw: &str) -> Result<Url, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::MissingUrl);
    }
    if raw.chars().count() > MAX_POD_URL_LEN {
        return Err(ValidationError::UrlTooLong);
    }

    let url = Url::parse(raw).map_err(|_| ValidationError::MalformedUrl)?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::UnsupportedScheme);
    }

    // Resource URLs are built by appending paths to the base
    if !url.username().is_empty()
        || url.password().is_some()
        || url.query().is_some()
        || url.fragment().is_some()
    {
        return Err(ValidationError::UnexpectedUrlParts);
    }

    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h.to_ascii_lowercase(),
        _ => return Err(ValidationError::MissingHost),
    };

    if is_blocked_host(&host) {
        return Err(ValidationError::BlockedHost);
    }

    Ok(url)
}

/// Blocklist check on an already lower-cased host
fn is_blocked_host(host: &str) -> bool {
    if BLOCKED_HOST_PREFIXES.iter().any(|prefix| host.starts_with(prefix)) {
        return true;
    }

    // The URL parser normalizes numeric hosts, so typed checks also catch
    // ranges the prefix list does not spell out (e.g. all of 169.254/16).
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    match bare.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => is_blocked_v4(v4),
        Ok(IpAddr::V6(v6)) => is_blocked_v6(v6),
        Err(_) => false,
    }
}

fn is_blocked_v4(ip: Ipv4Addr) -> bool {
    ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_blocked_v6(ip: Ipv6Addr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }
    match ip.to_ipv4_mapped() {
        Some(v4) => is_blocked_v4(v4),
        None => false,
    }
}

/// Validate the client-supplied parts of a sync request
pub fn validate_sync(request: &SyncRequest) -> Result<(), ValidationError> {
    if let Some(engagement) = &request.engagement {
        check_range("engagement.total_xp", engagement.total_xp, 0, MAX_TOTAL_XP)?;
        check_range("engagement.level", engagement.level, 0, MAX_LEVEL)?;
        check_range("engagement.streak", engagement.streak, 0, MAX_STREAK)?;
        if engagement.title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "engagement.title".to_string(),
                max: MAX_TITLE_LEN,
            });
        }
    }

    if let Some(journeys) = &request.journey_progress {
        if journeys.len() > MAX_JOURNEY_TYPES {
            return Err(ValidationError::TooManyEntries {
                field: "journey_progress".to_string(),
                max: MAX_JOURNEY_TYPES,
            });
        }
        for (journey_type, progress) in journeys {
            if journey_type.chars().count() > MAX_JOURNEY_KEY_LEN {
                return Err(ValidationError::TooLong {
                    field: "journey_progress key".to_string(),
                    max: MAX_JOURNEY_KEY_LEN,
                });
            }
            if progress.dimension_scores.len() > MAX_DIMENSION_SCORES {
                return Err(ValidationError::TooManyEntries {
                    field: format!("journey_progress.{}.dimension_scores", journey_type),
                    max: MAX_DIMENSION_SCORES,
                });
            }
            if let Some((dimension, _)) = progress
                .dimension_scores
                .iter()
                .find(|(_, score)| !score.is_finite())
            {
                return Err(ValidationError::NotFinite {
                    field: format!("journey_progress.{}.{}", journey_type, dimension),
                });
            }
        }
    }

    Ok(())
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, min, max });
    }
    Ok(())
}
