//! Service configuration
//!
//! Each setting resolves as command line > environment > TOML file > default.
//! clap covers the first two tiers; the TOML file and defaults are applied in
//! `ServiceConfig::resolve`.

use clap::Parser;
use lxp_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use lxp_common::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::service::PodSettings;

/// Name used for the TOML file and in log lines
pub const MODULE_NAME: &str = "lxp-ps";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5740";
pub const DEFAULT_POD_TIMEOUT_SECS: u64 = 30;

/// Command-line arguments for lxp-ps
#[derive(Parser, Debug, Default)]
#[command(name = "lxp-ps")]
#[command(about = "Pod Sync service: mirrors learner data into user-owned Solid Pods")]
#[command(version)]
pub struct Cli {
    /// Folder holding lxp.db (also LXP_ROOT_FOLDER)
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// Listen address
    #[arg(short, long, env = "LXP_PS_BIND")]
    pub bind: Option<String>,

    /// Pod server operated for the "managed" provider
    #[arg(long, env = "LXP_MANAGED_POD_URL")]
    pub managed_pod_url: Option<String>,

    /// Timeout for each Pod request and sync step, in seconds
    #[arg(long, env = "LXP_POD_TIMEOUT_SECS")]
    pub pod_timeout_secs: Option<u64>,
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub bind_address: SocketAddr,
    pub managed_pod_url: Option<String>,
    pub pod_timeout: Duration,
    pub log_level: Option<String>,
}

impl ServiceConfig {
    pub fn resolve(cli: &Cli, toml: &TomlConfig) -> Result<Self> {
        let root_folder = RootFolderResolver::new(MODULE_NAME)
            .with_cli_arg(cli.root_folder.clone())
            .with_toml(toml)
            .resolve();
        let database_path = RootFolderInitializer::new(root_folder.clone()).database_path();

        let bind = cli
            .bind
            .clone()
            .or_else(|| toml.bind_address.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address: SocketAddr = bind
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

        let timeout_secs = cli
            .pod_timeout_secs
            .or(toml.pod_timeout_secs)
            .unwrap_or(DEFAULT_POD_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("pod_timeout_secs must be greater than zero".to_string()));
        }

        let managed_pod_url = cli
            .managed_pod_url
            .clone()
            .or_else(|| toml.managed_pod_url.clone())
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            root_folder,
            database_path,
            bind_address,
            managed_pod_url,
            pod_timeout: Duration::from_secs(timeout_secs),
            log_level: toml.logging.level.clone(),
        })
    }

    pub fn pod_settings(&self) -> PodSettings {
        PodSettings {
            managed_pod_url: self.managed_pod_url.clone(),
            step_timeout: self.pod_timeout,
        }
    }
}
