//! lxp-ps (Pod Sync) - Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lxp_common::config::{load_toml_config, CompiledDefaults, RootFolderInitializer};
use lxp_ps::config::{Cli, ServiceConfig, MODULE_NAME};
use lxp_ps::pod::HttpPodClient;
use lxp_ps::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // TOML is read before tracing exists so its log level can seed the filter;
    // a parse failure is reported once tracing is up.
    let toml = load_toml_config(MODULE_NAME);
    let default_level = toml
        .as_ref()
        .ok()
        .and_then(|t| t.logging.level.clone())
        .unwrap_or_else(|| CompiledDefaults::for_current_platform().log_level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting LXP Pod Sync (lxp-ps) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml = toml.context("Failed to load config file")?;
    let config = ServiceConfig::resolve(&cli, &toml).context("Invalid configuration")?;

    RootFolderInitializer::new(config.root_folder.clone()).ensure_directory_exists()?;
    info!("Database path: {}", config.database_path.display());

    let pool = match lxp_ps::db::init_database_pool(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    match &config.managed_pod_url {
        Some(url) => info!("Managed Pod server: {}", url),
        None => info!("No managed Pod server configured"),
    }

    let client = HttpPodClient::new(config.pod_timeout).context("Failed to build Pod HTTP client")?;
    let state = AppState::new(pool, Arc::new(client), config.pod_settings());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("lxp-ps listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
