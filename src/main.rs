mod api;
mod build_definition;
mod config;
mod error;
mod github;
mod import;
mod provider;
mod registry;
#[cfg(test)]
mod test_utils;
mod trust;

use api::AppState;
use clap::Parser;
use config::Config;
use github::GitHubSource;
use registry::client::HttpRegistryClient;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trust::TrustStore;

#[derive(Parser)]
#[command(
    name = "wharf-github-import",
    version,
    about = "Imports GitHub repositories into the Wharf registry"
)]
struct Cli {
    #[arg(long, short, help = "Path to a TOML config file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Address to listen on, overrides http.bind_address")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config)?;
    if let Some(bind) = cli.bind {
        config.http.bind_address = bind;
    }

    init_tracing(&config);

    let trust = TrustStore::load(&config.trust())?;
    let registry = HttpRegistryClient::new(trust.http_client()?, &config.registry_endpoint(), None)?;
    let state = AppState {
        registry,
        source: Arc::new(GitHubSource::new(&trust)?),
    };
    let app = api::router(state, config.http.cors.allow_all_origins);

    let listener = TcpListener::bind(config.http.bind_address.as_str()).await?;
    tracing::info!(
        address = %config.http.bind_address,
        registry = %config.api.url,
        cors = config.http.cors.allow_all_origins,
        extra_certs = trust.has_extra_certs(),
        "listening for import requests"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// RUST_LOG wins over `log.level`.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    if config.log.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
