//! dfd-dash - deepfake detection dashboard service
//!
//! Boots the dashboard engine, optionally checks the images given on the
//! command line, and serves the HTTP/SSE API.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dfd_common::config::{ConfigOverrides, ConfigResolver};
use dfd_dash::charts::HeadlessChartBackend;
use dfd_dash::classifier::HttpClassifier;
use dfd_dash::{build_router, AppState, Dashboard};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "dfd-dash")]
#[command(about = "Deepfake detection dashboard service")]
#[command(version)]
struct Args {
    /// Configuration file (default: platform config dir, or DFD_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP port (overrides DFD_PORT and config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Classification endpoint (overrides DFD_BACKEND_URL and config file)
    #[arg(short, long)]
    backend_url: Option<String>,

    /// Image to check at startup (repeatable)
    #[arg(short, long = "image")]
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = ConfigResolver::new(ConfigOverrides {
        config_path: args.config.clone(),
        backend_url: args.backend_url.clone(),
        port: args.port,
    });
    let resolved = resolver.resolve_with_warnings();
    let config = resolved.config;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(&config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Resolution ran before the subscriber existed
    for warning in &resolved.warnings {
        warn!("{}", warning);
    }

    info!("Starting dfd-dash on port {}", config.port);
    if let Some(path) = resolver.config_path() {
        info!("Config file: {}", path.display());
    }
    info!("Classification backend: {}", config.backend_url);

    let classifier = HttpClassifier::new(config.backend_url.clone(), config.timing.request_timeout())
        .context("Failed to build classification client")?;
    let dashboard = Dashboard::new(
        &config,
        Arc::new(classifier),
        Box::new(HeadlessChartBackend::new()),
    );
    dashboard.boot().await;

    for image in &args.images {
        let image_id = image_id_for(image);
        dashboard.register_image(&image_id).await;
        dashboard.spawn_check(image.to_string_lossy().to_string(), image_id);
    }
    if !args.images.is_empty() {
        info!("Checking {} startup image(s)", args.images.len());
    }

    let app = build_router(AppState::new(dashboard.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let cancelled = dashboard.cancel_all().await;
    info!("Server shutdown complete ({} request(s) cancelled)", cancelled);
    Ok(())
}

/// Default tracing directive for the workspace crates at `level`
fn default_filter(level: &str) -> String {
    format!("dfd_dash={level},dfd_common={level},tower_http=info", level = level)
}

/// Image identifier for a startup image: the path as given, minus a leading `./`
///
/// The whole path keeps ids unique when files in different directories share
/// a name (`Fake/001.jpg`, `Real/001.jpg`).
fn image_id_for(path: &Path) -> String {
    let id = path.to_string_lossy();
    id.strip_prefix("./").unwrap_or(&id).to_string()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
