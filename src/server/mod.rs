use crate::catalog::{CatalogStore, StoreState};
use crate::config::Config;
use crate::streaming;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    middleware as axum_middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

mod error;
pub mod middleware;
pub mod routes_assets;
pub mod routes_library;

pub use error::AppError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Current library snapshot, replaced on reload
    pub catalog: Arc<CatalogStore>,
}

impl AppContext {
    pub fn new(config: Config, catalog: Arc<CatalogStore>) -> Self {
        Self {
            config: Arc::new(config),
            catalog,
        }
    }

    /// Directory every served file must live under.
    pub fn media_root(&self) -> &Path {
        &self.config.media.root
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
        .expose_headers([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
        ]);

    let lan_only = ctx.config.server.lan_only;

    let mut app = Router::new().nest("/api", api_routes());

    // Serve static files if directory is provided
    // Uses SPA fallback: serves index.html for any route that doesn't match a file
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(ServeFile::new(index_path)),
            );
        } else {
            tracing::warn!("Static directory {:?} does not exist, not serving it", dir);
        }
    }

    if lan_only {
        app = app.layer(axum_middleware::from_fn(middleware::lan_only_middleware));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .with_state(ctx)
}

fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health_check))
        .merge(streaming::stream_router())
        .merge(routes_assets::asset_routes())
        .merge(routes_library::library_routes())
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub config_loaded: bool,
    pub media_root_exists: bool,
    pub collections: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

/// 200 when a library is loaded and the media root exists, 503 otherwise.
async fn health_check(State(ctx): State<AppContext>) -> impl IntoResponse {
    let media_root_exists = tokio::fs::metadata(ctx.media_root())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let (collections, error) = match ctx.catalog.state() {
        StoreState::Loaded(catalog) => (Some(catalog.collections().len()), None),
        StoreState::Error(message) => (None, Some(message)),
        StoreState::Unloaded => (None, Some("Config not loaded".to_string())),
    };

    let healthy = collections.is_some() && media_root_exists;
    let body = HealthStatus {
        status: if healthy { "ok" } else { "unavailable" },
        config_loaded: collections.is_some(),
        media_root_exists,
        collections: collections.unwrap_or(0),
        error,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body))
}

/// Start the HTTP server and run until a shutdown signal arrives.
///
/// `cancel` is triggered once the server has been asked to stop so that
/// background tasks wind down with it.
pub async fn start_server(
    config: Config,
    catalog: Arc<CatalogStore>,
    cancel: CancellationToken,
) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let static_dir = config.server.static_dir.clone();
    let ctx = AppContext::new(config, catalog);
    let app = create_router(ctx, static_dir);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let shutdown = {
        let cancel = cancel.clone();
        async move {
            tokio::select! {
                _ = shutdown_signal() => {},
                _ = cancel.cancelled() => {},
            }
            cancel.cancel();
        }
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
