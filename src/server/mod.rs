// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

//! HTTP API.
//!
//! ```text
//! POST /api/split_bill   multipart: user_bill_context, image
//! POST /api/heartbeat
//! GET  /data/{*path}     files under server.storage_path
//! ```

mod cors;
mod handlers;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Config, ServerConfig};
use crate::error::{Error, Result};
use crate::services::extractor::BillExtractor;
use crate::services::heartbeat::MongoHeartbeat;

pub use cors::build_cors_layer;

/// Router state injected into every handler.
///
/// Cheap to clone; everything is reference-counted and immutable.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<BillExtractor>,
    pub heartbeat: Arc<MongoHeartbeat>,
}

impl AppState {
    pub fn new(extractor: BillExtractor, heartbeat: MongoHeartbeat) -> Self {
        Self {
            extractor: Arc::new(extractor),
            heartbeat: Arc::new(heartbeat),
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            BillExtractor::from_config(config)?,
            MongoHeartbeat::new(&config.mongo).await,
        ))
    }
}

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let storage = ServeDir::new(&config.storage_path).append_index_html_on_directories(false);

    Router::new()
        .route("/api/split_bill", post(handlers::split_bill))
        .route("/api/heartbeat", post(handlers::heartbeat))
        .nest_service("/data", storage)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(build_cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the storage directory if needed.
pub async fn prepare_storage(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

/// Serve until `shutdown` is cancelled.
pub async fn serve(config: &Config, state: AppState, shutdown: CancellationToken) -> Result<()> {
    prepare_storage(&config.server.storage_path).await?;

    let bind_addr = config.server.bind_addr();
    let app = router(state, &config.server);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| Error::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(
        %bind_addr,
        storage = %config.server.storage_path.display(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| Error::Server(format!("server error: {e}")))?;

    info!("server shut down");
    Ok(())
}
