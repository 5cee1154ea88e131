//! HTTP surface: menu, prediction form, dataset table and a JSON aggregation API.
//!
//! - `GET /` and `POST /`: visualization menu and rendered chart
//! - `GET /predict_sales` and `POST /predict_sales`: sales predictor form
//! - `GET /view_dataset`: the whole dataset as an HTML table
//! - `GET /api/aggregation/:tag`: aggregation behind a chart, as JSON
//! - `GET /healthz`: liveness with row count

pub mod handlers;
pub mod pages;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::dataset::Dataset;
use crate::visualization::Dispatcher;

/// Shared, read-only request state.
#[derive(Debug)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub title: String,
    /// Dataset table, rendered once at startup.
    pub dataset_html: String,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, config: &ServerConfig) -> Self {
        let dataset_html = pages::dataset_table(&dataset);
        Self {
            dispatcher: Dispatcher::new(dataset, config.render.clone()),
            title: config.title.clone(),
            dataset_html,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::visualize))
        .route(
            "/predict_sales",
            get(handlers::predict_form).post(handlers::predict),
        )
        .route("/view_dataset", get(handlers::view_dataset))
        .route("/api/aggregation/:tag", get(handlers::aggregation))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}

/// Bind `config.addr` and serve until Ctrl-C.
pub async fn serve(dataset: Arc<Dataset>, config: &ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::new(dataset, config));
    let app = router(state);

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    log::info!(
        "serving {} ({}) at http://{}",
        config.title,
        config.data_path.display(),
        config.addr
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
