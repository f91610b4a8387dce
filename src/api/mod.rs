//! HTTP layer exposing on-demand signal detection.

pub mod routes;
pub mod types;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Settings,
    data::{self, CorpusAccessor},
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub corpus: Arc<dyn CorpusAccessor>,
}

/// Routes without a bound listener, for embedding and tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/signals", get(routes::list_signals))
        .route("/signals/:drug", get(routes::drug_signals))
        .route("/presets", get(routes::list_presets))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(settings: Settings, addr: SocketAddr) -> Result<()> {
    let corpus = data::open_corpus(&settings.corpus_path);
    info!(source = %corpus.describe(), "serving signals from corpus");
    let router = router(AppState { settings, corpus });

    info!(%addr, "serving pv-signals API");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
