//! HTTP surface: router, handlers and listener

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{Html, Json};
use axum::routing::{get, post};
use axum::Router;
use farecast_core::{FeatureSchema, ForestModel};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::errors::PredictionError;
use crate::predict::{predict_fares, PredictRequest, PredictResponse};
use crate::{SERVICE_NAME, VERSION};

const INDEX_HTML: &str = include_str!("../assets/index.html");
const PREDICT_HTML: &str = include_str!("../assets/predict.html");

/// Immutable per-process serving state
pub struct AppState {
    model: ForestModel,
    schema: FeatureSchema,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Index the model's feature names once for row building
    pub fn new(model: ForestModel) -> Self {
        let schema = model.schema();
        Self { model, schema }
    }

    pub fn model(&self) -> &ForestModel {
        &self.model
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    service: &'static str,
    model: ModelSummary,
}

#[derive(Debug, Serialize)]
struct ModelSummary {
    trees: usize,
    features: usize,
}

pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let app = build_router(Arc::new(state));
    let listener = bind_listener(addr).await?;
    info!("Fare service listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Fare server terminated unexpectedly")
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await
        }
    }
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind listener on {addr}"))
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/predict", get(handle_predict_page))
        .route("/predict-api", post(handle_predict_api))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn handle_predict_page() -> Html<&'static str> {
    Html(PREDICT_HTML)
}

// The raw body is taken so malformed JSON still gets the error envelope.
async fn handle_predict_api(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, PredictionError> {
    let response = PredictRequest::from_json(&body)
        .and_then(|request| predict_fares(state.model(), state.schema(), &request));

    match response {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            warn!(code = err.code(), "Fare prediction failed: {}", err);
            Err(err)
        }
    }
}

async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: VERSION,
        service: SERVICE_NAME,
        model: ModelSummary {
            trees: state.model().num_trees(),
            features: state.model().num_features(),
        },
    })
}
