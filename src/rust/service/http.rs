use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};

use super::analyzer::{EmotionAnalyzer, EmotionRequest, EmotionResponse};
use super::error::ApiError;

/// State shared by every handler
pub struct AppState {
    pub analyzer: EmotionAnalyzer,
}

impl AppState {
    pub fn new(analyzer: EmotionAnalyzer) -> Self {
        Self { analyzer }
    }
}

type AppStateArc = Arc<AppState>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: [&'static str; 2],
}

/// Builds the HTTP router with permissive CORS for the browser front-end.
pub fn router(state: AppStateArc) -> Router {
    let routes = Router::new()
        .route("/", get(service_info))
        .route("/api/health", get(health))
        .route("/api/emotion", post(analyze_emotion))
        .with_state(state);
    with_service_layers(routes)
}

/// Wraps `routes` so a panicking handler answers with the generic 500 body
/// and every response carries permissive CORS headers.
pub fn with_service_layers(routes: Router) -> Router {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
}

/// Serves `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        log::info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "SilentAid Backend API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ["/api/health", "/api/emotion"],
    })
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: state.analyzer.model_loaded(),
    })
}

async fn analyze_emotion(
    State(state): State<AppStateArc>,
    body: Bytes,
) -> Result<Json<EmotionResponse>, ApiError> {
    let request = EmotionRequest::from_json(&body)?;
    let response = state.analyzer.analyze(request).await?;
    Ok(Json(response))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let cause = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(format!("handler panicked: {}", cause)).into_response()
}
