//! HTTP surface and per-request orchestration.

mod analyzer;
mod error;
mod http;

pub use analyzer::{EmotionAnalyzer, EmotionRequest, EmotionResponse, DEFAULT_CLASSIFY_TIMEOUT};
pub use error::ApiError;
pub use http::{router, serve, with_service_layers, AppState, HealthResponse, ServiceInfo};
