//! Emotion classification backend for live transcript captioning.
//!
//! Transcript text is cleaned of whitespace noise and speech fillers, scored
//! by an ONNX emotion model, and reduced to one of five coarse emotions with
//! display metadata and a confidence.
//!
//! # Basic Usage
//!
//! ```rust
//! use silentaid::{clean_text, EmotionReducer, RawScore};
//!
//! let text = clean_text(Some("I am so um happy today!"));
//! assert_eq!(text, "I am so happy today!");
//!
//! let reducer = EmotionReducer::default();
//! let result = reducer.reduce(&[
//!     RawScore::new("joy", 0.93),
//!     RawScore::new("sadness", 0.02),
//! ]);
//! assert_eq!(result.emotion, "Happy");
//! assert_eq!(result.confidence, 0.93);
//! ```
//!
//! # Serving
//!
//! The classifier and mapping table are built once and shared read-only by
//! every request:
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use silentaid::{router, AppState, EmotionAnalyzer, EmotionModel, EmotionReducer, BuiltinModel};
//!
//! let model = EmotionModel::builder()
//!     .with_model(BuiltinModel::EmotionDistilRoberta)?
//!     .build()?;
//! let analyzer = EmotionAnalyzer::new(Some(Arc::new(model)), EmotionReducer::default());
//! let app = router(Arc::new(AppState::new(analyzer)));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod emotion;
mod runtime;
pub mod model_manager;
pub mod models;
pub mod service;

pub use classifier::{ClassifierError, ClassifierInfo, EmotionModel, EmotionModelBuilder, RawScore, ScoreClassifier, ScoreFunction};
pub use emotion::{clean_text, CategoryInfo, EmotionCategory, EmotionMappingTable, EmotionReducer, EmotionResult};
pub use runtime::{RuntimeConfig, create_session_builder};
pub use model_manager::{ModelManager, ModelError};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo};
pub use service::{router, serve, with_service_layers, ApiError, AppState, EmotionAnalyzer, EmotionRequest, EmotionResponse};

/// Initializes `env_logger`, honouring `RUST_LOG` and defaulting to `info`.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
