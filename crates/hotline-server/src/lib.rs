//! Hotline server library logic.

pub mod api;
pub mod config;
pub mod orchestrator;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use config::Config;
use hotline_voice::VoiceError;
use orchestrator::CallOrchestrator;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
///
/// Immutable after startup; requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    /// Reply pipeline.
    pub orchestrator: Arc<CallOrchestrator>,
    /// Spoken when transcription or synthesis is unavailable.
    pub fallback_message: Option<String>,
}

impl AppState {
    pub fn new(orchestrator: CallOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            fallback_message: None,
        }
    }

    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = Some(message.into());
        self
    }

    /// Builds the provider clients and pipeline from `config`.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError` if a provider client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, VoiceError> {
        let orchestrator = CallOrchestrator::from_config(config)?;
        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            fallback_message: config.pipeline.spoken_fallback().map(str::to_string),
        })
    }
}

/// Maximum request body size (64 KiB). Webhook bodies are small forms.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::liveness_handler))
        .route("/health", get(api::health_handler))
        .route("/webhook", post(api::webhook_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
