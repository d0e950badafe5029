//! HTTP handlers for the webhook and liveness endpoints.

use crate::AppState;
use axum::{
    extract::{rejection::FormRejection, Extension, Form},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use hotline_types::{CallControlResponse, InboundCallEvent, TWIML_CONTENT_TYPE};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

/// Fixed body of the liveness check.
pub const LIVENESS_MESSAGE: &str = "Hotline voice backend is running!";

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was not a usable webhook, or the pipeline produced no reply.
    #[error("Invalid request")]
    InvalidRequest,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidRequest => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// A call-control document served as TwiML.
#[derive(Debug)]
pub struct TwimlResponse(pub CallControlResponse);

impl IntoResponse for TwimlResponse {
    fn into_response(self) -> Response {
        ([(CONTENT_TYPE, TWIML_CONTENT_TYPE)], self.0.to_twiml()).into_response()
    }
}

/// Handler for `GET /`.
pub async fn liveness_handler() -> &'static str {
    LIVENESS_MESSAGE
}

/// Handler for `GET /health`.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Handler for `POST /webhook`.
///
/// Answers with TwiML that plays the synthesized reply, or with
/// `400 {"error": "Invalid request"}` when the body is not a recording
/// webhook or the pipeline halts. A configured fallback message turns
/// provider halts into a spoken apology instead.
pub async fn webhook_handler(
    Extension(state): Extension<Arc<AppState>>,
    form: Result<Form<InboundCallEvent>, FormRejection>,
) -> Result<TwimlResponse, ApiError> {
    let Form(event) = form.map_err(|rejection| {
        tracing::warn!(error = %rejection, "rejecting malformed webhook body");
        ApiError::InvalidRequest
    })?;

    if event.recording_reference().is_none() {
        tracing::warn!(
            call_sid = event.call_sid.as_deref().unwrap_or("<none>"),
            "webhook has no recording reference"
        );
        return Err(ApiError::InvalidRequest);
    }

    let span = tracing::info_span!(
        "call_reply",
        call_sid = event.call_sid.as_deref().unwrap_or("<none>")
    );

    match state.orchestrator.respond(&event).instrument(span).await {
        Ok(document) => Ok(TwimlResponse(document)),
        Err(halt) => match state.fallback_message.as_deref() {
            Some(message) if halt.is_upstream() => {
                tracing::warn!(%halt, "pipeline halted, speaking fallback message");
                Ok(TwimlResponse(CallControlResponse::say(message)))
            }
            _ => {
                tracing::warn!(%halt, "pipeline halted");
                Err(ApiError::InvalidRequest)
            }
        },
    }
}
