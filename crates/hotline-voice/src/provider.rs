//! Seams between the call orchestrator and the provider clients.

use crate::error::VoiceError;
use async_trait::async_trait;
use hotline_types::{AudioReference, Generation, SynthesizedAudio, Transcript};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Speech-to-text stage. `None` means no usable transcript: the provider
/// failed, timed out, or heard nothing.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &AudioReference) -> Option<Transcript>;
}

/// Text generation stage. Never fails: provider faults come back as
/// [`Generation::Fault`] so they can still be spoken.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn generate(&self, transcript: &Transcript) -> Generation;
}

/// Text-to-speech stage. `None` means no playable audio is available.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Option<SynthesizedAudio>;
}

/// Longest provider error body kept in a [`VoiceError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Rejects non-success responses and decodes the body into `T`.
pub(crate) async fn decode_json<T>(response: reqwest::Response) -> Result<T, VoiceError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(VoiceError::Status {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| VoiceError::Decode(e.to_string()))
}

/// Builds the pooled client a provider service sends every request through.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, VoiceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("hotline/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {}", e)))
}
