use crate::config::{RetryConfig, SpeechConfig};
use crate::error::VoiceError;
use crate::provider::{build_http_client, decode_json, Synthesizer};
use crate::retry::with_retry;
use async_trait::async_trait;
use hotline_types::SynthesizedAudio;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Maximum text input size for TTS (64 KiB). Prevents resource exhaustion from
/// oversized synthesis requests.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
struct SpeakRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpeakResponse {
    #[serde(default)]
    url: Option<String>,
}

/// Service for generating speech from text.
///
/// The provider renders the audio and hosts it; this service only returns
/// the URL the telephony layer should play.
#[derive(Debug, Clone)]
pub struct TtsService {
    client: reqwest::Client,
    config: SpeechConfig,
    retry: RetryConfig,
}

impl TtsService {
    pub fn new(config: SpeechConfig, retry: RetryConfig) -> Result<Self, VoiceError> {
        if config.voice.trim().is_empty() {
            return Err(VoiceError::Config("TTS voice must not be empty".to_string()));
        }
        let client = build_http_client(config.timeout())?;
        Ok(Self {
            client,
            config,
            retry,
        })
    }

    pub fn voice(&self) -> &str {
        &self.config.voice
    }

    /// Synthesizes `text` with the configured voice and returns the audio URL.
    pub async fn request_speech(&self, text: &str) -> Result<SynthesizedAudio, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::Tts("text must not be empty".to_string()));
        }
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Tts(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let body = SpeakRequest {
            text,
            voice: &self.config.voice,
        };

        let (client, config, body) = (&self.client, &self.config, &body);
        let response: SpeakResponse = with_retry(&self.retry, "synthesis", move || async move {
            let response = client
                .post(&config.speak_url)
                .header(AUTHORIZATION, format!("Token {}", config.api_key))
                .json(body)
                .send()
                .await?;
            decode_json(response).await
        })
        .await?;

        response
            .url
            .and_then(SynthesizedAudio::new)
            .ok_or(VoiceError::MissingField("url"))
    }
}

#[async_trait]
impl Synthesizer for TtsService {
    async fn synthesize(&self, text: &str) -> Option<SynthesizedAudio> {
        match self.request_speech(text).await {
            Ok(audio) => {
                debug!(url = audio.as_str(), "synthesis complete");
                Some(audio)
            }
            Err(e) => {
                warn!(voice = self.voice(), error = %e, "synthesis unavailable");
                None
            }
        }
    }
}
