use crate::config::{RetryConfig, SpeechConfig};
use crate::error::VoiceError;
use crate::provider::{build_http_client, decode_json, Transcriber};
use crate::retry::with_retry;
use async_trait::async_trait;
use hotline_types::{AudioReference, Transcript};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ListenRequest<'a> {
    url: &'a str,
    punctuate: bool,
}

impl<'a> ListenRequest<'a> {
    /// Transcripts are always requested with punctuation.
    fn new(url: &'a str) -> Self {
        Self {
            url,
            punctuate: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListenResponse {
    results: ListenResults,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    channels: Vec<ListenChannel>,
}

#[derive(Debug, Deserialize)]
struct ListenChannel {
    alternatives: Vec<ListenAlternative>,
}

#[derive(Debug, Deserialize)]
struct ListenAlternative {
    transcript: String,
}

impl ListenResponse {
    /// The provider orders alternatives by confidence, so the first
    /// alternative of the first channel is the best guess.
    fn into_best_transcript(self) -> Result<String, VoiceError> {
        self.results
            .channels
            .into_iter()
            .next()
            .and_then(|channel| channel.alternatives.into_iter().next())
            .map(|alternative| alternative.transcript)
            .ok_or(VoiceError::MissingField(
                "results.channels[0].alternatives[0].transcript",
            ))
    }
}

/// Transcribes recorded caller audio through the speech provider's listen
/// endpoint.
#[derive(Debug, Clone)]
pub struct SttService {
    client: reqwest::Client,
    config: SpeechConfig,
    retry: RetryConfig,
}

impl SttService {
    pub fn new(config: SpeechConfig, retry: RetryConfig) -> Result<Self, VoiceError> {
        let client = build_http_client(config.timeout())?;
        Ok(Self {
            client,
            config,
            retry,
        })
    }

    /// Requests a transcript for `audio`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::MissingField` when the payload has no transcript
    /// or the transcript is blank, and the request/status/decode variants for
    /// everything else.
    pub async fn request_transcript(&self, audio: &AudioReference) -> Result<Transcript, VoiceError> {
        let body = ListenRequest::new(audio.as_str());

        let (client, config, body) = (&self.client, &self.config, &body);
        let response: ListenResponse = with_retry(&self.retry, "transcription", move || async move {
            let response = client
                .post(&config.listen_url)
                .header(AUTHORIZATION, format!("Token {}", config.api_key))
                .json(body)
                .send()
                .await?;
            decode_json(response).await
        })
        .await?;

        let text = response.into_best_transcript()?;
        Transcript::new(text).ok_or(VoiceError::MissingField("non-empty transcript"))
    }
}

#[async_trait]
impl Transcriber for SttService {
    async fn transcribe(&self, audio: &AudioReference) -> Option<Transcript> {
        match self.request_transcript(audio).await {
            Ok(transcript) => {
                debug!(chars = transcript.as_str().len(), "transcription complete");
                Some(transcript)
            }
            Err(e) => {
                warn!(audio = %audio, error = %e, "transcription unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_transcript_is_first_alternative_of_first_channel() {
        let response: ListenResponse = serde_json::from_value(serde_json::json!({
            "metadata": { "request_id": "abc" },
            "results": {
                "channels": [
                    { "alternatives": [
                        { "transcript": "hello there", "confidence": 0.98 },
                        { "transcript": "hollow hair", "confidence": 0.41 }
                    ] },
                    { "alternatives": [ { "transcript": "second channel" } ] }
                ]
            }
        }))
        .unwrap();

        assert_eq!(response.into_best_transcript().unwrap(), "hello there");
    }

    #[test]
    fn empty_channel_list_is_a_missing_field() {
        let response: ListenResponse =
            serde_json::from_value(serde_json::json!({ "results": { "channels": [] } })).unwrap();

        assert!(matches!(
            response.into_best_transcript(),
            Err(VoiceError::MissingField(_))
        ));
    }

    #[test]
    fn listen_request_always_asks_for_punctuation() {
        let body = serde_json::to_value(ListenRequest::new("https://cdn/rec1.wav")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "url": "https://cdn/rec1.wav", "punctuate": true })
        );
    }

    #[test]
    fn payload_without_results_fails_to_decode() {
        let decoded = serde_json::from_value::<ListenResponse>(serde_json::json!({ "err": "x" }));
        assert!(decoded.is_err());
    }
}
