use crate::config::{CompletionConfig, TRANSCRIPT_PLACEHOLDER};
use crate::error::VoiceError;
use crate::provider::{build_http_client, decode_json, Responder};
use async_trait::async_trait;
use hotline_types::{GeneratedReply, Generation, GenerationFault, Transcript};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

/// Generates the spoken reply for a transcript with a language model.
///
/// Generation is not retried: any failure is returned as a
/// [`Generation::Fault`] whose text is spoken to the caller instead.
#[derive(Debug, Clone)]
pub struct CompletionService {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl CompletionService {
    /// # Errors
    ///
    /// Returns `VoiceError::Config` if the prompt template lacks the
    /// `{transcript}` placeholder or the HTTP client cannot be built.
    pub fn new(config: CompletionConfig) -> Result<Self, VoiceError> {
        if !config.prompt_template.contains(TRANSCRIPT_PLACEHOLDER) {
            return Err(VoiceError::Config(format!(
                "prompt template must contain {}",
                TRANSCRIPT_PLACEHOLDER
            )));
        }
        if config.max_tokens == 0 {
            return Err(VoiceError::Config(
                "max_tokens must be greater than zero".to_string(),
            ));
        }

        let client = build_http_client(config.timeout())?;
        Ok(Self { client, config })
    }

    /// Requests a single completion for `transcript`.
    pub async fn request_reply(&self, transcript: &Transcript) -> Result<GeneratedReply, VoiceError> {
        let body = CompletionRequest {
            model: &self.config.model,
            prompt: self.config.render_prompt(transcript.as_str()),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let completion: CompletionResponse = decode_json(response).await?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or(VoiceError::MissingField("choices[0].text"))?;

        GeneratedReply::new(text).ok_or(VoiceError::MissingField("non-empty completion text"))
    }
}

#[async_trait]
impl Responder for CompletionService {
    async fn generate(&self, transcript: &Transcript) -> Generation {
        match self.request_reply(transcript).await {
            Ok(reply) => {
                debug!(chars = reply.as_str().len(), "reply generated");
                Generation::Reply(reply)
            }
            Err(e) => {
                warn!(error = %e, "generation failed, speaking the fault instead");
                Generation::Fault(GenerationFault::from_cause(&e))
            }
        }
    }
}
