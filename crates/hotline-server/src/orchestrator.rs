//! The call reply pipeline.
//!
//! One webhook event flows through four steps, strictly in order:
//!
//! 1. derive the audio reference from the recording,
//! 2. transcribe it,
//! 3. generate a reply (a generation fault is still spoken),
//! 4. synthesize the reply to audio,
//!
//! and ends in a [`CallControlResponse`] that plays the audio. The first
//! missing result stops the pipeline with a [`PipelineHalt`], and so does
//! running past the request deadline.

use crate::config::Config;
use hotline_types::{CallControlResponse, InboundCallEvent, TypeError, DEFAULT_AUDIO_EXTENSION};
use hotline_voice::{
    CompletionService, Responder, Synthesizer, SttService, Transcriber, TtsService, VoiceError,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a request ended without a playable reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipelineHalt {
    #[error("webhook carried no recording reference")]
    MissingRecording,
    #[error("recording reference is not a valid audio URL")]
    InvalidAudioReference,
    #[error("transcription unavailable")]
    TranscriptionUnavailable,
    #[error("synthesis unavailable")]
    SynthesisUnavailable,
    #[error("reply not ready within {0:?}")]
    DeadlineExceeded(Duration),
}

impl PipelineHalt {
    /// True when a provider failed on an otherwise valid request.
    pub fn is_upstream(self) -> bool {
        matches!(
            self,
            Self::TranscriptionUnavailable
                | Self::SynthesisUnavailable
                | Self::DeadlineExceeded(_)
        )
    }
}

impl From<TypeError> for PipelineHalt {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::MissingRecording => Self::MissingRecording,
            TypeError::InvalidAudioReference { .. } => Self::InvalidAudioReference,
        }
    }
}

/// Sequences the three provider stages for a single call event.
///
/// Holds no per-request state; one instance serves every request.
pub struct CallOrchestrator {
    transcriber: Arc<dyn Transcriber>,
    responder: Arc<dyn Responder>,
    synthesizer: Arc<dyn Synthesizer>,
    audio_extension: String,
    deadline: Duration,
}

/// Telephony providers give up on a webhook after about 15 seconds.
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(14_000);

impl CallOrchestrator {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        responder: Arc<dyn Responder>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            transcriber,
            responder,
            synthesizer,
            audio_extension: DEFAULT_AUDIO_EXTENSION.to_string(),
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_audio_extension(mut self, extension: impl Into<String>) -> Self {
        self.audio_extension = extension.into();
        self
    }

    /// Bounds the whole pipeline, retries included.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Builds the provider clients described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::Config` if any provider client rejects its
    /// configuration.
    pub fn from_config(config: &Config) -> Result<Self, VoiceError> {
        let transcriber = SttService::new(config.speech.clone(), config.retry.clone())?;
        let responder = CompletionService::new(config.completion.clone())?;
        let synthesizer = TtsService::new(config.speech.clone(), config.retry.clone())?;

        Ok(Self::new(
            Arc::new(transcriber),
            Arc::new(responder),
            Arc::new(synthesizer),
        )
        .with_audio_extension(config.pipeline.audio_extension.clone())
        .with_deadline(config.pipeline.deadline()))
    }

    /// Runs the pipeline for `event`.
    ///
    /// # Errors
    ///
    /// Returns the [`PipelineHalt`] of the first step that produced nothing,
    /// or [`PipelineHalt::DeadlineExceeded`] when the steps run out of time.
    pub async fn respond(
        &self,
        event: &InboundCallEvent,
    ) -> Result<CallControlResponse, PipelineHalt> {
        tokio::time::timeout(self.deadline, self.run_steps(event))
            .await
            .unwrap_or_else(|_| {
                warn!(
                    deadline_ms = self.deadline.as_millis() as u64,
                    "reply deadline exceeded"
                );
                Err(PipelineHalt::DeadlineExceeded(self.deadline))
            })
    }

    async fn run_steps(
        &self,
        event: &InboundCallEvent,
    ) -> Result<CallControlResponse, PipelineHalt> {
        let audio = event.audio_reference(&self.audio_extension).map_err(|e| {
            warn!(error = %e, "rejecting call event");
            PipelineHalt::from(e)
        })?;

        debug!(audio = %audio, "transcribing recording");
        let transcript = self
            .transcriber
            .transcribe(&audio)
            .await
            .ok_or(PipelineHalt::TranscriptionUnavailable)?;

        let generation = self.responder.generate(&transcript).await;
        if generation.is_fault() {
            info!("generation faulted, speaking the fault message");
        }

        let audio_out = self
            .synthesizer
            .synthesize(generation.spoken_text())
            .await
            .ok_or(PipelineHalt::SynthesisUnavailable)?;

        info!(playback = audio_out.as_str(), "reply ready");
        Ok(CallControlResponse::play(audio_out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hotline_types::{
        AudioReference, GeneratedReply, Generation, SynthesizedAudio, Transcript,
    };

    struct Echo;

    #[async_trait]
    impl Transcriber for Echo {
        async fn transcribe(&self, audio: &AudioReference) -> Option<Transcript> {
            Transcript::new(audio.as_str())
        }
    }

    #[async_trait]
    impl Responder for Echo {
        async fn generate(&self, transcript: &Transcript) -> Generation {
            Generation::Reply(GeneratedReply::new(transcript.as_str()).unwrap())
        }
    }

    #[async_trait]
    impl Synthesizer for Echo {
        async fn synthesize(&self, text: &str) -> Option<SynthesizedAudio> {
            SynthesizedAudio::new(format!("{text}.mp3"))
        }
    }

    fn echo_orchestrator() -> CallOrchestrator {
        let echo = Arc::new(Echo);
        CallOrchestrator::new(echo.clone(), echo.clone(), echo)
    }

    fn event(recording: &str) -> InboundCallEvent {
        InboundCallEvent {
            recording_url: Some(recording.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn output_of_each_step_feeds_the_next() {
        let response = echo_orchestrator()
            .respond(&event("https://cdn/rec1"))
            .await
            .unwrap();
        assert_eq!(response.playback_url(), Some("https://cdn/rec1.wav.mp3"));
    }

    #[tokio::test]
    async fn configured_extension_is_appended() {
        let orchestrator = echo_orchestrator().with_audio_extension(".mp3");
        let response = orchestrator.respond(&event("https://cdn/rec1")).await.unwrap();
        assert_eq!(response.playback_url(), Some("https://cdn/rec1.mp3.mp3"));
    }

    #[tokio::test]
    async fn missing_and_invalid_recordings_halt_before_transcription() {
        let orchestrator = echo_orchestrator();

        assert_eq!(
            orchestrator.respond(&InboundCallEvent::default()).await,
            Err(PipelineHalt::MissingRecording)
        );
        assert_eq!(
            orchestrator.respond(&event("not a url")).await,
            Err(PipelineHalt::InvalidAudioReference)
        );
    }

    struct Stalled;

    #[async_trait]
    impl Transcriber for Stalled {
        async fn transcribe(&self, _audio: &AudioReference) -> Option<Transcript> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Transcript::new("too late")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_steps_halt_at_the_deadline() {
        let echo = Arc::new(Echo);
        let orchestrator = CallOrchestrator::new(Arc::new(Stalled), echo.clone(), echo)
            .with_deadline(Duration::from_millis(50));

        assert_eq!(
            orchestrator.respond(&event("https://cdn/rec1")).await,
            Err(PipelineHalt::DeadlineExceeded(Duration::from_millis(50)))
        );
    }

    #[test]
    fn only_provider_halts_are_upstream() {
        assert!(PipelineHalt::TranscriptionUnavailable.is_upstream());
        assert!(PipelineHalt::SynthesisUnavailable.is_upstream());
        assert!(PipelineHalt::DeadlineExceeded(DEFAULT_DEADLINE).is_upstream());
        assert!(!PipelineHalt::MissingRecording.is_upstream());
        assert!(!PipelineHalt::InvalidAudioReference.is_upstream());
    }
}
