#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use hotline_server::orchestrator::CallOrchestrator;
use hotline_types::{
    AudioReference, GeneratedReply, Generation, GenerationFault, SynthesizedAudio, Transcript,
};
use hotline_voice::{Responder, Synthesizer, Transcriber};
use std::sync::{Arc, Mutex};

/// Records every input it sees and answers with a fixed result.
pub struct Recorder<T> {
    result: T,
    seen: Mutex<Vec<String>>,
}

impl<T> Recorder<T> {
    pub fn new(result: T) -> Arc<Self> {
        Arc::new(Self {
            result,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    fn record(&self, input: &str) {
        self.seen.lock().unwrap().push(input.to_string());
    }
}

pub type FakeTranscriber = Recorder<Option<&'static str>>;
pub type FakeResponder = Recorder<Result<&'static str, &'static str>>;
pub type FakeSynthesizer = Recorder<Option<&'static str>>;

#[async_trait]
impl Transcriber for Recorder<Option<&'static str>> {
    async fn transcribe(&self, audio: &AudioReference) -> Option<Transcript> {
        self.record(audio.as_str());
        self.result.and_then(Transcript::new)
    }
}

#[async_trait]
impl Responder for Recorder<Result<&'static str, &'static str>> {
    async fn generate(&self, transcript: &Transcript) -> Generation {
        self.record(transcript.as_str());
        match self.result {
            Ok(text) => Generation::Reply(GeneratedReply::new(text).unwrap()),
            Err(cause) => Generation::Fault(GenerationFault::from_cause(cause)),
        }
    }
}

#[async_trait]
impl Synthesizer for Recorder<Option<&'static str>> {
    async fn synthesize(&self, text: &str) -> Option<SynthesizedAudio> {
        self.record(text);
        self.result.and_then(SynthesizedAudio::new)
    }
}

pub struct Fakes {
    pub transcriber: Arc<FakeTranscriber>,
    pub responder: Arc<FakeResponder>,
    pub synthesizer: Arc<FakeSynthesizer>,
}

impl Fakes {
    pub fn new(
        transcript: Option<&'static str>,
        reply: Result<&'static str, &'static str>,
        audio_url: Option<&'static str>,
    ) -> Self {
        Self {
            transcriber: Recorder::new(transcript),
            responder: Recorder::new(reply),
            synthesizer: Recorder::new(audio_url),
        }
    }

    /// The scenario where every provider succeeds.
    pub fn happy() -> Self {
        Self::new(
            Some("hello there"),
            Ok("Hi! How can I help?"),
            Some("https://tts/out1.mp3"),
        )
    }

    pub fn orchestrator(&self) -> CallOrchestrator {
        CallOrchestrator::new(
            self.transcriber.clone(),
            self.responder.clone(),
            self.synthesizer.clone(),
        )
    }
}

pub fn webhook_request(form_body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form_body.to_string()))
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
