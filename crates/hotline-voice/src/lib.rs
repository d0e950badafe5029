//! Provider clients for the Hotline voice reply pipeline.
//!
//! Wraps the three request/response services a call reply depends on:
//! speech-to-text ([`SttService`]), text generation ([`CompletionService`])
//! and text-to-speech ([`TtsService`]). Each client owns a pooled
//! `reqwest::Client` with an explicit timeout, decodes provider payloads into
//! typed schema structs, and reports failures as values rather than panics.
//!
//! The orchestrator in `hotline-server` only sees the [`Transcriber`],
//! [`Responder`] and [`Synthesizer`] traits, so each stage can be swapped for
//! a test double.

pub mod completion;
pub mod config;
pub mod error;
pub mod provider;
pub mod retry;
pub mod stt;
pub mod tts;

pub use completion::CompletionService;
pub use config::{CompletionConfig, RetryConfig, SpeechConfig};
pub use error::VoiceError;
pub use provider::{Responder, Synthesizer, Transcriber};
pub use stt::SttService;
pub use tts::TtsService;
