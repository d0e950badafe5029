//! Shared request-scoped types for the Hotline voice reply pipeline.
//!
//! Every value in this crate lives for exactly one webhook request: the
//! inbound call event, the audio reference derived from it, the transcript,
//! the generated reply (or its fault), the synthesized audio URL and the
//! call-control document that answers the webhook.
//!
//! Provider clients (`hotline-voice`) and the server (`hotline-server`) only
//! exchange these types, which keeps the dependency graph flat.

pub mod call;
pub mod speech;
pub mod twiml;

pub use call::{AudioReference, InboundCallEvent, DEFAULT_AUDIO_EXTENSION};
pub use speech::{GeneratedReply, Generation, GenerationFault, SynthesizedAudio, Transcript};
pub use twiml::{CallControlResponse, TWIML_CONTENT_TYPE};

use thiserror::Error;

/// Errors raised while constructing request-scoped values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The webhook carried no recording reference.
    #[error("recording reference is missing or empty")]
    MissingRecording,

    /// The derived audio reference is not a fully-qualified http(s) URL.
    #[error("invalid audio reference '{reference}': {reason}")]
    InvalidAudioReference { reference: String, reason: String },
}
