//! Transcript, generated reply and synthesized audio values.
//!
//! A [`Transcript`] is never empty, so the generation step can rely on its
//! input. A [`Generation`] is either a reply or a fault, and both carry text
//! that can be spoken back to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-empty, trimmed text recognized from the caller's recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(String);

impl Transcript {
    /// Returns `None` when `text` is empty after trimming.
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reply text produced by the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedReply(String);

impl GeneratedReply {
    /// Returns `None` when the model produced only whitespace.
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A generation failure rendered as text for the caller to hear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFault {
    message: String,
}

impl GenerationFault {
    /// Wraps a provider failure as `Error: {cause}`.
    pub fn from_cause(cause: impl fmt::Display) -> Self {
        Self {
            message: format!("Error: {cause}"),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Outcome of the generation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Generation {
    Reply(GeneratedReply),
    Fault(GenerationFault),
}

impl Generation {
    /// Text handed to the synthesizer, whichever branch this is.
    pub fn spoken_text(&self) -> &str {
        match self {
            Self::Reply(reply) => reply.as_str(),
            Self::Fault(fault) => fault.message(),
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

/// URL of playable audio returned by the speech provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynthesizedAudio(String);

impl SynthesizedAudio {
    /// Returns `None` for an empty URL.
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            None
        } else {
            Some(Self(url))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_url(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_is_trimmed_and_never_empty() {
        assert_eq!(Transcript::new("  hello there \n").unwrap().as_str(), "hello there");
        assert!(Transcript::new("").is_none());
        assert!(Transcript::new(" \t ").is_none());
    }

    #[test]
    fn fault_text_is_spoken() {
        let generation = Generation::Fault(GenerationFault::from_cause("quota exceeded"));
        assert!(generation.is_fault());
        assert_eq!(generation.spoken_text(), "Error: quota exceeded");
    }

    #[test]
    fn reply_text_is_spoken() {
        let generation = Generation::Reply(GeneratedReply::new(" Hi! How can I help? ").unwrap());
        assert!(!generation.is_fault());
        assert_eq!(generation.spoken_text(), "Hi! How can I help?");
    }

    #[test]
    fn empty_audio_url_is_absent() {
        assert!(SynthesizedAudio::new("").is_none());
        assert_eq!(
            SynthesizedAudio::new("https://tts/out1.mp3").unwrap().into_url(),
            "https://tts/out1.mp3"
        );
    }
}
