//! Inbound webhook payload and the audio reference derived from it.

use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Extension appended to recording references. Twilio serves recordings
/// without one and picks the encoding from the suffix.
pub const DEFAULT_AUDIO_EXTENSION: &str = ".wav";

/// The subset of the telephony webhook this service reads.
///
/// Field names follow the provider's form-encoding convention. Every other
/// field in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundCallEvent {
    /// URL of the caller's recorded utterance, without extension.
    #[serde(rename = "RecordingUrl", default)]
    pub recording_url: Option<String>,
    /// Provider identifier of the live call. Only used for log correlation.
    #[serde(rename = "CallSid", default)]
    pub call_sid: Option<String>,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
    #[serde(rename = "To", default)]
    pub to: Option<String>,
}

impl InboundCallEvent {
    /// Returns the recording reference if present and non-blank.
    pub fn recording_reference(&self) -> Option<&str> {
        self.recording_url
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    /// Derives the audio reference handed to the transcription provider.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::MissingRecording`] when the event carries no
    /// recording, or [`TypeError::InvalidAudioReference`] when the result is
    /// not a fully-qualified http(s) URL.
    pub fn audio_reference(&self, extension: &str) -> Result<AudioReference, TypeError> {
        let recording = self
            .recording_reference()
            .ok_or(TypeError::MissingRecording)?;
        AudioReference::from_recording(recording, extension)
    }
}

/// A fully-qualified URL pointing at the caller's audio.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AudioReference(String);

impl AudioReference {
    /// Appends `extension` to `recording` and validates the result.
    pub fn from_recording(recording: &str, extension: &str) -> Result<Self, TypeError> {
        if recording.trim().is_empty() {
            return Err(TypeError::MissingRecording);
        }

        let reference = format!("{recording}{extension}");
        let invalid = |reason: String| TypeError::InvalidAudioReference {
            reference: reference.clone(),
            reason,
        };

        if reference.chars().any(char::is_whitespace) {
            return Err(invalid("contains whitespace".to_string()));
        }

        let parsed = Url::parse(&reference).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }

        Ok(Self(reference))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_extension_verbatim() {
        let reference = AudioReference::from_recording("https://cdn/rec1", ".wav").unwrap();
        assert_eq!(reference.as_str(), "https://cdn/rec1.wav");

        let reference =
            AudioReference::from_recording("https://api.twilio.com/Recordings/RE123", ".mp3")
                .unwrap();
        assert_eq!(reference.as_str(), "https://api.twilio.com/Recordings/RE123.mp3");
    }

    #[test]
    fn rejects_blank_recording() {
        assert_eq!(
            AudioReference::from_recording("   ", ".wav"),
            Err(TypeError::MissingRecording)
        );
    }

    #[test]
    fn rejects_relative_and_non_http_references() {
        assert!(matches!(
            AudioReference::from_recording("/recordings/rec1", ".wav"),
            Err(TypeError::InvalidAudioReference { .. })
        ));
        assert!(matches!(
            AudioReference::from_recording("ftp://cdn/rec1", ".wav"),
            Err(TypeError::InvalidAudioReference { .. })
        ));
        assert!(matches!(
            AudioReference::from_recording("https://cdn/rec 1", ".wav"),
            Err(TypeError::InvalidAudioReference { .. })
        ));
    }

    #[test]
    fn event_without_recording_is_missing() {
        let event = InboundCallEvent {
            call_sid: Some("CA123".to_string()),
            ..Default::default()
        };
        assert_eq!(event.audio_reference(".wav"), Err(TypeError::MissingRecording));

        let event = InboundCallEvent {
            recording_url: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(event.recording_reference(), None);
    }

    #[test]
    fn event_deserializes_provider_field_names() {
        let event: InboundCallEvent = serde_json::from_value(serde_json::json!({
            "RecordingUrl": "https://cdn/rec1",
            "CallSid": "CA1",
            "From": "+15550001",
            "AccountSid": "AC-ignored"
        }))
        .unwrap();

        assert_eq!(event.recording_reference(), Some("https://cdn/rec1"));
        assert_eq!(event.call_sid.as_deref(), Some("CA1"));
        assert_eq!(event.to, None);
    }
}
