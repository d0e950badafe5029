//! Call-control documents returned to the telephony provider.
//!
//! Rendered as TwiML: a single `<Response>` root holding one verb.

use crate::speech::SynthesizedAudio;
use serde::Serialize;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// MIME type the telephony provider expects for call-control documents.
pub const TWIML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// What the telephony layer should do next on the live call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verb", rename_all = "snake_case")]
pub enum CallControlResponse {
    /// Play the audio at `url` to the caller.
    Play { url: String },
    /// Speak `text` with the provider's built-in voice.
    Say { text: String },
}

impl CallControlResponse {
    /// Consumes the synthesized audio; each reply is played exactly once.
    pub fn play(audio: SynthesizedAudio) -> Self {
        Self::Play {
            url: audio.into_url(),
        }
    }

    pub fn say(text: impl Into<String>) -> Self {
        Self::Say { text: text.into() }
    }

    /// The playback target, if this document plays audio.
    pub fn playback_url(&self) -> Option<&str> {
        match self {
            Self::Play { url } => Some(url),
            Self::Say { .. } => None,
        }
    }

    pub fn to_twiml(&self) -> String {
        let verb = match self {
            Self::Play { url } => format!("<Play>{}</Play>", xml_escape(url)),
            Self::Say { text } => format!("<Say>{}</Say>", xml_escape(text)),
        };
        format!("{XML_DECLARATION}<Response>{verb}</Response>")
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
