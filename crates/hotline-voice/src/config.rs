use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

fn default_listen_url() -> String {
    "https://api.deepgram.com/v1/listen".to_string()
}

fn default_speak_url() -> String {
    "https://api.deepgram.com/v1/speak".to_string()
}

fn default_voice() -> String {
    "en-US".to_string()
}

fn default_speech_timeout_ms() -> u64 {
    5_000
}

fn default_completion_timeout_ms() -> u64 {
    8_000
}

fn default_completion_url() -> String {
    "https://api.openai.com/v1/completions".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo-instruct".to_string()
}

fn default_prompt_template() -> String {
    "Respond to this: {transcript}".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.7
}

/// Placeholder substituted with the caller's transcript in the prompt template.
pub const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

/// Speech provider settings shared by transcription and synthesis.
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(skip_serializing, default)]
    pub api_key: String,
    #[serde(default = "default_listen_url")]
    pub listen_url: String,
    #[serde(default = "default_speak_url")]
    pub speak_url: String,
    /// Voice/locale used for every synthesis request.
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Per-attempt timeout in milliseconds. Default: 5000.
    #[serde(default = "default_speech_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            listen_url: default_listen_url(),
            speak_url: default_speak_url(),
            voice: default_voice(),
            timeout_ms: default_speech_timeout_ms(),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("api_key", &"[REDACTED]")
            .field("listen_url", &self.listen_url)
            .field("speak_url", &self.speak_url)
            .field("voice", &self.voice)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl SpeechConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Text generation provider settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(skip_serializing, default)]
    pub api_key: String,
    #[serde(default = "default_completion_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Must contain `{transcript}`.
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,
    /// Upper bound on generated tokens. Default: 150.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_completion_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: default_completion_url(),
            model: default_model(),
            prompt_template: default_prompt_template(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_ms: default_completion_timeout_ms(),
        }
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"[REDACTED]")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("prompt_template", &self.prompt_template)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl CompletionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Fills the prompt template with `transcript`.
    pub fn render_prompt(&self, transcript: &str) -> String {
        self.prompt_template
            .replace(TRANSCRIPT_PLACEHOLDER, transcript)
    }
}

/// Bounded retry with exponential backoff for transient provider failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 200,
            backoff_multiplier: 2.0,
            max_backoff_ms: 2_000,
        }
    }
}

impl RetryConfig {
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_keys() {
        let speech = format!("{:?}", SpeechConfig::new("dg-secret"));
        let completion = format!("{:?}", CompletionConfig::new("sk-secret"));

        assert!(!speech.contains("dg-secret"));
        assert!(!completion.contains("sk-secret"));
        assert!(speech.contains("[REDACTED]"));
    }

    #[test]
    fn prompt_wraps_transcript() {
        let config = CompletionConfig::default();
        assert_eq!(
            config.render_prompt("hello there"),
            "Respond to this: hello there"
        );
    }

    #[test]
    fn defaults_match_original_pipeline() {
        let completion = CompletionConfig::default();
        assert_eq!(completion.max_tokens, 150);
        assert!((completion.temperature - 0.7).abs() < f32::EPSILON);

        let speech = SpeechConfig::default();
        assert_eq!(speech.voice, "en-US");
        assert_eq!(speech.timeout_ms, 5_000);
    }
}
