//! Server configuration loading from file and environment variables.

use crate::orchestrator::DEFAULT_DEADLINE;
use hotline_types::DEFAULT_AUDIO_EXTENSION;
use hotline_voice::{CompletionConfig, RetryConfig, SpeechConfig};
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Telephony account the webhook belongs to.
    #[serde(default)]
    pub telephony: TelephonyConfig,

    /// Speech provider (transcription and synthesis).
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Text generation provider.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Retry policy for transcription and synthesis.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Pipeline behavior.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "hotline_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Telephony account credentials.
///
/// The webhook flow never calls the telephony REST API; these are loaded so
/// a deployment can be checked for completeness at startup.
#[derive(Clone, Default, Deserialize)]
pub struct TelephonyConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub phone_number: String,
}

impl fmt::Debug for TelephonyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelephonyConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

/// Pipeline behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Appended to the recording reference to form the audio URL.
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,

    /// Spoken to the caller when transcription or synthesis is unavailable.
    /// When unset or blank, those failures answer with the invalid-request
    /// error.
    #[serde(default)]
    pub fallback_message: Option<String>,

    /// Upper bound on producing one reply, in milliseconds. Default: 14000.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

impl PipelineConfig {
    /// The fallback message, if one is set and not blank.
    pub fn spoken_fallback(&self) -> Option<&str> {
        self.fallback_message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_audio_extension() -> String {
    DEFAULT_AUDIO_EXTENSION.to_string()
}

fn default_deadline_ms() -> u64 {
    DEFAULT_DEADLINE.as_millis() as u64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            audio_extension: default_audio_extension(),
            fallback_message: None,
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl Config {
    /// Names of the provider credentials that are still empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("DEEPGRAM_API_KEY", self.speech.api_key.as_str()),
            ("OPENAI_API_KEY", self.completion.api_key.as_str()),
            ("TWILIO_ACCOUNT_SID", self.telephony.account_sid.as_str()),
            ("TWILIO_AUTH_TOKEN", self.telephony.auth_token.as_str()),
            ("TWILIO_PHONE_NUMBER", self.telephony.phone_number.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies overrides from the process environment.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.pipeline.fallback_message = config.pipeline.spoken_fallback().map(str::to_string);
    Ok(config)
}

/// Applies environment overrides using `lookup` to read variables.
///
/// - `HOTLINE_HOST` / `HOTLINE_PORT` override `server.host` / `server.port`
/// - `HOTLINE_LOG_LEVEL` / `HOTLINE_LOG_JSON` override `logging.*`
/// - `HOTLINE_FALLBACK_MESSAGE` sets `pipeline.fallback_message`
/// - `HOTLINE_DEADLINE_MS` sets `pipeline.deadline_ms`
/// - `DEEPGRAM_API_KEY` sets `speech.api_key`
/// - `OPENAI_API_KEY` / `OPENAI_MODEL` set `completion.api_key` / `completion.model`
/// - `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_PHONE_NUMBER` set `telephony.*`
///
/// Unparseable host/port/deadline values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOTLINE_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = lookup("HOTLINE_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = lookup("HOTLINE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("HOTLINE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(message) = lookup("HOTLINE_FALLBACK_MESSAGE") {
        config.pipeline.fallback_message = Some(message).filter(|m| !m.trim().is_empty());
    }
    if let Some(deadline) = lookup("HOTLINE_DEADLINE_MS") {
        if let Ok(parsed) = deadline.parse() {
            config.pipeline.deadline_ms = parsed;
        }
    }
    if let Some(key) = lookup("DEEPGRAM_API_KEY") {
        config.speech.api_key = key;
    }
    if let Some(key) = lookup("OPENAI_API_KEY") {
        config.completion.api_key = key;
    }
    if let Some(model) = lookup("OPENAI_MODEL") {
        config.completion.model = model;
    }
    if let Some(sid) = lookup("TWILIO_ACCOUNT_SID") {
        config.telephony.account_sid = sid;
    }
    if let Some(token) = lookup("TWILIO_AUTH_TOKEN") {
        config.telephony.auth_token = token;
    }
    if let Some(number) = lookup("TWILIO_PHONE_NUMBER") {
        config.telephony.phone_number = number;
    }
}
