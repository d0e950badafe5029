use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("provider request timed out")]
    Timeout,

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode provider response: {0}")]
    Decode(String),

    #[error("provider response has no {0}")]
    MissingField(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("TTS error: {0}")]
    Tts(String),
}

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

impl VoiceError {
    /// Whether a retry could plausibly succeed: timeouts, connection
    /// failures, rate limiting and 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Http(err) => err.is_connect() || err.is_request(),
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Decode(_) | Self::MissingField(_) | Self::Config(_) | Self::Tts(_) => false,
        }
    }
}
