//! Bounded retry for the transcription and synthesis calls.

use crate::config::RetryConfig;
use crate::error::VoiceError;
use std::future::Future;
use std::time::Duration;

/// Runs `operation`, retrying transient failures up to `config.max_retries`
/// times with exponential backoff. Permanent failures return immediately.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    stage: &'static str,
    operation: F,
) -> Result<T, VoiceError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, VoiceError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < config.max_retries => {
                let backoff = backoff_for(config, attempt);
                tracing::warn!(
                    stage,
                    attempt = attempt + 1,
                    max = config.max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "retrying after transient provider error"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn backoff_for(config: &RetryConfig, attempt: u32) -> Duration {
    let base = config.initial_backoff_ms as f64 * config.backoff_multiplier.powi(attempt as i32);
    Duration::from_millis(base.min(config.max_backoff_ms as f64) as u64)
}
