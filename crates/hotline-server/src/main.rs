//! Hotline server binary. Answers telephony recording webhooks with a
//! spoken reply.

use hotline_server::config::{self, LoggingConfig};
use hotline_server::{app, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Where the config file path came from.
#[derive(Debug, Clone, Copy)]
enum ConfigOrigin {
    Argument,
    Environment,
    Default,
}

/// First non-blank of: CLI argument, `HOTLINE_CONFIG_PATH`, `config.toml`.
fn config_location() -> (String, ConfigOrigin) {
    let non_blank = |value: &String| !value.trim().is_empty();

    std::env::args()
        .nth(1)
        .filter(non_blank)
        .map(|path| (path, ConfigOrigin::Argument))
        .or_else(|| {
            std::env::var("HOTLINE_CONFIG_PATH")
                .ok()
                .filter(non_blank)
                .map(|path| (path, ConfigOrigin::Environment))
        })
        .unwrap_or_else(|| (DEFAULT_CONFIG_PATH.to_string(), ConfigOrigin::Default))
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() {
    let dotenv_path = dotenvy::dotenv().ok();

    let (config_path, origin) = config_location();
    let config = config::load_config(Some(&config_path))
        .expect("failed to load configuration: the server cannot start without valid config");

    init_tracing(&config.logging);
    tracing::info!(
        path = %config_path,
        origin = ?origin,
        dotenv = dotenv_path.is_some(),
        "configuration loaded"
    );

    for name in config.missing_credentials() {
        tracing::warn!(variable = name, "credential not configured");
    }

    let state = AppState::from_config(&config)
        .expect("failed to build provider clients: check the speech and completion config");

    tracing::info!(
        voice = %config.speech.voice,
        model = %config.completion.model,
        deadline_ms = config.pipeline.deadline_ms,
        fallback = state.fallback_message.is_some(),
        "call pipeline ready"
    );

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address: is another process using this port?");
    tracing::info!(%addr, "hotline listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(stop_requested())
        .await
        .expect("server error");

    tracing::info!("hotline stopped");
}

/// Resolves on Ctrl+C, or on SIGTERM where the platform has it.
async fn stop_requested() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.expect("failed to install Ctrl+C handler");
                tracing::info!(signal = "SIGINT", "draining in-flight calls");
            }
            _ = sigterm.recv() => {
                tracing::info!(signal = "SIGTERM", "draining in-flight calls");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        tracing::info!(signal = "ctrl-c", "draining in-flight calls");
    }
}
