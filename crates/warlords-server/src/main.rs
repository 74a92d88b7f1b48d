//! Server binary: configuration from the environment, then run.

use std::env;
use std::time::Duration;

use warlords_server::{GameServer, ServerConfig, ServerError};

fn duration_var(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

fn config_from_env() -> ServerConfig {
    let mut config = ServerConfig::default();
    if let Ok(addr) = env::var("WARLORDS_ADDR") {
        config.bind_addr = addr;
    }
    if let Some(n) = env::var("WARLORDS_MIN_PLAYERS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.min_players = n;
    }
    if let Some(d) = duration_var("WARLORDS_FILL_TIMEOUT_SECS") {
        config.fill_timeout = d;
    }
    if let Some(d) = duration_var("WARLORDS_TURN_TIMEOUT_SECS") {
        config.turn_timeout = d;
    }
    if let Some(d) = duration_var("WARLORDS_SWAP_TIMEOUT_SECS") {
        config.swap_timeout = d;
    }
    config
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = config_from_env();
    let server = GameServer::bind(config).await?;
    tracing::info!(addr = %server.local_addr()?, "game server started");
    server.run().await
}
