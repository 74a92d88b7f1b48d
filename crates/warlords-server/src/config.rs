//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use warlords_protocol::TABLE_SEATS;

/// Fewest players a round can be dealt to: a two-player deal would put
/// 26 cards in a hand, past the fixed 18-card wire field.
pub const MIN_TABLE_PLAYERS: usize = 3;

/// A configuration that violates a hard protocol limit.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("min_players must be between 3 and 7, got {0}")]
    MinPlayersOutOfRange(usize),
}

/// Configuration for a server instance.
///
/// Defaults match how the game is usually hosted; every field can be
/// overridden from the environment (see `main.rs`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: String,

    /// Minimum seated players before a round may start.
    pub min_players: usize,

    /// Once enough players are seated, how long to keep the table open
    /// for stragglers before dealing.
    pub fill_timeout: Duration,

    /// How long the active player has to play before the server passes
    /// for them.
    pub turn_timeout: Duration,

    /// How long the warlord has to answer the swap offer before the
    /// swap is reversed.
    pub swap_timeout: Duration,
}

impl ServerConfig {
    /// Checks the configuration against the wire format's hard limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TABLE_PLAYERS..=TABLE_SEATS).contains(&self.min_players) {
            return Err(ConfigError::MinPlayersOutOfRange(self.min_players));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:36789".to_string(),
            min_players: 3,
            fill_timeout: Duration::from_secs(5),
            turn_timeout: Duration::from_secs(15),
            swap_timeout: Duration::from_secs(15),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.min_players, 3);
        assert_eq!(config.turn_timeout, Duration::from_secs(15));
        assert_eq!(config.swap_timeout, Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_min_players_below_three_is_rejected() {
        for n in [0, 1, 2] {
            let config = ServerConfig { min_players: n, ..Default::default() };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::MinPlayersOutOfRange(_))
            ));
        }
    }

    #[test]
    fn test_min_players_above_the_table_size_is_rejected() {
        let config = ServerConfig { min_players: 8, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
