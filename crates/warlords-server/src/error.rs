//! Unified error type for the server binary.

use warlords_engine::PlayError;
use warlords_protocol::WireError;
use warlords_session::SessionError;

use crate::config::ConfigError;

/// Top-level error that wraps the layer-specific ones.
///
/// The `#[from]` variants let `?` convert lower-layer errors
/// automatically; most of these never escape the reactor, which turns
/// them into strikes instead.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Socket-level failure (bind, accept).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A wire-protocol failure.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A game-rule violation.
    #[error(transparent)]
    Play(#[from] PlayError),

    /// A session-level failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A configuration that cannot be served.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_error() {
        let err: ServerError = WireError::BadFrame.into();
        assert!(matches!(err, ServerError::Wire(_)));
    }

    #[test]
    fn test_from_play_error() {
        let err: ServerError = PlayError::OutOfTurn.into();
        assert!(matches!(err, ServerError::Play(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err: ServerError = SessionError::Flood.into();
        assert!(matches!(err, ServerError::Session(_)));
    }
}
