//! Session-level errors.

use thiserror::Error;

/// Things that can go wrong between the socket and the game.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The receive buffer overflowed before a complete frame arrived.
    #[error("receive buffer overflow")]
    Flood,
}
