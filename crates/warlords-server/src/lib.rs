//! The Warlords & Scumbags game server.
//!
//! Layers, bottom to top:
//!
//! - [`net`] — raw TCP: the accept loop and per-connection tasks.
//! - [`reactor`] — the single-task event loop that owns the table,
//!   the lobby, and every session.
//! - [`config`] — tunables for timeouts and table fill rules.
//!
//! ```text
//! sockets → net (Event channel) → reactor → engine
//! ```

mod config;
mod error;
pub mod net;
mod reactor;

pub use config::{ConfigError, ServerConfig, MIN_TABLE_PLAYERS};
pub use error::ServerError;
pub use reactor::GameServer;
