//! Connection sessions for the Warlords & Scumbags server.
//!
//! Everything here is transport-agnostic: a [`Session`] consumes bytes
//! and yields frames, counts strikes toward the three-strike kick, and
//! carries the player binding. Name assignment for joining clients
//! lives in [`mangle_name`].

mod error;
mod mangle;
mod session;

pub use error::SessionError;
pub use mangle::mangle_name;
pub use session::{Session, MAX_BUFFER, MAX_STRIKES};
