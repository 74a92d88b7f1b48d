//! Wire protocol for the Warlords & Scumbags game server.
//!
//! This crate defines the language clients and the server speak:
//!
//! - **Cards** ([`Card`], [`cards_to_str`], [`str_to_cards`]) — card
//!   values and the fixed-width card-list field encoding.
//! - **Framing** ([`extract_frame`]) — popping complete `[` ... `]`
//!   frames off a streaming receive buffer.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]) — every
//!   message type with two-tier validation and byte-exact encoding.
//! - **Strikes** ([`StrikeCode`]) — stable violation identifiers.
//! - **Errors** ([`WireError`]) — what can go wrong on the wire.
//!
//! # Architecture
//!
//! The protocol layer sits between the raw socket and the session
//! layer. It knows nothing about connections, tables, or game rules —
//! only how to turn bytes into validated messages and back.
//!
//! ```text
//! Socket (bytes) → Protocol (messages) → Session (player context)
//! ```

mod card;
mod error;
mod frame;
mod message;
mod strike;

pub use card::{cards_to_str, str_to_cards, Card, DECK_SIZE, NO_CARD, WILD_RANK};
pub use error::WireError;
pub use frame::extract_frame;
pub use message::{
    frame_kind, is_valid_name, ClientMessage, PlayerState, SeatStatus,
    ServerMessage, CHAT_WIDTH, HAND_WIDTH, NAME_WIDTH, PLAY_WIDTH, STABL_LEN,
    TABLE_SEATS,
};
pub use strike::StrikeCode;
