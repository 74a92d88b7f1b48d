//! Game rules for Warlords & Scumbags.
//!
//! This crate owns everything about the game itself and nothing about
//! the network: dealing, seat and turn bookkeeping, play validation,
//! the wild two, the skip rule, and the warlord/scumbag swap ritual.
//! The server crate drives a [`Table`] from protocol events and turns
//! [`PlayError`]s into strikes.

mod deck;
mod error;
mod player;
mod table;

pub use deck::Deck;
pub use error::PlayError;
pub use player::Player;
pub use table::{
    PlayOutcome, SwapOffer, SwapResult, Table, TABLE_CAPACITY,
};
