//! Error types for the game engine.
//!
//! Rule violations are ordinary values, not panics: every variant
//! carries a stable [`StrikeCode`] so the reactor can answer the
//! offending client with a typed strike. Nothing here represents an
//! I/O or protocol failure — those stay in their own crates.

use warlords_protocol::StrikeCode;

/// A rejected game action. The table state is guaranteed unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlayError {
    /// The same card appears more than once in the play.
    #[error("played duplicates of a card")]
    DuplicateCards,

    /// The acting player is not seated at the table.
    #[error("tried to play cards when not at the table")]
    NotSeated,

    /// A played card is not currently in the player's hand.
    #[error("tried to play cards they don't have")]
    CardNotHeld,

    /// The acting player's status is not active.
    #[error("tried to play when it is not their turn")]
    OutOfTurn,

    /// Cards within one play must all share a rank.
    #[error("sent cards that don't have matching face value")]
    RankMismatch,

    /// The play's rank does not reach the last play's rank.
    #[error("sent cards with too low of a face value")]
    RankTooLow,

    /// The play has fewer cards than the last play.
    #[error("sent too few cards to beat the last play")]
    QuantityTooLow,

    /// The first play of the game must include the lowest card.
    #[error("first play must include the three of clubs")]
    FirstPlayWithoutLowest,

    /// The first play of the game may not be a pass.
    #[error("cannot pass on the first play")]
    PassOnFirstPlay,

    /// No swap is pending, or the offered card is not held.
    #[error("invalid swap response")]
    InvalidSwap,
}

impl PlayError {
    /// The strike code reported to the offending client.
    pub fn strike_code(self) -> StrikeCode {
        match self {
            Self::DuplicateCards => StrikeCode::DuplicateCards,
            Self::NotSeated => StrikeCode::NotSeated,
            Self::CardNotHeld => StrikeCode::CardNotHeld,
            Self::OutOfTurn => StrikeCode::OutOfTurn,
            Self::RankMismatch => StrikeCode::RankMismatch,
            Self::RankTooLow => StrikeCode::RankTooLow,
            Self::QuantityTooLow => StrikeCode::QuantityTooLow,
            Self::FirstPlayWithoutLowest => StrikeCode::FirstPlayWithoutLowest,
            Self::PassOnFirstPlay => StrikeCode::PassOnFirstPlay,
            Self::InvalidSwap => StrikeCode::InvalidSwap,
        }
    }
}
