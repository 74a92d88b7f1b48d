//! Card values and the fixed-width card-list encoding.
//!
//! A card is a single integer in `0..=51`. Rank is `value / 4`
//! (0..=12) and suit is `value % 4`. Rank 12 is the wild two, which
//! beats every play. The value 52 ([`NO_CARD`]) is padding used only
//! on the wire so that card-list fields have a constant width; it is
//! never a real card.

use std::fmt;

use crate::WireError;

/// Number of cards in a full deck.
pub const DECK_SIZE: u8 = 52;

/// Wire padding sentinel meaning "no card here".
pub const NO_CARD: u8 = 52;

/// The rank of the wild two.
pub const WILD_RANK: u8 = 12;

/// A single playing card, guaranteed to be in `0..=51`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card(u8);

impl Card {
    /// Creates a card from its wire value.
    ///
    /// # Errors
    /// Returns [`WireError::CardOutOfRange`] for values above 51,
    /// including the padding sentinel.
    pub fn new(value: u8) -> Result<Self, WireError> {
        if value < DECK_SIZE {
            Ok(Self(value))
        } else {
            Err(WireError::CardOutOfRange(value))
        }
    }

    /// The raw value in `0..=51`.
    pub fn value(self) -> u8 {
        self.0
    }

    /// The rank, `0..=12`. Rank 12 is the wild two.
    pub fn rank(self) -> u8 {
        self.0 / 4
    }

    /// The suit, `0..=3`.
    pub fn suit(self) -> u8 {
        self.0 % 4
    }

    /// Whether this card is a wild two.
    pub fn is_wild(self) -> bool {
        self.rank() == WILD_RANK
    }
}

/// Displays as the two-digit wire form, e.g. `07`.
impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Encodes a card list into a comma-joined field of exactly `width`
/// two-digit codes, padded with the sentinel 52.
///
/// Every message carrying cards uses a fixed `width` (4 for plays,
/// 18 for hands) so receivers can parse by offset.
pub fn cards_to_str(cards: &[Card], width: usize) -> String {
    debug_assert!(cards.len() <= width);
    let mut out = String::with_capacity(width * 3);
    for i in 0..width {
        if i > 0 {
            out.push(',');
        }
        match cards.get(i) {
            Some(card) => out.push_str(&format!("{card}")),
            None => out.push_str("52"),
        }
    }
    out
}

/// Decodes a comma-joined card field, dropping sentinel padding and
/// preserving order.
///
/// # Errors
/// Fails if any token is not exactly two ASCII digits or encodes a
/// value above 52.
pub fn str_to_cards(field: &str) -> Result<Vec<Card>, WireError> {
    let mut cards = Vec::new();
    for token in field.split(',') {
        if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WireError::InvalidField {
                what: "card",
                text: token.to_string(),
            });
        }
        let value: u8 = token.parse().expect("two ascii digits");
        if value > NO_CARD {
            return Err(WireError::CardOutOfRange(value));
        }
        if value != NO_CARD {
            cards.push(Card(value));
        }
    }
    Ok(cards)
}
