//! Strike codes: stable two-digit identifiers for rule and protocol
//! violations, carried in `strik` messages.

use std::fmt;

/// A violation code sent with a strike.
///
/// Codes are stable wire identifiers, not free text; clients key
/// their behavior off the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrikeCode {
    /// Cards within one play do not share a rank.
    RankMismatch,
    /// Play rank is lower than the play it must beat.
    RankTooLow,
    /// Play has fewer cards than the play it must beat.
    QuantityTooLow,
    /// A played card is not in the player's hand.
    CardNotHeld,
    /// Play arrived from a player whose turn it is not.
    OutOfTurn,
    /// First play of the game did not include the lowest card.
    FirstPlayWithoutLowest,
    /// The same card appears twice in one play.
    DuplicateCards,
    /// Passed on the mandatory first play.
    PassOnFirstPlay,
    /// Turn or swap deadline expired.
    Timeout,
    /// Swap response was invalid or arrived outside a swap.
    InvalidSwap,
    /// Message failed protocol validation.
    MalformedMessage,
    /// Play arrived from a player not seated at the table.
    NotSeated,
    /// Receive buffer overflowed without yielding a message.
    Flood,
}

impl StrikeCode {
    /// The two-character wire form.
    pub fn code(self) -> &'static str {
        match self {
            Self::RankMismatch => "11",
            Self::RankTooLow => "12",
            Self::QuantityTooLow => "13",
            Self::CardNotHeld => "14",
            Self::OutOfTurn => "15",
            Self::FirstPlayWithoutLowest => "16",
            Self::DuplicateCards => "17",
            Self::PassOnFirstPlay => "18",
            Self::Timeout => "20",
            Self::InvalidSwap => "21",
            Self::MalformedMessage => "30",
            Self::NotSeated => "31",
            Self::Flood => "32",
        }
    }

    /// Parses the two-character wire form.
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "11" => Self::RankMismatch,
            "12" => Self::RankTooLow,
            "13" => Self::QuantityTooLow,
            "14" => Self::CardNotHeld,
            "15" => Self::OutOfTurn,
            "16" => Self::FirstPlayWithoutLowest,
            "17" => Self::DuplicateCards,
            "18" => Self::PassOnFirstPlay,
            "20" => Self::Timeout,
            "21" => Self::InvalidSwap,
            "30" => Self::MalformedMessage,
            "31" => Self::NotSeated,
            "32" => Self::Flood,
            _ => return None,
        })
    }
}

impl fmt::Display for StrikeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        let all = [
            StrikeCode::RankMismatch,
            StrikeCode::RankTooLow,
            StrikeCode::QuantityTooLow,
            StrikeCode::CardNotHeld,
            StrikeCode::OutOfTurn,
            StrikeCode::FirstPlayWithoutLowest,
            StrikeCode::DuplicateCards,
            StrikeCode::PassOnFirstPlay,
            StrikeCode::Timeout,
            StrikeCode::InvalidSwap,
            StrikeCode::MalformedMessage,
            StrikeCode::NotSeated,
            StrikeCode::Flood,
        ];
        for code in all {
            assert_eq!(StrikeCode::from_code(code.code()), Some(code));
            assert_eq!(code.code().len(), 2);
        }
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        assert_eq!(StrikeCode::from_code("99"), None);
        assert_eq!(StrikeCode::from_code("1"), None);
    }
}
