//! A player: identity, hand, status, and strike count.

use warlords_protocol::{Card, PlayerState, SeatStatus};

use crate::PlayError;

/// One player, whether seated, in the lobby, or mid-removal.
///
/// The hand never contains duplicates; [`Player::add_to_hand`] and
/// [`Player::remove_from_hand`] preserve that.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    hand: Vec<Card>,
    pub state: PlayerState,
    pub strikes: u8,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hand: Vec::new(),
            state: PlayerState::Lobby,
            strikes: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn holds(&self, card: Card) -> bool {
        self.hand.contains(&card)
    }

    /// Replaces the hand with a freshly dealt one.
    pub fn pick_up_hand(&mut self, cards: Vec<Card>) {
        debug_assert!(no_duplicates(&cards));
        self.hand = cards;
    }

    pub fn clear_hand(&mut self) {
        self.hand.clear();
    }

    /// Adds cards the player gained outside a deal (the swap ritual).
    pub fn add_to_hand(&mut self, cards: &[Card]) {
        for &card in cards {
            debug_assert!(!self.holds(card), "card dealt twice");
            self.hand.push(card);
        }
    }

    /// Removes a played set of cards.
    ///
    /// # Errors
    /// [`PlayError::CardNotHeld`] if any card is missing; in that case
    /// the hand is unchanged.
    pub fn remove_from_hand(&mut self, cards: &[Card]) -> Result<(), PlayError> {
        if cards.iter().any(|c| !self.holds(*c)) {
            return Err(PlayError::CardNotHeld);
        }
        self.hand.retain(|c| !cards.contains(c));
        Ok(())
    }

    /// Pops the highest card, the one the scumbag surrenders.
    pub fn take_highest(&mut self) -> Option<Card> {
        let (idx, _) = self
            .hand
            .iter()
            .enumerate()
            .max_by_key(|(_, card)| **card)?;
        Some(self.hand.swap_remove(idx))
    }

    /// The seat snapshot carried in table-status broadcasts.
    pub fn seat_status(&self) -> SeatStatus {
        SeatStatus {
            state: self.state,
            strikes: self.strikes,
            name: self.name.clone(),
            cards: self.hand.len() as u8,
        }
    }
}

fn no_duplicates(cards: &[Card]) -> bool {
    cards
        .iter()
        .all(|c| cards.iter().filter(|o| *o == c).count() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(v: u8) -> Card {
        Card::new(v).unwrap()
    }

    fn cards(values: &[u8]) -> Vec<Card> {
        values.iter().map(|&v| card(v)).collect()
    }

    #[test]
    fn test_add_and_remove_from_hand() {
        let mut jim = Player::new("Jim");
        jim.add_to_hand(&cards(&[1, 2, 3, 4, 5, 6, 7, 8]));
        jim.add_to_hand(&cards(&[9, 10]));
        assert_eq!(jim.hand(), cards(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]));

        jim.remove_from_hand(&cards(&[9, 10])).unwrap();
        assert_eq!(jim.hand(), cards(&[1, 2, 3, 4, 5, 6, 7, 8]));

        jim.clear_hand();
        assert_eq!(
            jim.remove_from_hand(&cards(&[1])),
            Err(PlayError::CardNotHeld)
        );
    }

    #[test]
    fn test_remove_missing_card_leaves_hand_unchanged() {
        let mut p = Player::new("p");
        p.pick_up_hand(cards(&[1, 2, 3]));
        assert_eq!(
            p.remove_from_hand(&cards(&[2, 40])),
            Err(PlayError::CardNotHeld)
        );
        assert_eq!(p.hand(), cards(&[1, 2, 3]));
    }

    #[test]
    fn test_take_highest() {
        let mut p = Player::new("p");
        p.pick_up_hand(cards(&[12, 3, 44, 7]));
        assert_eq!(p.take_highest(), Some(card(44)));
        assert!(!p.holds(card(44)));
        assert_eq!(p.hand().len(), 3);
    }

    #[test]
    fn test_seat_status_reflects_player() {
        let mut p = Player::new("chipjack");
        p.pick_up_hand(cards(&[0, 1]));
        p.state = PlayerState::Active;
        p.strikes = 2;
        let seat = p.seat_status();
        assert_eq!(seat.name, "chipjack");
        assert_eq!(seat.state, PlayerState::Active);
        assert_eq!(seat.strikes, 2);
        assert_eq!(seat.cards, 2);
    }
}
