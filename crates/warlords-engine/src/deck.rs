//! The deck: 52 cards, shuffled and dealt into N hands.

use rand::seq::SliceRandom;
use warlords_protocol::{Card, DECK_SIZE};

/// A full deck of cards.
///
/// The deck always holds all 52 cards; dealing copies them out, so a
/// table can reuse one deck across rounds.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new() -> Self {
        let cards = (0..DECK_SIZE)
            .map(|v| Card::new(v).expect("values below 52 are cards"))
            .collect();
        Self { cards }
    }

    /// Shuffles and deals into `num_players` hands.
    ///
    /// Each hand gets `52 / num_players` cards; the `52 % num_players`
    /// remainder cards go one each to the first hands dealt, so hand
    /// sizes never differ by more than one and the union of all hands
    /// is exactly the deck.
    pub fn deal(&mut self, num_players: usize) -> Vec<Vec<Card>> {
        assert!(num_players > 0, "cannot deal to zero players");
        self.cards.shuffle(&mut rand::rng());

        let hand_size = self.cards.len() / num_players;
        let mut hands: Vec<Vec<Card>> = (0..num_players)
            .map(|i| self.cards[i * hand_size..(i + 1) * hand_size].to_vec())
            .collect();
        let remainder = self.cards.len() - hand_size * num_players;
        for i in 0..remainder {
            hands[i].push(self.cards[self.cards.len() - 1 - i]);
        }
        hands
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_deal_covers_the_deck_for_all_table_sizes() {
        for n in 1..=7 {
            let mut deck = Deck::new();
            let hands = deck.deal(n);
            assert_eq!(hands.len(), n);

            let union: HashSet<Card> =
                hands.iter().flatten().copied().collect();
            assert_eq!(union.len(), 52, "hands overlap for n={n}");

            let total: usize = hands.iter().map(Vec::len).sum();
            assert_eq!(total, 52);
        }
    }

    #[test]
    fn test_deal_hand_sizes_differ_by_at_most_one() {
        for n in 1..=7 {
            let mut deck = Deck::new();
            let hands = deck.deal(n);
            let min = hands.iter().map(Vec::len).min().unwrap();
            let max = hands.iter().map(Vec::len).max().unwrap();
            assert_eq!(min, 52 / n, "short hand wrong for n={n}");
            assert!(max - min <= 1, "uneven hands for n={n}");
            // Remainder cards land on the first hands dealt.
            if 52 % n != 0 {
                assert_eq!(hands[0].len(), 52 / n + 1);
            }
        }
    }
}
