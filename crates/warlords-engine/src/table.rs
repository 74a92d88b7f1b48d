//! The table: seating, turn order, play history, and the swap ritual.
//!
//! All rule enforcement funnels through [`Table::validate_play`],
//! which rejects before any state is touched, so a violation can
//! never corrupt the table. Applying an accepted play and computing
//! the next turn live in [`Table::play_cards`].

use warlords_protocol::{Card, PlayerState};

use crate::{Deck, PlayError, Player};

/// Seats at the table.
pub const TABLE_CAPACITY: usize = 7;

/// What an accepted play means for the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Play continues; someone else (or the same player) is now active.
    Continue,
    /// One or zero players still hold cards — the round is over.
    RoundOver,
}

/// The swap ritual's opening move: the scumbag's highest card has been
/// taken off their hand and is held in escrow until the warlord answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOffer {
    pub warlord: String,
    pub scumbag: String,
    /// The card the scumbag surrendered.
    pub card: Card,
}

/// A completed swap, from the scumbag's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapResult {
    /// The card the warlord gave back.
    pub gained: Card,
    /// The card the scumbag surrendered.
    pub lost: Card,
}

#[derive(Debug)]
struct PendingSwap {
    taken: Card,
}

/// One table of up to seven seated players.
#[derive(Debug)]
pub struct Table {
    seats: Vec<Player>,
    /// Names of players who emptied their hand this game, in order.
    winners: Vec<String>,
    /// Ordered plays; an empty entry is a round-reset marker.
    history: Vec<Vec<Card>>,
    /// Index into the *active subset* (see [`Table::active_players`]).
    turn: usize,
    /// True only for the very first round of a freshly seated table.
    starting_round: bool,
    /// True until the mandatory card-0 opening play has been accepted.
    first_play_pending: bool,
    pending_swap: Option<PendingSwap>,
    deck: Deck,
}

impl Table {
    pub fn new() -> Self {
        Self {
            seats: Vec::new(),
            winners: Vec::new(),
            history: Vec::new(),
            turn: 0,
            starting_round: true,
            first_play_pending: false,
            pending_swap: None,
            deck: Deck::new(),
        }
    }

    // -----------------------------------------------------------------
    // Seating
    // -----------------------------------------------------------------

    /// Seats a player, or hands them back if the table is full.
    pub fn add_player(&mut self, mut player: Player) -> Result<(), Player> {
        if self.is_full() {
            return Err(player);
        }
        player.state = PlayerState::Waiting;
        self.seats.push(player);
        Ok(())
    }

    /// Unseats a player, fixing the turn pointer so it still refers to
    /// the same active player.
    pub fn remove_player(&mut self, name: &str) -> Option<Player> {
        let seat = self.seat_index(name)?;
        let active_pos = self
            .active_players()
            .iter()
            .position(|&i| i == seat);
        let player = self.seats.remove(seat);
        self.winners.retain(|w| w != name);

        if let Some(pos) = active_pos {
            if pos < self.turn {
                self.turn -= 1;
            }
        }
        let active = self.active_players();
        self.turn = if active.is_empty() { 0 } else { self.turn % active.len() };
        // If the departed player held the turn, it falls to the next
        // contender.
        if player.state == PlayerState::Active {
            if let Some(&next) = active.get(self.turn) {
                self.seats[next].state = PlayerState::Active;
            }
        }
        Some(player)
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() >= TABLE_CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn seated_count(&self) -> usize {
        self.seats.len()
    }

    pub fn seats(&self) -> &[Player] {
        &self.seats
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.seats.iter().find(|p| p.name() == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.seats.iter_mut().find(|p| p.name() == name)
    }

    fn seat_index(&self, name: &str) -> Option<usize> {
        self.seats.iter().position(|p| p.name() == name)
    }

    /// Seat indices of players still contending: seated, holding
    /// cards, and not disconnected.
    pub fn active_players(&self) -> Vec<usize> {
        self.seats
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                matches!(
                    p.state,
                    PlayerState::Active
                        | PlayerState::Waiting
                        | PlayerState::Passed
                ) && !p.hand().is_empty()
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// The player whose turn it is, if the round is running.
    pub fn active_player(&self) -> Option<&Player> {
        self.seats
            .iter()
            .find(|p| p.state == PlayerState::Active)
    }

    pub fn winner_order(&self) -> &[String] {
        &self.winners
    }

    pub fn last_play(&self) -> Option<&[Card]> {
        self.history.last().map(Vec::as_slice)
    }

    pub fn history(&self) -> &[Vec<Card>] {
        &self.history
    }

    pub fn starting_round(&self) -> bool {
        self.starting_round
    }

    /// Marks the table as freshly seated again (everyone left, so
    /// there is no prior standing to run the swap ritual from).
    pub fn mark_fresh(&mut self) {
        self.starting_round = true;
    }

    // -----------------------------------------------------------------
    // Dealing and round openers
    // -----------------------------------------------------------------

    /// Shuffles and deals a fresh round to every seat.
    ///
    /// Play history and the winner order are cleared here and nowhere
    /// else. Everyone starts `Waiting`; the caller picks the opener
    /// with [`Table::open_first_round`] or [`Table::open_round`].
    pub fn deal(&mut self) {
        self.history.clear();
        self.winners.clear();
        self.pending_swap = None;
        self.first_play_pending = false;
        self.turn = 0;
        if self.seats.is_empty() {
            return;
        }

        let hands = self.deck.deal(self.seats.len());
        for (player, hand) in self.seats.iter_mut().zip(hands) {
            player.pick_up_hand(hand);
            player.state = PlayerState::Waiting;
        }
    }

    /// Opens the very first round: the holder of card 0 leads and must
    /// include it in their play.
    pub fn open_first_round(&mut self) {
        let lowest = Card::new(0).expect("card 0 exists");
        let seat = self
            .seats
            .iter()
            .position(|p| p.holds(lowest))
            .unwrap_or(0);
        let active = self.active_players();
        self.turn = active.iter().position(|&i| i == seat).unwrap_or(0);
        self.seats[seat].state = PlayerState::Active;
        self.first_play_pending = true;
    }

    /// Opens a later round: the warlord (seat 0) leads.
    pub fn open_round(&mut self) {
        self.turn = 0;
        if let Some(player) = self.seats.first_mut() {
            player.state = PlayerState::Active;
        }
    }

    // -----------------------------------------------------------------
    // Plays
    // -----------------------------------------------------------------

    /// Checks a play against every rule without touching any state.
    pub fn validate_play(
        &self,
        name: &str,
        cards: &[Card],
    ) -> Result<(), PlayError> {
        for (i, card) in cards.iter().enumerate() {
            if cards[i + 1..].contains(card) {
                return Err(PlayError::DuplicateCards);
            }
        }
        let seat = self.seat_index(name).ok_or(PlayError::NotSeated)?;
        let player = &self.seats[seat];
        if cards.iter().any(|c| !player.holds(*c)) {
            return Err(PlayError::CardNotHeld);
        }
        if player.state != PlayerState::Active {
            return Err(PlayError::OutOfTurn);
        }

        if self.first_play_pending {
            if cards.is_empty() {
                return Err(PlayError::PassOnFirstPlay);
            }
            if !cards.iter().any(|c| c.value() == 0) {
                return Err(PlayError::FirstPlayWithoutLowest);
            }
        }

        if cards.is_empty() {
            // A pass is always legal for the active player.
            return Ok(());
        }
        if cards.len() > 1 && cards.iter().any(|c| c.rank() != cards[0].rank())
        {
            return Err(PlayError::RankMismatch);
        }

        match self.history.last() {
            // Empty history or a round-reset marker: anything goes.
            None => Ok(()),
            Some(last) if last.is_empty() => Ok(()),
            Some(last) => {
                if cards[0].is_wild() {
                    // The two beats anything, count included.
                    return Ok(());
                }
                if cards[0].rank() < last[0].rank() {
                    return Err(PlayError::RankTooLow);
                }
                if cards.len() < last.len() {
                    return Err(PlayError::QuantityTooLow);
                }
                Ok(())
            }
        }
    }

    /// Applies a play (an empty list is a pass) and advances the turn.
    ///
    /// # Errors
    /// Any [`PlayError`]; the table is untouched on error.
    pub fn play_cards(
        &mut self,
        name: &str,
        cards: Vec<Card>,
    ) -> Result<PlayOutcome, PlayError> {
        self.validate_play(name, &cards)?;
        let seat = self.seat_index(name).ok_or(PlayError::NotSeated)?;

        if cards.is_empty() {
            self.seats[seat].state = PlayerState::Passed;
        } else {
            self.history.push(cards.clone());
            self.seats[seat].remove_from_hand(&cards)?;
            self.seats[seat].state = PlayerState::Waiting;
            if self.seats[seat].hand().is_empty() {
                tracing::info!(player = name, "went out");
                self.winners.push(name.to_string());
            }
        }
        self.first_play_pending = false;

        let active = self.active_players();
        if active.len() <= 1 {
            return Ok(PlayOutcome::RoundOver);
        }

        if !cards.is_empty() && cards[0].is_wild() {
            // The two closes the beat chain and grants another turn,
            // unless the player just went out.
            if self.winners.iter().any(|w| w == name) {
                self.turn = (self.turn + 1) % active.len();
                self.seats[active[self.turn]].state = PlayerState::Active;
            } else {
                self.seats[seat].state = PlayerState::Active;
            }
            self.history.push(Vec::new());
        } else {
            // Skip rule, kept exactly as observed in play: a play whose
            // rank list equals that of the entry it just beat skips the
            // next seat. (The trigger compares two entries back, not
            // one; tests pin this asymmetry down.)
            if !cards.is_empty() && self.history.len() >= 2 {
                let prev = &self.history[self.history.len() - 2];
                let prev_ranks: Vec<u8> =
                    prev.iter().map(|c| c.rank()).collect();
                let ranks: Vec<u8> = cards.iter().map(|c| c.rank()).collect();
                if prev_ranks == ranks {
                    self.turn = (self.turn + 1) % active.len();
                    let skipped = active[self.turn];
                    self.seats[skipped].state = PlayerState::Passed;
                    tracing::info!(
                        player = self.seats[skipped].name(),
                        "skipped"
                    );
                }
            }
            self.turn = (self.turn + 1) % active.len();
            self.seats[active[self.turn]].state = PlayerState::Active;

            // If nobody has played since the last reset, start a new
            // beat chain.
            let someone_played = active
                .iter()
                .any(|&i| self.seats[i].state == PlayerState::Waiting);
            if !someone_played {
                self.history.push(Vec::new());
            }
        }
        Ok(PlayOutcome::Continue)
    }

    /// Passes on behalf of a player whose turn clock expired.
    ///
    /// Clears a pending first play so a stalled opener cannot deadlock
    /// the table; everything else follows the normal transition logic.
    pub fn timeout_pass(&mut self, name: &str) -> Result<PlayOutcome, PlayError> {
        self.first_play_pending = false;
        self.play_cards(name, Vec::new())
    }

    // -----------------------------------------------------------------
    // Swap ritual
    // -----------------------------------------------------------------

    /// Starts the warlord/scumbag swap: the scumbag's highest card is
    /// held in escrow until the warlord answers with
    /// [`Table::resolve_swap`]. Keeping it out of the warlord's hand
    /// means no hand ever exceeds its dealt size, so a hand request
    /// mid-swap still fits the fixed wire width.
    ///
    /// Returns `None` when fewer than two players are seated or a swap
    /// is already pending.
    pub fn begin_swap(&mut self) -> Option<SwapOffer> {
        if self.seats.len() < 2 || self.pending_swap.is_some() {
            return None;
        }
        let scum = self.seats.len() - 1;
        let card = self.seats[scum].take_highest()?;
        self.pending_swap = Some(PendingSwap { taken: card });
        tracing::info!(
            warlord = self.seats[0].name(),
            scumbag = self.seats[scum].name(),
            card = %card,
            "swap ritual started"
        );
        Some(SwapOffer {
            warlord: self.seats[0].name().to_string(),
            scumbag: self.seats[scum].name().to_string(),
            card,
        })
    }

    /// Whether a swap is awaiting the warlord's response.
    pub fn swap_pending(&self) -> bool {
        self.pending_swap.is_some()
    }

    /// Completes the swap with the card the warlord chose to give back.
    ///
    /// The escrowed card counts as returnable: answering with it hands
    /// it straight back and leaves both hands exactly as dealt.
    ///
    /// # Errors
    /// [`PlayError::InvalidSwap`] when no swap is pending or the card
    /// is neither in the warlord's hand nor the escrowed one; the
    /// ritual stays pending so a corrected response (or the deadline)
    /// can still settle it.
    pub fn resolve_swap(&mut self, card: Card) -> Result<SwapResult, PlayError> {
        let taken =
            self.pending_swap.as_ref().ok_or(PlayError::InvalidSwap)?.taken;
        if self.seats.len() < 2 {
            return Err(PlayError::InvalidSwap);
        }
        let scum = self.seats.len() - 1;
        if card == taken {
            self.seats[scum].add_to_hand(&[card]);
        } else {
            if !self.seats[0].holds(card) {
                return Err(PlayError::InvalidSwap);
            }
            self.seats[0].remove_from_hand(&[card])?;
            self.seats[0].add_to_hand(&[taken]);
            self.seats[scum].add_to_hand(&[card]);
        }
        self.pending_swap = None;
        Ok(SwapResult { gained: card, lost: taken })
    }

    /// Reverses a timed-out swap: the escrowed card goes back to the
    /// scumbag, whose hand ends up exactly as dealt.
    pub fn cancel_swap(&mut self) -> Option<Card> {
        let pending = self.pending_swap.take()?;
        if let Some(scum) = self.seats.last_mut() {
            scum.add_to_hand(&[pending.taken]);
        }
        Some(pending.taken)
    }

    // -----------------------------------------------------------------
    // Round completion
    // -----------------------------------------------------------------

    /// Ends the round: the last player holding cards joins the end of
    /// the winner order, and every seat is vacated in finishing order
    /// (warlord first, scumbag last).
    pub fn finish_round(&mut self) -> Vec<Player> {
        if let Some(&seat) = self.active_players().first() {
            let name = self.seats[seat].name().to_string();
            if !self.winners.contains(&name) {
                self.winners.push(name);
            }
        }

        let order = std::mem::take(&mut self.winners);
        let mut seats = std::mem::take(&mut self.seats);
        let mut out = Vec::with_capacity(seats.len());
        for name in &order {
            if let Some(pos) = seats.iter().position(|p| p.name() == name) {
                out.push(seats.remove(pos));
            }
        }
        out.extend(seats);
        for player in &mut out {
            player.clear_hand();
            player.state = PlayerState::Lobby;
        }

        self.history.clear();
        self.turn = 0;
        self.pending_swap = None;
        self.starting_round = false;
        self.first_play_pending = false;
        out
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use warlords_protocol::{ServerMessage, HAND_WIDTH};

    use super::*;

    fn card(v: u8) -> Card {
        Card::new(v).unwrap()
    }

    fn cards(values: &[u8]) -> Vec<Card> {
        values.iter().map(|&v| card(v)).collect()
    }

    /// Builds a table of named players with fixed hands; seat 0 leads.
    fn table_with_hands(hands: &[(&str, &[u8])]) -> Table {
        let mut table = Table::new();
        for (name, hand) in hands {
            let mut player = Player::new(*name);
            player.pick_up_hand(cards(hand));
            table.add_player(player).unwrap();
        }
        table.open_round();
        table
    }

    fn active_name(table: &Table) -> &str {
        table.active_player().expect("someone is active").name()
    }

    // =====================================================================
    // Seating
    // =====================================================================

    #[test]
    fn test_table_capacity_is_seven() {
        let mut table = Table::new();
        for i in 0..7 {
            table.add_player(Player::new(format!("p{i}"))).unwrap();
        }
        assert!(table.is_full());
        assert!(table.add_player(Player::new("late")).is_err());
    }

    #[test]
    fn test_add_and_remove_players() {
        let mut table = Table::new();
        for i in 0..5 {
            table.add_player(Player::new(format!("p{i}"))).unwrap();
        }
        assert_eq!(table.seated_count(), 5);
        for i in 0..5 {
            assert!(table.remove_player(&format!("p{i}")).is_some());
        }
        assert!(table.is_empty());
        assert!(table.remove_player("p0").is_none());
    }

    // =====================================================================
    // validate_play rejections
    // =====================================================================

    #[test]
    fn test_duplicate_cards_always_rejected() {
        let table = table_with_hands(&[("a", &[4, 5]), ("b", &[8])]);
        assert_eq!(
            table.validate_play("a", &cards(&[4, 4])),
            Err(PlayError::DuplicateCards)
        );
        // Rejected even for players who are not seated at all.
        assert_eq!(
            table.validate_play("ghost", &cards(&[4, 4])),
            Err(PlayError::DuplicateCards)
        );
    }

    #[test]
    fn test_unseated_player_rejected() {
        let table = table_with_hands(&[("a", &[4]), ("b", &[8])]);
        assert_eq!(
            table.validate_play("ghost", &cards(&[4])),
            Err(PlayError::NotSeated)
        );
    }

    #[test]
    fn test_card_not_in_hand_rejected() {
        let table = table_with_hands(&[("a", &[4, 5]), ("b", &[8])]);
        assert_eq!(
            table.validate_play("a", &cards(&[6])),
            Err(PlayError::CardNotHeld)
        );
    }

    #[test]
    fn test_out_of_turn_rejected() {
        let table = table_with_hands(&[("a", &[4]), ("b", &[8])]);
        assert_eq!(
            table.validate_play("b", &cards(&[8])),
            Err(PlayError::OutOfTurn)
        );
    }

    #[test]
    fn test_mixed_ranks_rejected() {
        let table = table_with_hands(&[("a", &[4, 8]), ("b", &[12])]);
        assert_eq!(
            table.validate_play("a", &cards(&[4, 8])),
            Err(PlayError::RankMismatch)
        );
    }

    #[test]
    fn test_beat_check_rank_and_quantity() {
        // a opens with two rank-5 cards (values 20, 21).
        let mut table = table_with_hands(&[
            ("a", &[20, 21, 4]),
            ("b", &[24, 25, 48]),
            ("c", &[0]),
        ]);
        table.play_cards("a", cards(&[20, 21])).unwrap();
        assert_eq!(active_name(&table), "b");

        // Rank 6, one card: quantity too low.
        assert_eq!(
            table.validate_play("b", &cards(&[24])),
            Err(PlayError::QuantityTooLow)
        );
        // Rank 6, two cards: beats it.
        assert!(table.validate_play("b", &cards(&[24, 25])).is_ok());
        // A lone two beats anything, count included.
        assert!(table.validate_play("b", &cards(&[48])).is_ok());
    }

    #[test]
    fn test_rank_too_low_rejected() {
        let mut table =
            table_with_hands(&[("a", &[40, 1]), ("b", &[4, 30]), ("c", &[0])]);
        table.play_cards("a", cards(&[40])).unwrap();
        assert_eq!(
            table.validate_play("b", &cards(&[4])),
            Err(PlayError::RankTooLow)
        );
        assert!(table.validate_play("b", &cards(&[30])).is_ok());
    }

    #[test]
    fn test_equal_rank_and_count_is_legal() {
        let mut table =
            table_with_hands(&[("a", &[20, 4]), ("b", &[22, 30]), ("c", &[0])]);
        table.play_cards("a", cards(&[20])).unwrap();
        // Equal rank, equal count: allowed (and triggers the skip rule).
        assert!(table.validate_play("b", &cards(&[22])).is_ok());
    }

    // =====================================================================
    // First-play rule
    // =====================================================================

    #[test]
    fn test_first_round_requires_the_lowest_card() {
        let mut table = Table::new();
        let mut a = Player::new("a");
        a.pick_up_hand(cards(&[0, 30]));
        let mut b = Player::new("b");
        b.pick_up_hand(cards(&[10, 11]));
        table.add_player(a).unwrap();
        table.add_player(b).unwrap();
        table.open_first_round();

        // The holder of card 0 leads.
        assert_eq!(active_name(&table), "a");
        // A pass is not allowed before any play.
        assert_eq!(
            table.validate_play("a", &[]),
            Err(PlayError::PassOnFirstPlay)
        );
        // A play without card 0 is not allowed either.
        assert_eq!(
            table.validate_play("a", &cards(&[30])),
            Err(PlayError::FirstPlayWithoutLowest)
        );
        // The mandatory opener goes through and clears the rule.
        table.play_cards("a", cards(&[0])).unwrap();
        assert_eq!(active_name(&table), "b");
        assert!(table.validate_play("b", &[]).is_ok());
    }

    #[test]
    fn test_timeout_pass_clears_a_pending_first_play() {
        let mut table = Table::new();
        let mut a = Player::new("a");
        a.pick_up_hand(cards(&[0, 30]));
        let mut b = Player::new("b");
        b.pick_up_hand(cards(&[10, 11]));
        table.add_player(a).unwrap();
        table.add_player(b).unwrap();
        table.open_first_round();

        table.timeout_pass("a").unwrap();
        assert_eq!(active_name(&table), "b");
        // The opener rule no longer binds the next player.
        assert!(table.validate_play("b", &cards(&[10])).is_ok());
    }

    // =====================================================================
    // Wild two
    // =====================================================================

    #[test]
    fn test_wild_two_replays_the_same_player() {
        let mut table = table_with_hands(&[
            ("a", &[48, 4]),
            ("b", &[8]),
            ("c", &[12]),
        ]);
        table.play_cards("a", cards(&[48])).unwrap();
        // Still a's turn, and the two closed the beat chain.
        assert_eq!(active_name(&table), "a");
        assert_eq!(table.last_play(), Some(&[][..]));
    }

    #[test]
    fn test_wild_two_that_empties_the_hand_advances_one_seat() {
        let mut table =
            table_with_hands(&[("a", &[48]), ("b", &[8]), ("c", &[12])]);
        let outcome = table.play_cards("a", cards(&[48])).unwrap();
        assert_eq!(outcome, PlayOutcome::Continue);
        assert_eq!(table.winner_order(), ["a"]);
        // The turn pointer re-indexes over the remaining contenders,
        // so the seat after the departed one is skipped over.
        assert_eq!(active_name(&table), "c");
        assert_eq!(table.last_play(), Some(&[][..]));
    }

    // =====================================================================
    // Skip rule
    // =====================================================================

    #[test]
    fn test_matching_rank_skips_the_next_seat() {
        // The trigger matches the entry the play just beat — the
        // observed two-entries-back comparison, kept as-is.
        let mut table = table_with_hands(&[
            ("a", &[20, 4]),
            ("b", &[22, 5]),
            ("c", &[30, 6]),
            ("d", &[40, 7]),
        ]);
        table.play_cards("a", cards(&[20])).unwrap();
        table.play_cards("b", cards(&[22])).unwrap();

        // c was skipped (marked passed); play moved on to d.
        assert_eq!(
            table.player("c").unwrap().state,
            PlayerState::Passed
        );
        assert_eq!(active_name(&table), "d");
    }

    #[test]
    fn test_no_skip_across_a_reset_marker() {
        let mut table = table_with_hands(&[
            ("a", &[48, 20]),
            ("b", &[21, 5]),
            ("c", &[30, 6]),
        ]);
        // a's two closes the chain and appends a reset marker.
        table.play_cards("a", cards(&[48])).unwrap();
        assert_eq!(table.last_play(), Some(&[][..]));
        // a leads again; the lead sits next to the reset marker, so it
        // can never match a prior rank and skip anyone.
        table.play_cards("a", cards(&[20])).unwrap();
        assert_eq!(active_name(&table), "b");
        assert_ne!(table.player("b").unwrap().state, PlayerState::Passed);
    }

    // =====================================================================
    // Round resets and round end
    // =====================================================================

    #[test]
    fn test_everyone_passing_appends_a_reset_marker() {
        let mut table = table_with_hands(&[
            ("a", &[20, 4]),
            ("b", &[24]),
            ("c", &[30]),
        ]);
        table.play_cards("a", cards(&[20])).unwrap();
        table.play_cards("b", Vec::new()).unwrap();
        assert_ne!(table.last_play(), Some(&[][..]));
        table.play_cards("c", Vec::new()).unwrap();

        // Both opponents folded: new beat chain, a leads anything.
        assert_eq!(active_name(&table), "a");
        assert_eq!(table.last_play(), Some(&[][..]));
        assert!(table.validate_play("a", &cards(&[4])).is_ok());
    }

    #[test]
    fn test_round_over_when_one_player_remains() {
        let mut table = table_with_hands(&[("a", &[20]), ("b", &[24])]);
        let outcome = table.play_cards("a", cards(&[20])).unwrap();
        assert_eq!(outcome, PlayOutcome::RoundOver);
        assert_eq!(table.winner_order(), ["a"]);
    }

    #[test]
    fn test_finish_round_orders_players_and_clears_the_table() {
        let mut table =
            table_with_hands(&[("a", &[20]), ("b", &[24]), ("c", &[30])]);
        table.play_cards("a", cards(&[20])).unwrap();
        // a went out, so the turn pointer lands on c over the remaining
        // pair; c beats the lone rank 5 with a rank 7.
        table.play_cards("c", cards(&[30])).unwrap();
        // Only b holds cards now: round over, b is the scumbag.
        let out = table.finish_round();
        let names: Vec<&str> = out.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["a", "c", "b"]);
        assert!(table.is_empty());
        assert!(table.history().is_empty());
        assert!(!table.starting_round());
        assert!(out.iter().all(|p| p.hand().is_empty()));
        assert!(out.iter().all(|p| p.state == PlayerState::Lobby));
    }

    // =====================================================================
    // Dealing
    // =====================================================================

    #[test]
    fn test_deal_clears_history_and_conserves_the_deck() {
        let mut table = table_with_hands(&[
            ("a", &[20]),
            ("b", &[24]),
            ("c", &[30, 31]),
        ]);
        table.play_cards("a", cards(&[20])).unwrap();
        table.deal();

        assert!(table.history().is_empty());
        assert!(table.winner_order().is_empty());
        let total: usize =
            table.seats().iter().map(|p| p.hand().len()).sum();
        assert_eq!(total, 52);

        let mut all: Vec<Card> = table
            .seats()
            .iter()
            .flat_map(|p| p.hand().iter().copied())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 52);
    }

    #[test]
    fn test_cards_are_conserved_across_plays_and_passes() {
        // Every card is in exactly one hand or on the table, so hands
        // plus history always total the full deck mid-round.
        fn cards_in_play(table: &Table) -> usize {
            let in_hands: usize =
                table.seats().iter().map(|p| p.hand().len()).sum();
            let on_table: usize =
                table.history().iter().map(|play| play.len()).sum();
            in_hands + on_table
        }

        let a: Vec<u8> = (0..=17).collect();
        let b: Vec<u8> = (18..=35).collect();
        let c: Vec<u8> = (36..=51).collect();
        let mut table = table_with_hands(&[
            ("a", a.as_slice()),
            ("b", b.as_slice()),
            ("c", c.as_slice()),
        ]);
        assert_eq!(cards_in_play(&table), 52);

        table.play_cards("a", cards(&[0])).unwrap();
        assert_eq!(cards_in_play(&table), 52);
        table.play_cards("b", cards(&[20])).unwrap();
        assert_eq!(cards_in_play(&table), 52);

        // A wild two resets the pile and "c" leads again; the reset
        // marker is empty and must not disturb the count.
        table.play_cards("c", cards(&[48])).unwrap();
        assert_eq!(cards_in_play(&table), 52);
        table.play_cards("c", cards(&[36])).unwrap();
        assert_eq!(cards_in_play(&table), 52);

        // Everyone else passing appends another marker.
        table.play_cards("a", Vec::new()).unwrap();
        assert_eq!(cards_in_play(&table), 52);
        table.play_cards("b", Vec::new()).unwrap();
        assert_eq!(cards_in_play(&table), 52);

        table.play_cards("c", cards(&[40])).unwrap();
        assert_eq!(cards_in_play(&table), 52);
    }

    // =====================================================================
    // Swap ritual
    // =====================================================================

    #[test]
    fn test_swap_takes_the_scumbags_highest_card_into_escrow() {
        let mut table =
            table_with_hands(&[("war", &[4, 5]), ("mid", &[8]), ("scum", &[30, 44])]);
        let offer = table.begin_swap().unwrap();
        assert_eq!(offer.warlord, "war");
        assert_eq!(offer.scumbag, "scum");
        assert_eq!(offer.card, card(44));
        // The card sits in escrow: neither hand grows past its dealt
        // size while the ritual is open.
        assert!(!table.player("war").unwrap().holds(card(44)));
        assert!(!table.player("scum").unwrap().holds(card(44)));
        assert_eq!(table.player("war").unwrap().hand().len(), 2);
        assert!(table.swap_pending());
    }

    #[test]
    fn test_swap_resolution_exchanges_the_chosen_card() {
        let mut table =
            table_with_hands(&[("war", &[4, 5]), ("scum", &[30, 44])]);
        table.begin_swap().unwrap();

        // A card the warlord does not hold is rejected and the ritual
        // stays pending.
        assert_eq!(
            table.resolve_swap(card(12)),
            Err(PlayError::InvalidSwap)
        );
        assert!(table.swap_pending());

        let result = table.resolve_swap(card(4)).unwrap();
        assert_eq!(result, SwapResult { gained: card(4), lost: card(44) });
        assert!(!table.swap_pending());
        assert!(table.player("scum").unwrap().holds(card(4)));
        assert!(table.player("war").unwrap().holds(card(44)));
        assert!(!table.player("war").unwrap().holds(card(4)));
        assert_eq!(table.player("war").unwrap().hand().len(), 2);
        assert_eq!(table.player("scum").unwrap().hand().len(), 2);
    }

    #[test]
    fn test_warlord_can_return_the_escrowed_card_itself() {
        let mut table =
            table_with_hands(&[("war", &[4, 5]), ("scum", &[30, 44])]);
        table.begin_swap().unwrap();

        let result = table.resolve_swap(card(44)).unwrap();
        assert_eq!(result, SwapResult { gained: card(44), lost: card(44) });
        assert!(!table.swap_pending());
        // Both hands end up exactly as dealt.
        assert!(table.player("scum").unwrap().holds(card(44)));
        assert_eq!(table.player("war").unwrap().hand(), &[card(4), card(5)]);
    }

    #[test]
    fn test_hand_message_stays_in_width_during_a_swap() {
        // At a three-player table the warlord is dealt a full 18-card
        // hand; an shand sent while the swap is open must still encode
        // at the fixed frame width.
        let mut table = Table::new();
        for name in ["war", "mid", "scum"] {
            table.add_player(Player::new(name)).unwrap();
        }
        table.deal();
        table.begin_swap().unwrap();

        let hand = table.player("war").unwrap().hand().to_vec();
        assert!(hand.len() <= HAND_WIDTH);
        let frame = ServerMessage::Hand { cards: hand }.encode();
        assert_eq!(frame.len(), "[shand|".len() + HAND_WIDTH * 3 - 1 + 1);
    }

    #[test]
    fn test_cancelled_swap_restores_the_scumbags_hand() {
        let mut table =
            table_with_hands(&[("war", &[4, 5]), ("scum", &[30, 44])]);
        table.begin_swap().unwrap();
        table.cancel_swap();

        assert!(!table.swap_pending());
        let scum = table.player("scum").unwrap();
        assert!(scum.holds(card(30)));
        assert!(scum.holds(card(44)));
        assert_eq!(table.player("war").unwrap().hand().len(), 2);
    }

    #[test]
    fn test_resolve_without_a_pending_swap_is_rejected() {
        let mut table = table_with_hands(&[("a", &[4]), ("b", &[8])]);
        assert_eq!(table.resolve_swap(card(4)), Err(PlayError::InvalidSwap));
    }

    // =====================================================================
    // Disconnect unwinding
    // =====================================================================

    #[test]
    fn test_removing_a_seat_keeps_the_turn_on_the_same_player() {
        let mut table = table_with_hands(&[
            ("a", &[20, 4]),
            ("b", &[24]),
            ("c", &[30]),
            ("d", &[40]),
        ]);
        table.play_cards("a", cards(&[20])).unwrap();
        assert_eq!(active_name(&table), "b");

        // a leaves; b must still be the active player.
        table.remove_player("a");
        assert_eq!(active_name(&table), "b");
        assert!(table.validate_play("b", &cards(&[24])).is_ok());
    }

    #[test]
    fn test_removing_the_active_player_hands_the_turn_on() {
        let mut table =
            table_with_hands(&[("a", &[20]), ("b", &[24]), ("c", &[30])]);
        assert_eq!(active_name(&table), "a");
        table.remove_player("a");
        assert_eq!(active_name(&table), "b");
    }
}
