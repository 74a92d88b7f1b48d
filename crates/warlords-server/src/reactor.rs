//! The game reactor: one task that owns all server state.
//!
//! Every connection task funnels into a single mpsc channel, and this
//! loop is the only place that touches the table, the lobby, or the
//! sessions. No locks, no shared mutable state; the turn clock and the
//! swap deadline are just the other arm of a `select!`.

use std::collections::HashMap;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::Instant;
use warlords_engine::{PlayOutcome, Player, Table, TABLE_CAPACITY};
use warlords_protocol::{
    Card, ClientMessage, ServerMessage, StrikeCode, TABLE_SEATS,
};
use warlords_session::{mangle_name, Session, MAX_STRIKES};

use crate::net::{self, ConnectionId, Event, Outbound};
use crate::{ServerConfig, ServerError};

/// A bound and running server, not yet reacting.
///
/// Splitting bind from run lets callers (and tests) learn the actual
/// listen address before any client connects.
pub struct GameServer {
    config: ServerConfig,
    listener: TcpListener,
}

impl GameServer {
    /// Validates the configuration and binds the listen socket.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let listener = TcpListener::bind(&config.bind_addr).await?;
        tracing::info!(addr = %config.bind_addr, "listening");
        Ok(Self { config, listener })
    }

    /// The bound address, useful when binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop and the reactor until the process ends.
    pub async fn run(self) -> Result<(), ServerError> {
        let (events_tx, events_rx) = mpsc::channel(256);
        tokio::spawn(net::run_acceptor(self.listener, events_tx));
        Reactor::new(self.config, events_rx).run().await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// What the server is waiting on. The phase's deadline, when it has
/// one, is the timer arm of the reactor's `select!`.
#[derive(Debug, Clone, Copy)]
enum Phase {
    /// Not enough players seated; nothing scheduled.
    Waiting,
    /// Enough players to start; holding the door for stragglers.
    Filling { deadline: Instant },
    /// Cards dealt, swap offered; the warlord is on the clock.
    Swapping { deadline: Instant },
    /// Round running; the active player is on the clock.
    Playing { deadline: Instant },
}

impl Phase {
    fn deadline(&self) -> Option<Instant> {
        match self {
            Self::Waiting => None,
            Self::Filling { deadline }
            | Self::Swapping { deadline }
            | Self::Playing { deadline } => Some(*deadline),
        }
    }
}

// ---------------------------------------------------------------------------
// Reactor
// ---------------------------------------------------------------------------

struct Conn {
    session: Session,
    outbound: Outbound,
}

struct Reactor {
    config: ServerConfig,
    events: mpsc::Receiver<Event>,
    conns: HashMap<ConnectionId, Conn>,
    table: Table,
    lobby: Vec<Player>,
    phase: Phase,
}

impl Reactor {
    fn new(config: ServerConfig, events: mpsc::Receiver<Event>) -> Self {
        Self {
            config,
            events,
            conns: HashMap::new(),
            table: Table::new(),
            lobby: Vec::new(),
            phase: Phase::Waiting,
        }
    }

    async fn run(mut self) {
        tracing::info!("reactor running");
        loop {
            let deadline = self.phase.deadline();
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    // Acceptor gone; nothing can ever arrive again.
                    None => break,
                },
                _ = sleep_until_opt(deadline), if deadline.is_some() => {
                    self.handle_deadline();
                }
            }
        }
        tracing::info!("reactor stopped");
    }

    // -----------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Connected { id, outbound } => {
                self.conns.insert(
                    id,
                    Conn {
                        session: Session::new(),
                        outbound,
                    },
                );
            }
            Event::Data { id, bytes } => self.handle_data(id, &bytes),
            Event::Closed { id } => {
                if let Some(conn) = self.conns.remove(&id) {
                    let name = conn.session.player().map(str::to_string);
                    self.departed(name);
                }
            }
        }
    }

    fn handle_data(&mut self, id: ConnectionId, bytes: &[u8]) {
        match self.conns.get_mut(&id) {
            None => return,
            Some(conn) => {
                if conn.session.push_bytes(bytes).is_err() {
                    self.strike(id, StrikeCode::Flood);
                    return;
                }
            }
        }
        loop {
            // Re-borrow every iteration; a strike may have kicked the
            // connection mid-batch.
            let frame = match self.conns.get_mut(&id) {
                Some(conn) => conn.session.next_frame(),
                None => return,
            };
            let Some(frame) = frame else { break };
            tracing::debug!(%id, %frame, "received");
            match ClientMessage::parse(&frame) {
                Ok(msg) => self.handle_message(id, msg),
                Err(e) => {
                    tracing::warn!(%id, error = %e, "invalid message");
                    self.strike(id, StrikeCode::MalformedMessage);
                    break;
                }
            }
        }
    }

    fn handle_message(&mut self, id: ConnectionId, msg: ClientMessage) {
        match msg {
            ClientMessage::Join { name } => self.handle_join(id, &name),
            ClientMessage::Chat { text } => self.handle_chat(id, text),
            ClientMessage::Play { cards } => self.handle_play(id, cards),
            ClientMessage::HandRequest => self.handle_hand_request(id),
            ClientMessage::SwapResponse { card } => {
                self.handle_swap_response(id, card)
            }
        }
    }

    fn handle_join(&mut self, id: ConnectionId, requested: &str) {
        let already_joined = self
            .conns
            .get(&id)
            .is_some_and(|c| c.session.player().is_some());
        if already_joined {
            self.strike(id, StrikeCode::MalformedMessage);
            return;
        }

        let taken: Vec<String> = self
            .table
            .seats()
            .iter()
            .chain(self.lobby.iter())
            .map(|p| p.name().to_string())
            .collect();
        let name = mangle_name(&taken, requested);

        if let Some(conn) = self.conns.get_mut(&id) {
            conn.session.bind(name.clone());
        }
        self.send(id, &ServerMessage::JoinAck { name: name.clone() });

        let player = Player::new(name.clone());
        if self.table.is_full() {
            tracing::info!(player = %name, "joined the lobby");
            self.lobby.push(player);
            self.broadcast_lobby();
        } else {
            tracing::info!(player = %name, "joined the table");
            // Guarded by is_full above.
            let _ = self.table.add_player(player);
            self.broadcast_table();
            self.maybe_start();
        }
    }

    fn handle_chat(&mut self, id: ConnectionId, text: String) {
        let Some(name) = self.player_name(id) else {
            self.strike(id, StrikeCode::NotSeated);
            return;
        };
        self.broadcast(&ServerMessage::Chat { name, text });
    }

    fn handle_play(&mut self, id: ConnectionId, cards: Vec<Card>) {
        let Some(name) = self.player_name(id) else {
            self.strike(id, StrikeCode::NotSeated);
            return;
        };
        match self.table.play_cards(&name, cards) {
            Err(e) => {
                tracing::info!(player = %name, error = %e, "play rejected");
                self.strike(id, e.strike_code());
                // The authoritative hand, so the client can resync.
                self.send_hand(id);
                self.broadcast_table();
            }
            Ok(outcome) => {
                tracing::info!(player = %name, "play accepted");
                if let Phase::Playing { deadline } = &mut self.phase {
                    *deadline = Instant::now() + self.config.turn_timeout;
                }
                self.broadcast_table();
                if outcome == PlayOutcome::RoundOver {
                    self.finish_round();
                }
            }
        }
    }

    fn handle_hand_request(&mut self, id: ConnectionId) {
        if self.player_name(id).is_none() {
            self.strike(id, StrikeCode::NotSeated);
            return;
        }
        self.send_hand(id);
    }

    fn handle_swap_response(&mut self, id: ConnectionId, card: Option<Card>) {
        let Some(name) = self.player_name(id) else {
            self.strike(id, StrikeCode::NotSeated);
            return;
        };
        let is_warlord = matches!(self.phase, Phase::Swapping { .. })
            && self
                .table
                .seats()
                .first()
                .is_some_and(|p| p.name() == name);
        if !is_warlord {
            self.strike(id, StrikeCode::InvalidSwap);
            return;
        }
        // The sentinel decodes to None; no card is not a valid answer.
        let Some(card) = card else {
            self.strike(id, StrikeCode::InvalidSwap);
            return;
        };
        match self.table.resolve_swap(card) {
            Ok(result) => {
                tracing::info!(
                    warlord = %name,
                    gained = %result.lost,
                    returned = %result.gained,
                    "swap settled"
                );
                let scumbag = self
                    .table
                    .seats()
                    .last()
                    .map(|p| p.name().to_string());
                if let Some(sid) = scumbag.and_then(|n| self.conn_for(&n)) {
                    self.send(
                        sid,
                        &ServerMessage::SwapResult {
                            gained: result.gained,
                            lost: result.lost,
                        },
                    );
                    self.send_hand(sid);
                }
                self.send_hand(id);
                self.start_play();
            }
            // The offer stays on the table until the deadline.
            Err(e) => self.strike(id, e.strike_code()),
        }
    }

    // -----------------------------------------------------------------
    // Deadlines
    // -----------------------------------------------------------------

    fn handle_deadline(&mut self) {
        match self.phase {
            Phase::Waiting => {}
            Phase::Filling { .. } => self.start_round(),
            Phase::Swapping { .. } => self.swap_timed_out(),
            Phase::Playing { .. } => self.play_timed_out(),
        }
    }

    fn swap_timed_out(&mut self) {
        tracing::info!("swap timed out, reversing");
        self.table.cancel_swap();
        let warlord = self
            .table
            .seats()
            .first()
            .map(|p| p.name().to_string());
        let scumbag = self
            .table
            .seats()
            .last()
            .map(|p| p.name().to_string());
        for name in [&warlord, &scumbag].into_iter().flatten() {
            if let Some(id) = self.conn_for(name) {
                self.send_hand(id);
            }
        }
        if let Some(id) = warlord.and_then(|n| self.conn_for(&n)) {
            self.strike(id, StrikeCode::Timeout);
        }
        self.start_play();
    }

    fn play_timed_out(&mut self) {
        let Some(name) =
            self.table.active_player().map(|p| p.name().to_string())
        else {
            tracing::warn!("turn clock fired with no active player");
            self.phase = Phase::Playing {
                deadline: Instant::now() + self.config.turn_timeout,
            };
            return;
        };
        tracing::info!(player = %name, "turn timed out, passing");
        match self.table.timeout_pass(&name) {
            Ok(outcome) => {
                if let Some(id) = self.conn_for(&name) {
                    self.strike(id, StrikeCode::Timeout);
                }
                self.broadcast_table();
                if outcome == PlayOutcome::RoundOver {
                    self.finish_round();
                } else {
                    self.phase = Phase::Playing {
                        deadline: Instant::now() + self.config.turn_timeout,
                    };
                }
            }
            Err(e) => {
                // Leaves the phase alone; the next event will resolve it.
                tracing::error!(player = %name, error = %e, "forced pass failed");
            }
        }
    }

    // -----------------------------------------------------------------
    // Round lifecycle
    // -----------------------------------------------------------------

    /// Schedules or starts a round when enough players are seated.
    fn maybe_start(&mut self) {
        match self.phase {
            Phase::Waiting => {
                if self.table.is_full() {
                    self.start_round();
                } else if self.table.seated_count() >= self.config.min_players {
                    self.phase = Phase::Filling {
                        deadline: Instant::now() + self.config.fill_timeout,
                    };
                }
            }
            Phase::Filling { .. } => {
                if self.table.is_full() {
                    self.start_round();
                }
            }
            _ => {}
        }
    }

    fn start_round(&mut self) {
        if self.table.seated_count() < self.config.min_players {
            self.phase = Phase::Waiting;
            return;
        }
        tracing::info!(players = self.table.seated_count(), "dealing");
        self.table.deal();
        self.send_all_hands();

        if self.table.starting_round() {
            self.table.open_first_round();
            self.broadcast_table();
            self.phase = Phase::Playing {
                deadline: Instant::now() + self.config.turn_timeout,
            };
        } else if let Some(offer) = self.table.begin_swap() {
            if let Some(id) = self.conn_for(&offer.warlord) {
                self.send(id, &ServerMessage::SwapOffer { card: offer.card });
            }
            self.broadcast_table();
            self.phase = Phase::Swapping {
                deadline: Instant::now() + self.config.swap_timeout,
            };
        } else {
            self.start_play();
        }
    }

    /// Opens play after the swap ritual settles (or is skipped).
    fn start_play(&mut self) {
        if self.table.active_players().len() <= 1 {
            self.finish_round();
            return;
        }
        self.table.open_round();
        self.broadcast_table();
        self.phase = Phase::Playing {
            deadline: Instant::now() + self.config.turn_timeout,
        };
    }

    fn finish_round(&mut self) {
        tracing::info!(winners = ?self.table.winner_order(), "round over");
        // Final standings with the scumbag still holding cards.
        self.broadcast_table();
        let finished = self.table.finish_round();
        self.reseat(finished);
        self.broadcast_lobby();

        if self.table.is_full() {
            self.start_round();
        } else if self.table.seated_count() >= self.config.min_players {
            self.phase = Phase::Filling {
                deadline: Instant::now() + self.config.fill_timeout,
            };
        } else {
            self.phase = Phase::Waiting;
        }
    }

    /// Refills the table for the next round. Lobby players get seats
    /// first; last round's finishers take the rest in finishing order,
    /// so the warlord lands back on seat 0. Everyone who does not fit
    /// waits in the lobby.
    fn reseat(&mut self, finished: Vec<Player>) {
        if self.lobby.len() > TABLE_CAPACITY {
            let rest = self.lobby.split_off(TABLE_CAPACITY);
            let seated = std::mem::replace(&mut self.lobby, rest);
            self.lobby.extend(finished);
            for player in seated {
                let _ = self.table.add_player(player);
            }
        } else {
            let seated = std::mem::take(&mut self.lobby);
            let seats_left = TABLE_CAPACITY - seated.len();
            let mut old = finished;
            let overflow = if old.len() > seats_left {
                old.split_off(seats_left)
            } else {
                Vec::new()
            };
            self.lobby = overflow;
            for player in old {
                let _ = self.table.add_player(player);
            }
            for player in seated {
                let _ = self.table.add_player(player);
            }
        }
    }

    // -----------------------------------------------------------------
    // Strikes and departures
    // -----------------------------------------------------------------

    fn strike(&mut self, id: ConnectionId, code: StrikeCode) {
        let (count, name) = match self.conns.get_mut(&id) {
            Some(conn) => (
                conn.session.add_strike(),
                conn.session.player().map(str::to_string),
            ),
            None => return,
        };
        // Mirror onto the seat so stabl reports it.
        if let Some(name) = &name {
            if let Some(player) = self.table.player_mut(name) {
                player.strikes = count;
            } else if let Some(player) =
                self.lobby.iter_mut().find(|p| p.name() == name)
            {
                player.strikes = count;
            }
        }
        tracing::info!(%id, %code, count, "strike");
        self.send(id, &ServerMessage::Strike { code, count });
        if count >= MAX_STRIKES {
            tracing::info!(%id, "three strikes, kicking");
            if let Some(conn) = self.conns.remove(&id) {
                let name = conn.session.player().map(str::to_string);
                self.departed(name);
            }
        }
    }

    /// Unwinds a player who left, was kicked, or dropped carrier.
    fn departed(&mut self, name: Option<String>) {
        let Some(name) = name else { return };

        if let Some(pos) = self.lobby.iter().position(|p| p.name() == name) {
            self.lobby.remove(pos);
            tracing::info!(player = %name, "left the lobby");
            self.broadcast_lobby();
            return;
        }
        if self.table.player(&name).is_none() {
            return;
        }
        tracing::info!(player = %name, "left the table");

        let swap_participant = self.table.swap_pending() && {
            let seats = self.table.seats();
            seats.first().is_some_and(|p| p.name() == name)
                || seats.last().is_some_and(|p| p.name() == name)
        };
        if swap_participant {
            self.table.cancel_swap();
        }
        self.table.remove_player(&name);

        if self.table.is_empty() && self.lobby.is_empty() {
            // Nobody left; the next table starts from scratch.
            self.table.mark_fresh();
            self.phase = Phase::Waiting;
            return;
        }
        self.broadcast_table();

        match self.phase {
            Phase::Playing { .. } => {
                if self.table.active_players().len() <= 1 {
                    self.finish_round();
                }
            }
            Phase::Swapping { .. } if swap_participant => {
                self.start_play();
            }
            Phase::Waiting | Phase::Filling { .. } => {
                if self.table.seated_count() < self.config.min_players {
                    self.phase = Phase::Waiting;
                }
            }
            _ => {}
        }
    }

    // -----------------------------------------------------------------
    // Outbound helpers
    // -----------------------------------------------------------------

    fn player_name(&self, id: ConnectionId) -> Option<String> {
        self.conns
            .get(&id)
            .and_then(|c| c.session.player())
            .map(str::to_string)
    }

    fn conn_for(&self, name: &str) -> Option<ConnectionId> {
        self.conns
            .iter()
            .find(|(_, c)| c.session.player() == Some(name))
            .map(|(id, _)| *id)
    }

    fn send(&self, id: ConnectionId, msg: &ServerMessage) {
        if let Some(conn) = self.conns.get(&id) {
            let _ = conn.outbound.send(msg.encode());
        }
    }

    fn send_hand(&self, id: ConnectionId) {
        let Some(conn) = self.conns.get(&id) else { return };
        let Some(name) = conn.session.player() else { return };
        let cards = self
            .table
            .player(name)
            .map(|p| p.hand().to_vec())
            .unwrap_or_default();
        let _ = conn.outbound.send(ServerMessage::Hand { cards }.encode());
    }

    fn send_all_hands(&self) {
        for player in self.table.seats() {
            if let Some(id) = self.conn_for(player.name()) {
                self.send_hand(id);
            }
        }
    }

    fn broadcast(&self, msg: &ServerMessage) {
        let text = msg.encode();
        for conn in self.conns.values() {
            let _ = conn.outbound.send(text.clone());
        }
    }

    fn broadcast_table(&self) {
        let mut seats: Vec<_> = self
            .table
            .seats()
            .iter()
            .map(|p| Some(p.seat_status()))
            .collect();
        seats.resize(TABLE_SEATS, None);
        self.broadcast(&ServerMessage::Table {
            seats,
            last_play: self
                .table
                .last_play()
                .map(<[Card]>::to_vec)
                .unwrap_or_default(),
            starting_round: self.table.starting_round(),
        });
    }

    fn broadcast_lobby(&self) {
        if self.lobby.is_empty() {
            return;
        }
        let names = self.lobby.iter().map(|p| p.name().to_string()).collect();
        self.broadcast(&ServerMessage::Lobby { names });
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        // Guarded out in the select; never polled.
        None => std::future::pending().await,
    }
}
