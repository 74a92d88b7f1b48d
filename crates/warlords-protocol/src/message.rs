//! Message types and their fixed-field text encodings.
//!
//! Every message on the wire is ASCII text of the form
//! `[` + five-character type code + zero or more `|field` + `]`.
//! Validation is two-tier: [`frame_kind`] checks the general grammar
//! (tier 1), and each `parse` enforces the per-type field widths and
//! character classes (tier 2). A frame that passes tier 1 but fails
//! tier 2 is still invalid.
//!
//! Card-list fields are always padded to a fixed count with the
//! sentinel 52, so a message of a given type has constant width and
//! the table-status message can be decoded by fixed offsets.

use std::fmt;

use crate::card::{cards_to_str, str_to_cards, Card, NO_CARD};
use crate::{StrikeCode, WireError};

/// Join names are exactly this many characters, right-padded.
pub const NAME_WIDTH: usize = 8;
/// Chat payloads are exactly this many characters.
pub const CHAT_WIDTH: usize = 63;
/// A play field carries exactly this many card codes.
pub const PLAY_WIDTH: usize = 4;
/// A hand field carries exactly this many card codes.
pub const HAND_WIDTH: usize = 18;
/// Seats encoded in every table-status message.
pub const TABLE_SEATS: usize = 7;
/// Exact byte length of an encoded `stabl` frame.
pub const STABL_LEN: usize = 126;

const CLIENT_KINDS: [&str; 5] = ["cjoin", "cchat", "cplay", "chand", "cswap"];
const SERVER_KINDS: [&str; 8] = [
    "sjoin", "shand", "stabl", "slobb", "schat", "strik", "swapw", "swaps",
];

// ---------------------------------------------------------------------------
// Player state
// ---------------------------------------------------------------------------

/// Where a player stands, as carried in the `stabl` status character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Waiting in the lobby, not seated.
    Lobby,
    /// Seated and it is their turn.
    Active,
    /// Seated, not their turn.
    Waiting,
    /// Seated and passed since the last round reset.
    Passed,
    /// Connection lost; seat being unwound.
    Disconnected,
}

impl PlayerState {
    /// The one-character wire form.
    pub fn code(self) -> char {
        match self {
            Self::Lobby => 'l',
            Self::Active => 'a',
            Self::Waiting => 'w',
            Self::Passed => 'p',
            Self::Disconnected => 'd',
        }
    }

    /// Parses the one-character wire form. `'e'` (empty seat) is not a
    /// player state; empty seats decode to `None` in [`ServerMessage::Table`].
    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'l' => Self::Lobby,
            'a' => Self::Active,
            'w' => Self::Waiting,
            'p' => Self::Passed,
            'd' => Self::Disconnected,
            _ => return None,
        })
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Seat snapshots
// ---------------------------------------------------------------------------

/// One occupied seat in a table-status message.
///
/// An unoccupied seat is `Option::None` — there is no null-player
/// sentinel in the data model, only in the wire encoding
/// (`e0:        :00`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatStatus {
    pub state: PlayerState,
    pub strikes: u8,
    pub name: String,
    pub cards: u8,
}

fn encode_seat(seat: Option<&SeatStatus>) -> String {
    match seat {
        Some(s) => format!(
            "{}{}:{:<8}:{:02}",
            s.state.code(),
            s.strikes,
            s.name,
            s.cards
        ),
        None => "e0:        :00".to_string(),
    }
}

fn parse_seat(block: &str) -> Result<Option<SeatStatus>, WireError> {
    let bad = || WireError::InvalidField {
        what: "seat",
        text: block.to_string(),
    };
    let bytes = block.as_bytes();
    if block.len() != 14 || bytes[2] != b':' || bytes[11] != b':' {
        return Err(bad());
    }
    let status = bytes[0] as char;
    if status == 'e' {
        return Ok(None);
    }
    let state = PlayerState::from_code(status).ok_or_else(bad)?;
    let strikes = (bytes[1] as char).to_digit(10).ok_or_else(bad)? as u8;
    if strikes > 3 {
        return Err(bad());
    }
    let name = parse_name_field(&block[3..11])?;
    let cards: u8 = block[12..14].parse().map_err(|_| bad())?;
    Ok(Some(SeatStatus {
        state,
        strikes,
        name,
        cards,
    }))
}

// ---------------------------------------------------------------------------
// General grammar (tier 1)
// ---------------------------------------------------------------------------

/// Checks the general grammar and returns the five-character type code.
///
/// # Errors
/// [`WireError::BadFrame`] for anything not shaped like
/// `[ttttt...]`, [`WireError::UnknownType`] for an unrecognized code.
pub fn frame_kind(frame: &str) -> Result<&str, WireError> {
    if frame.len() < 7
        || !frame.starts_with('[')
        || !frame.ends_with(']')
        || !frame.is_ascii()
    {
        return Err(WireError::BadFrame);
    }
    let interior = &frame[1..frame.len() - 1];
    if interior.contains('[') || interior.contains(']') {
        return Err(WireError::BadFrame);
    }
    let kind = &frame[1..6];
    if !CLIENT_KINDS.contains(&kind) && !SERVER_KINDS.contains(&kind) {
        return Err(WireError::UnknownType(kind.to_string()));
    }
    // After the type code comes either the closing bracket or a field
    // separator; anything else fails the grammar.
    if frame.len() > 7 && frame.as_bytes()[6] != b'|' {
        return Err(WireError::BadFrame);
    }
    Ok(kind)
}

fn fields(frame: &str) -> Vec<&str> {
    if frame.len() <= 7 {
        Vec::new()
    } else {
        frame[7..frame.len() - 1].split('|').collect()
    }
}

fn expect_fields<'a>(
    frame: &'a str,
    kind: &'static str,
    expected: usize,
) -> Result<Vec<&'a str>, WireError> {
    let fields = fields(frame);
    if fields.len() != expected {
        return Err(WireError::FieldCount {
            kind,
            expected,
            got: fields.len(),
        });
    }
    Ok(fields)
}

/// Whether `name` matches the join-name grammar: one leading letter or
/// underscore, then up to seven word characters.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= NAME_WIDTH
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_name_field(field: &str) -> Result<String, WireError> {
    let bad = || WireError::InvalidField {
        what: "name",
        text: field.to_string(),
    };
    if field.len() != NAME_WIDTH {
        return Err(bad());
    }
    let name = field.trim_end_matches(' ');
    if name.len() < field.len() && !field[name.len()..].chars().all(|c| c == ' ')
    {
        return Err(bad());
    }
    if !is_valid_name(name) {
        return Err(bad());
    }
    Ok(name.to_string())
}

fn parse_chat_field(field: &str) -> Result<String, WireError> {
    if field.len() != CHAT_WIDTH
        || field.contains(['[', ']', '|'])
        || !field.is_ascii()
    {
        return Err(WireError::InvalidField {
            what: "chat text",
            text: field.to_string(),
        });
    }
    Ok(field.trim_end_matches(' ').to_string())
}

fn parse_card_list(field: &str, width: usize) -> Result<Vec<Card>, WireError> {
    if field.len() != width * 3 - 1 || field.split(',').count() != width {
        return Err(WireError::InvalidField {
            what: "card list",
            text: field.to_string(),
        });
    }
    str_to_cards(field)
}

fn parse_single_card(field: &str) -> Result<Option<Card>, WireError> {
    let mut cards = parse_card_list(field, 1)?;
    Ok(cards.pop())
}

// ---------------------------------------------------------------------------
// Client messages
// ---------------------------------------------------------------------------

/// A message a client may send to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// `cjoin` — request to join under the given (unpadded) name.
    Join { name: String },
    /// `cchat` — chat text, at most 63 characters.
    Chat { text: String },
    /// `cplay` — a play; an empty card list is a pass.
    Play { cards: Vec<Card> },
    /// `chand` — request a resend of the authoritative hand.
    HandRequest,
    /// `cswap` — the warlord's swap response. `None` is the padding
    /// sentinel, which is never a valid card to give back.
    SwapResponse { card: Option<Card> },
}

impl ClientMessage {
    /// Parses a complete frame as a client message (both tiers).
    pub fn parse(frame: &str) -> Result<Self, WireError> {
        let kind = frame_kind(frame)?;
        match kind {
            "cjoin" => {
                let f = expect_fields(frame, "cjoin", 1)?;
                Ok(Self::Join {
                    name: parse_name_field(f[0])?,
                })
            }
            "cchat" => {
                let f = expect_fields(frame, "cchat", 1)?;
                Ok(Self::Chat {
                    text: parse_chat_field(f[0])?,
                })
            }
            "cplay" => {
                let f = expect_fields(frame, "cplay", 1)?;
                Ok(Self::Play {
                    cards: parse_card_list(f[0], PLAY_WIDTH)?,
                })
            }
            "chand" => {
                expect_fields(frame, "chand", 0)?;
                Ok(Self::HandRequest)
            }
            "cswap" => {
                let f = expect_fields(frame, "cswap", 1)?;
                Ok(Self::SwapResponse {
                    card: parse_single_card(f[0])?,
                })
            }
            other => Err(WireError::UnknownType(other.to_string())),
        }
    }

    /// Encodes to the fixed-width wire form.
    pub fn encode(&self) -> String {
        match self {
            Self::Join { name } => format!("[cjoin|{name:<8}]"),
            Self::Chat { text } => format!("[cchat|{text:<63}]"),
            Self::Play { cards } => {
                format!("[cplay|{}]", cards_to_str(cards, PLAY_WIDTH))
            }
            Self::HandRequest => "[chand]".to_string(),
            Self::SwapResponse { card } => match card {
                Some(card) => format!("[cswap|{card}]"),
                None => format!("[cswap|{NO_CARD}]"),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Server messages
// ---------------------------------------------------------------------------

/// A message the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// `sjoin` — join acknowledged under this (possibly mangled) name.
    JoinAck { name: String },
    /// `shand` — the player's full authoritative hand.
    Hand { cards: Vec<Card> },
    /// `stabl` — snapshot of all seven seats, the last play, and the
    /// starting-round flag.
    Table {
        seats: Vec<Option<SeatStatus>>,
        last_play: Vec<Card>,
        starting_round: bool,
    },
    /// `slobb` — names currently waiting in the lobby.
    Lobby { names: Vec<String> },
    /// `schat` — chat line attributed to a player.
    Chat { name: String, text: String },
    /// `strik` — a demerit with its violation code and new total.
    Strike { code: StrikeCode, count: u8 },
    /// `swapw` — tells the warlord which card the scumbag surrendered.
    SwapOffer { card: Card },
    /// `swaps` — tells the scumbag what they gained and lost.
    SwapResult { gained: Card, lost: Card },
}

impl ServerMessage {
    /// Parses a complete frame as a server message (both tiers).
    pub fn parse(frame: &str) -> Result<Self, WireError> {
        let kind = frame_kind(frame)?;
        match kind {
            "sjoin" => {
                let f = expect_fields(frame, "sjoin", 1)?;
                Ok(Self::JoinAck {
                    name: parse_name_field(f[0])?,
                })
            }
            "shand" => {
                let f = expect_fields(frame, "shand", 1)?;
                Ok(Self::Hand {
                    cards: parse_card_list(f[0], HAND_WIDTH)?,
                })
            }
            "stabl" => Self::parse_table(frame),
            "slobb" => {
                let f = expect_fields(frame, "slobb", 2)?;
                let count: usize =
                    f[0].parse().map_err(|_| WireError::InvalidField {
                        what: "lobby count",
                        text: f[0].to_string(),
                    })?;
                let names = if f[1].is_empty() {
                    Vec::new()
                } else {
                    f[1].split(',')
                        .map(parse_name_field)
                        .collect::<Result<Vec<_>, _>>()?
                };
                if names.len() != count {
                    return Err(WireError::InvalidField {
                        what: "lobby count",
                        text: f[0].to_string(),
                    });
                }
                Ok(Self::Lobby { names })
            }
            "schat" => {
                let f = expect_fields(frame, "schat", 2)?;
                Ok(Self::Chat {
                    name: parse_name_field(f[0])?,
                    text: parse_chat_field(f[1])?,
                })
            }
            "strik" => {
                let f = expect_fields(frame, "strik", 2)?;
                let code =
                    StrikeCode::from_code(f[0]).ok_or_else(|| {
                        WireError::InvalidField {
                            what: "strike code",
                            text: f[0].to_string(),
                        }
                    })?;
                let count: u8 =
                    f[1].parse().map_err(|_| WireError::InvalidField {
                        what: "strike count",
                        text: f[1].to_string(),
                    })?;
                if f[1].len() != 1 || count > 3 {
                    return Err(WireError::InvalidField {
                        what: "strike count",
                        text: f[1].to_string(),
                    });
                }
                Ok(Self::Strike { code, count })
            }
            "swapw" => {
                let f = expect_fields(frame, "swapw", 1)?;
                let card = parse_single_card(f[0])?.ok_or(
                    WireError::CardOutOfRange(NO_CARD),
                )?;
                Ok(Self::SwapOffer { card })
            }
            "swaps" => {
                let f = expect_fields(frame, "swaps", 2)?;
                let gained = parse_single_card(f[0])?
                    .ok_or(WireError::CardOutOfRange(NO_CARD))?;
                let lost = parse_single_card(f[1])?
                    .ok_or(WireError::CardOutOfRange(NO_CARD))?;
                Ok(Self::SwapResult { gained, lost })
            }
            other => Err(WireError::UnknownType(other.to_string())),
        }
    }

    /// Encodes to the fixed-width wire form.
    pub fn encode(&self) -> String {
        match self {
            Self::JoinAck { name } => format!("[sjoin|{name:<8}]"),
            Self::Hand { cards } => {
                format!("[shand|{}]", cards_to_str(cards, HAND_WIDTH))
            }
            Self::Table {
                seats,
                last_play,
                starting_round,
            } => {
                let mut blocks = Vec::with_capacity(TABLE_SEATS);
                for i in 0..TABLE_SEATS {
                    blocks.push(encode_seat(
                        seats.get(i).and_then(|s| s.as_ref()),
                    ));
                }
                format!(
                    "[stabl|{}|{}|{}]",
                    blocks.join(","),
                    cards_to_str(last_play, PLAY_WIDTH),
                    u8::from(*starting_round)
                )
            }
            Self::Lobby { names } => {
                let padded: Vec<String> =
                    names.iter().map(|n| format!("{n:<8}")).collect();
                format!("[slobb|{:02}|{}]", names.len(), padded.join(","))
            }
            Self::Chat { name, text } => {
                format!("[schat|{name:<8}|{text:<63}]")
            }
            Self::Strike { code, count } => {
                format!("[strik|{code}|{count}]")
            }
            Self::SwapOffer { card } => format!("[swapw|{card}]"),
            Self::SwapResult { gained, lost } => {
                format!("[swaps|{gained}|{lost}]")
            }
        }
    }

    /// Decodes a `stabl` frame by fixed offsets. The constant-width
    /// encoding makes every offset static: seat block `i` starts at
    /// byte `7 + 15 * i`, the last play at byte 112, the flag at 124.
    fn parse_table(frame: &str) -> Result<Self, WireError> {
        if frame.len() != STABL_LEN {
            return Err(WireError::InvalidField {
                what: "table status",
                text: frame.to_string(),
            });
        }
        let bytes = frame.as_bytes();
        let mut seats = Vec::with_capacity(TABLE_SEATS);
        for i in 0..TABLE_SEATS {
            let start = 7 + 15 * i;
            seats.push(parse_seat(&frame[start..start + 14])?);
            let sep = bytes[start + 14];
            if (i < TABLE_SEATS - 1 && sep != b',')
                || (i == TABLE_SEATS - 1 && sep != b'|')
            {
                return Err(WireError::BadFrame);
            }
        }
        let last_play = parse_card_list(&frame[112..123], PLAY_WIDTH)?;
        if bytes[123] != b'|' {
            return Err(WireError::BadFrame);
        }
        let starting_round = match bytes[124] {
            b'0' => false,
            b'1' => true,
            _ => {
                return Err(WireError::InvalidField {
                    what: "starting-round flag",
                    text: (bytes[124] as char).to_string(),
                })
            }
        };
        Ok(Self::Table {
            seats,
            last_play,
            starting_round,
        })
    }
}

// =========================================================================
// Tests
// =========================================================================
