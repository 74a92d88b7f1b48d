//! Error types for the wire protocol layer.

/// Errors that can occur while framing, parsing, or encoding messages.
///
/// A `WireError` always means the peer sent something the protocol
/// does not allow; it never reflects a game-rule decision (those live
/// in the engine crate).
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The frame does not match the general grammar:
    /// `[` + five-character type code + optional `|`-fields + `]`.
    #[error("frame does not match the general message grammar")]
    BadFrame,

    /// The five-character type code is not one of the known types.
    #[error("unknown message type {0:?}")]
    UnknownType(String),

    /// The message has the wrong number of `|`-separated fields.
    #[error("{kind} expects {expected} field(s), got {got}")]
    FieldCount {
        kind: &'static str,
        expected: usize,
        got: usize,
    },

    /// A field fails its per-type width or character-class rule.
    #[error("invalid {what} field: {text:?}")]
    InvalidField { what: &'static str, text: String },

    /// A card code above the padding sentinel.
    #[error("card value out of range: {0}")]
    CardOutOfRange(u8),
}
