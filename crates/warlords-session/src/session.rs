//! Session types: the server's record of one client connection.
//!
//! A session sits between the socket and the game. It accumulates raw
//! bytes into the receive buffer, carves complete frames out of it,
//! counts strikes, and remembers which seated player (if any) the
//! connection speaks for.

use warlords_protocol::extract_frame;

use crate::SessionError;

/// Strikes before a client is kicked.
pub const MAX_STRIKES: u8 = 3;

/// Receive buffer cap. The longest legal frame is well under 200
/// bytes, so anything piling up past this is a client misbehaving.
pub const MAX_BUFFER: usize = 1024;

/// One connected client.
#[derive(Debug)]
pub struct Session {
    buffer: String,
    strikes: u8,
    player: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            strikes: 0,
            player: None,
        }
    }

    // -----------------------------------------------------------------
    // Inbound bytes
    // -----------------------------------------------------------------

    /// Appends received bytes to the buffer.
    ///
    /// Non-UTF-8 bytes are kept (lossily decoded) rather than dropped;
    /// frame validation rejects them with a strike later, which is the
    /// response a garbage-sending client has earned.
    ///
    /// # Errors
    /// [`SessionError::Flood`] when the buffer cap is exceeded. The
    /// buffer is cleared so one flood cannot wedge the connection.
    pub fn push_bytes(&mut self, data: &[u8]) -> Result<(), SessionError> {
        self.buffer.push_str(&String::from_utf8_lossy(data));
        if self.buffer.len() > MAX_BUFFER {
            tracing::warn!(len = self.buffer.len(), "receive buffer overflow");
            self.buffer.clear();
            return Err(SessionError::Flood);
        }
        Ok(())
    }

    /// Carves the next complete frame out of the buffer, if any.
    pub fn next_frame(&mut self) -> Option<String> {
        extract_frame(&mut self.buffer)
    }

    // -----------------------------------------------------------------
    // Strikes
    // -----------------------------------------------------------------

    /// Records a strike and returns the new total.
    pub fn add_strike(&mut self) -> u8 {
        self.strikes += 1;
        self.strikes
    }

    pub fn strikes(&self) -> u8 {
        self.strikes
    }

    /// Whether the client has struck out.
    pub fn kicked(&self) -> bool {
        self.strikes >= MAX_STRIKES
    }

    // -----------------------------------------------------------------
    // Player binding
    // -----------------------------------------------------------------

    /// Binds the connection to the (possibly mangled) name it joined as.
    pub fn bind(&mut self, name: impl Into<String>) {
        self.player = Some(name.into());
    }

    /// The joined player's name, once `cjoin` has been accepted.
    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_come_out_one_at_a_time() {
        let mut session = Session::new();
        session.push_bytes(b"[chand][cplay|0").unwrap();
        assert_eq!(session.next_frame().as_deref(), Some("[chand]"));
        assert_eq!(session.next_frame(), None);
        session.push_bytes(b"0]").unwrap();
        assert_eq!(session.next_frame().as_deref(), Some("[cplay|00]"));
    }

    #[test]
    fn test_garbage_between_frames_is_dropped() {
        let mut session = Session::new();
        session.push_bytes(b"noise[chand]noise").unwrap();
        assert_eq!(session.next_frame().as_deref(), Some("[chand]"));
        assert_eq!(session.next_frame(), None);
    }

    #[test]
    fn test_overflow_floods_and_clears() {
        let mut session = Session::new();
        let junk = vec![b'x'; MAX_BUFFER + 1];
        assert_eq!(session.push_bytes(&junk), Err(SessionError::Flood));
        // The buffer was dropped; the connection is usable again.
        session.push_bytes(b"[chand]").unwrap();
        assert_eq!(session.next_frame().as_deref(), Some("[chand]"));
    }

    #[test]
    fn test_three_strikes_kick() {
        let mut session = Session::new();
        assert_eq!(session.add_strike(), 1);
        assert!(!session.kicked());
        session.add_strike();
        assert_eq!(session.add_strike(), 3);
        assert!(session.kicked());
    }

    #[test]
    fn test_player_binding() {
        let mut session = Session::new();
        assert_eq!(session.player(), None);
        session.bind("chipjack");
        assert_eq!(session.player(), Some("chipjack"));
    }

    #[test]
    fn test_non_utf8_bytes_survive_to_be_rejected_as_a_frame() {
        let mut session = Session::new();
        session.push_bytes(b"[cjoin|\xff\xfe]").unwrap();
        // A frame still comes out; grammar validation is the caller's
        // job and will strike it.
        assert!(session.next_frame().is_some());
    }
}
