//! TCP plumbing: the accept loop and per-connection tasks.
//!
//! Each accepted socket gets its own task that shuttles bytes both
//! ways. Everything the task learns is reported to the reactor as an
//! [`Event`]; everything the reactor wants sent goes out through the
//! connection's unbounded channel. Dropping the reactor's sender for a
//! connection closes its socket, which is how kicks work.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one client connection for the lifetime of the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Sender half of a connection's outbound channel.
pub type Outbound = mpsc::UnboundedSender<String>;

/// What a connection task reports to the reactor.
#[derive(Debug)]
pub enum Event {
    /// A client connected; frames for it go through `outbound`.
    Connected {
        id: ConnectionId,
        outbound: Outbound,
    },
    /// Raw bytes arrived from a client.
    Data { id: ConnectionId, bytes: Vec<u8> },
    /// The socket closed, from either side.
    Closed { id: ConnectionId },
}

/// Runs the accept loop, spawning one task per client.
pub async fn run_acceptor(listener: TcpListener, events: mpsc::Sender<Event>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let id = ConnectionId::next();
                tracing::debug!(%id, %addr, "accepted connection");

                let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
                if events
                    .send(Event::Connected {
                        id,
                        outbound: outbound_tx,
                    })
                    .await
                    .is_err()
                {
                    // Reactor is gone; stop accepting.
                    return;
                }
                tokio::spawn(connection_task(
                    id,
                    stream,
                    events.clone(),
                    outbound_rx,
                ));
            }
            Err(e) => {
                tracing::error!(error = %e, "accept failed");
            }
        }
    }
}

/// Shuttles bytes for one client until either side goes away.
async fn connection_task(
    id: ConnectionId,
    stream: TcpStream,
    events: mpsc::Sender<Event>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    let (mut reader, mut writer) = stream.into_split();
    let mut buf = [0u8; 1024];

    loop {
        tokio::select! {
            read = reader.read(&mut buf) => match read {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let bytes = buf[..n].to_vec();
                    if events.send(Event::Data { id, bytes }).await.is_err() {
                        break;
                    }
                }
            },
            frame = outbound.recv() => match frame {
                Some(text) => {
                    tracing::trace!(%id, %text, "sending");
                    if writer.write_all(text.as_bytes()).await.is_err() {
                        break;
                    }
                }
                // The reactor dropped us (kick or shutdown).
                None => break,
            },
        }
    }

    tracing::debug!(%id, "connection closed");
    let _ = events.send(Event::Closed { id }).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_are_unique() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_acceptor_reports_connect_data_and_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        tokio::spawn(run_acceptor(listener, tx));

        let mut client = TcpStream::connect(addr).await.unwrap();
        let (id, outbound) = match rx.recv().await.unwrap() {
            Event::Connected { id, outbound } => (id, outbound),
            other => panic!("expected Connected, got {other:?}"),
        };

        client.write_all(b"[chand]").await.unwrap();
        match rx.recv().await.unwrap() {
            Event::Data { id: got, bytes } => {
                assert_eq!(got, id);
                assert_eq!(bytes, b"[chand]");
            }
            other => panic!("expected Data, got {other:?}"),
        }

        // Server-to-client path.
        outbound.send("[sjoin|ted     ]".to_string()).unwrap();
        let mut reply = [0u8; 16];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(&reply, b"[sjoin|ted     ]");

        drop(client);
        match rx.recv().await.unwrap() {
            Event::Closed { id: got } => assert_eq!(got, id),
            other => panic!("expected Closed, got {other:?}"),
        }
    }
}
