//! The seam between the log stream manager and the network.
//!
//! A [`Transport`] opens one connection per call and reports everything that
//! happens on it as [`TransportEvent`]s pushed into an [`EventSink`]. Each
//! connection gets its own channel, so dropping the receiving side cuts off
//! every late event from that connection.

use bytes::Bytes;
use tokio::sync::mpsc;
use url::Url;

/// Capacity of the per-connection event channel.
///
/// The WebSocket reader awaits on a full channel, which stops it reading
/// from the socket until the consumer catches up.
pub const FRAME_CHANNEL_CAPACITY: usize = 1024;

// ── Frames & events ──────────────────────────────────────────────────

/// One unit of data delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Bytes),
}

impl From<&str> for Frame {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Frame {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for Frame {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(bytes))
    }
}

/// Something that happened on a single connection.
///
/// A connection reports at most one terminal event (`Closed` or `Failed`)
/// and nothing after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed; frames may follow.
    Opened,
    /// A data frame arrived.
    Frame(Frame),
    /// The peer closed the connection or the stream ended.
    Closed { code: Option<u16>, reason: String },
    /// The connection could not be established or broke with an error.
    Failed { reason: String },
}

impl TransportEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed { .. } | Self::Failed { .. })
    }
}

// ── EventSink ────────────────────────────────────────────────────────

/// Sending half of a connection's event channel.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<TransportEvent>,
}

impl EventSink {
    /// Deliver an event, waiting for channel capacity.
    ///
    /// Returns `false` once the receiving side is gone; the connection
    /// should stop producing at that point.
    pub async fn send(&self, event: TransportEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    /// Deliver an event without waiting. Returns `false` if the channel is
    /// full or closed.
    pub fn try_send(&self, event: TransportEvent) -> bool {
        self.tx.try_send(event).is_ok()
    }

    /// `true` once the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create the event channel for one connection.
pub fn event_channel() -> (EventSink, mpsc::Receiver<TransportEvent>) {
    let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
    (EventSink { tx }, rx)
}

// ── Transport traits ─────────────────────────────────────────────────

/// Handle to one live connection, owned by whoever opened it.
///
/// Closing (or dropping) the handle tears the connection down without
/// emitting any further events.
pub trait Connection: Send {
    fn close(&mut self);
}

/// Opens connections to a log stream endpoint.
pub trait Transport: Send + Sync {
    type Connection: Connection;

    /// Start connecting to `url`. Returns immediately; progress is reported
    /// through `sink`, beginning with `Opened` or `Failed`.
    fn open(&self, url: &Url, sink: EventSink) -> Self::Connection;
}
