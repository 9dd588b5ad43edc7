//! WebSocket implementation of [`Transport`].
//!
//! Each [`WebSocketTransport::open`] spawns a reader task that performs the
//! handshake and forwards frames to the connection's [`EventSink`]. The task
//! never retries on its own: reconnection is the caller's decision.
//!
//! # Example
//!
//! ```rust,ignore
//! use minerlog_api::{Transport, WebSocketTransport, event_channel, log_stream_url};
//!
//! let url = log_stream_url(&"http://192.168.1.50".parse()?)?;
//! let (sink, mut events) = event_channel();
//! let _conn = WebSocketTransport::new().open(&url, sink);
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! ```

use futures_util::StreamExt;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::{CancellationToken, DropGuard};
use url::Url;

use crate::error::Error;
use crate::transport::{Connection, EventSink, Frame, Transport, TransportEvent};

// ── WebSocketTransport ───────────────────────────────────────────────

/// Opens log stream connections over `ws://` / `wss://`.
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;

    /// Must be called from within a tokio runtime.
    fn open(&self, url: &Url, sink: EventSink) -> WebSocketConnection {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let url = url.clone();

        tokio::spawn(async move {
            let terminal = tokio::select! {
                biased;
                () = task_cancel.cancelled() => None,
                result = connect_and_read(&url, &sink) => Some(terminal_event(result)),
            };

            match terminal {
                Some(event) => {
                    let _ = sink.send(event).await;
                }
                None => tracing::debug!(url = %url, "WebSocket task cancelled"),
            }
        });

        WebSocketConnection {
            guard: Some(cancel.drop_guard()),
        }
    }
}

// ── WebSocketConnection ──────────────────────────────────────────────

/// Owner handle for a spawned WebSocket reader task.
///
/// Dropping it cancels the task just like [`close`](Connection::close).
#[derive(Debug)]
pub struct WebSocketConnection {
    guard: Option<DropGuard>,
}

impl Connection for WebSocketConnection {
    fn close(&mut self) {
        // Dropping the guard cancels the token.
        self.guard.take();
    }
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Why a connection ended, when it ended without an error.
struct CloseInfo {
    code: Option<u16>,
    reason: String,
}

fn terminal_event(result: Result<CloseInfo, Error>) -> TransportEvent {
    match result {
        Ok(CloseInfo { code, reason }) => TransportEvent::Closed { code, reason },
        Err(e) => TransportEvent::Failed {
            reason: e.to_string(),
        },
    }
}

/// Establish a single WebSocket connection and read until it drops.
async fn connect_and_read(url: &Url, sink: &EventSink) -> Result<CloseInfo, Error> {
    tracing::info!(url = %url, "Connecting to log stream");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!("Log stream connected");
    if !sink.send(TransportEvent::Opened).await {
        return Ok(receiver_gone());
    }

    // The stream never receives operator input; only the read half matters.
    // Pong replies are queued by tungstenite and flushed on the next read.
    let (_write, mut read) = ws_stream.split();

    loop {
        let frame = match read.next().await {
            Some(Ok(tungstenite::Message::Text(text))) => Frame::Text(text.as_str().to_owned()),
            Some(Ok(tungstenite::Message::Binary(bytes))) => Frame::Binary(bytes),
            Some(Ok(tungstenite::Message::Close(frame))) => {
                let info = match frame {
                    Some(cf) => {
                        tracing::info!(
                            code = %cf.code,
                            reason = %cf.reason,
                            "WebSocket close frame received"
                        );
                        CloseInfo {
                            code: Some(u16::from(cf.code)),
                            reason: close_reason(cf.reason.as_str()),
                        }
                    }
                    None => {
                        tracing::info!("WebSocket close frame received (no payload)");
                        CloseInfo {
                            code: None,
                            reason: close_reason(""),
                        }
                    }
                };
                return Ok(info);
            }
            Some(Ok(tungstenite::Message::Ping(_))) => {
                tracing::trace!("WebSocket ping");
                continue;
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
            None => {
                tracing::info!("WebSocket stream ended");
                return Ok(CloseInfo {
                    code: None,
                    reason: close_reason(""),
                });
            }
        };

        if !sink.send(TransportEvent::Frame(frame)).await {
            return Ok(receiver_gone());
        }
    }
}

fn close_reason(reason: &str) -> String {
    if reason.is_empty() {
        "Connection closed".to_owned()
    } else {
        reason.to_owned()
    }
}

fn receiver_gone() -> CloseInfo {
    tracing::debug!("Log stream consumer dropped, closing connection");
    CloseInfo {
        code: None,
        reason: "consumer dropped".to_owned(),
    }
}
