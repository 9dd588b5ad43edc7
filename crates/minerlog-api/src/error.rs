use thiserror::Error;

/// Top-level error type for the `minerlog-api` crate.
///
/// Only construction-time failures surface as `Err`. Once a connection is
/// running, failures are reported as [`TransportEvent`](crate::TransportEvent)s.
#[derive(Debug, Error)]
pub enum Error {
    // ── Endpoint ────────────────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL uses a scheme the log stream cannot be derived from.
    #[error("Unsupported URL scheme '{scheme}' (expected http, https, ws or wss)")]
    UnsupportedScheme { scheme: String },

    /// The base URL has no host component.
    #[error("URL has no host: {url}")]
    MissingHost { url: String },

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),
}
