// ── Runtime stream configuration ──
//
// Describes *where* to stream from and how to behave on failure. Never
// touches disk: the CLI (or any embedding UI) builds a `StreamConfig` and
// hands it to `LogStream`.

use url::Url;

use crate::buffer::DEFAULT_CAPACITY;
use crate::error::CoreError;
use crate::reconnect::ReconnectConfig;

/// Configuration for one log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// WebSocket endpoint (e.g., `ws://192.168.1.50/api/miner/logs`).
    pub endpoint: Url,
    /// Maximum retained lines.
    pub buffer_capacity: usize,
    /// Reconnection behavior.
    pub reconnect: ReconnectConfig,
}

impl StreamConfig {
    /// Default settings for the device at `base` (its dashboard URL).
    pub fn for_device(base: &Url) -> Result<Self, CoreError> {
        Ok(Self {
            endpoint: minerlog_api::log_stream_url(base)?,
            buffer_capacity: DEFAULT_CAPACITY,
            reconnect: ReconnectConfig::default(),
        })
    }

    /// Parse an operator-supplied address (URL or bare host) and derive
    /// the default settings for it.
    pub fn for_address(address: &str) -> Result<Self, CoreError> {
        let base = minerlog_api::endpoint::parse_device_url(address)?;
        Self::for_device(&base)
    }
}
