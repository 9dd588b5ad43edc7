// minerlog-core: the appliance log stream client, independent of any UI.

pub mod buffer;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod reconnect;
pub mod sanitize;
pub mod status;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use buffer::{DEFAULT_CAPACITY, LineBuffer};
pub use config::StreamConfig;
pub use error::CoreError;
pub use export::{EXPORT_MIME, LogExport, export_snapshot, export_snapshot_at};
pub use filter::{LineFilter, count_visible, visible};
pub use reconnect::{ReconnectConfig, ReconnectPolicy, RetryDecision};
pub use sanitize::{LogLine, sanitize, sanitize_text};
pub use status::ConnectionStatus;
pub use stream::{LogStream, StreamEvent};
