// ── Core error types ──
//
// The streaming subsystem itself never returns errors: connection trouble is
// reported through `ConnectionStatus`. These cover setup and export only.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid log stream endpoint: {reason}")]
    InvalidEndpoint { reason: String },

    #[error("Failed to write log export to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<minerlog_api::Error> for CoreError {
    fn from(err: minerlog_api::Error) -> Self {
        CoreError::InvalidEndpoint {
            reason: err.to_string(),
        }
    }
}
