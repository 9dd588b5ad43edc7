//! Observable connection status.

use std::fmt;

/// Connection state of a log stream, as shown to the operator.
///
/// `Display` renders the status text: `idle`, `connecting`, `connected`,
/// `disconnected: <reason>` or `error: <reason>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Idle,
    Connecting,
    Open,
    Closed { reason: String },
    Error { reason: String },
}

impl ConnectionStatus {
    /// A connection attempt is in flight or established.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Reason attached to a closed/error status.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Closed { reason } | Self::Error { reason } => Some(reason),
            Self::Idle | Self::Connecting | Self::Open => None,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Connecting => f.write_str("connecting"),
            Self::Open => f.write_str("connected"),
            Self::Closed { reason } => write!(f, "disconnected: {reason}"),
            Self::Error { reason } => write!(f, "error: {reason}"),
        }
    }
}
