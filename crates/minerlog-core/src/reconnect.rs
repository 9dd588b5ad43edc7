//! Reconnection policy.
//!
//! A fixed delay between attempts and a cap on attempts per reconnect
//! episode. The policy only counts; the stream manager owns the timer and
//! decides whether a disconnect was expected.

use std::time::Duration;

/// Reconnection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Wait between a disconnect and the next attempt. Default: 3s.
    pub delay: Duration,

    /// Attempts per episode before giving up. Default: 5.
    pub max_attempts: u32,
}

impl ReconnectConfig {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: Self::DEFAULT_DELAY,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// What to do after an unexpected disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after `delay`; this is attempt number `attempt` (1-based).
    Retry { attempt: u32, delay: Duration },
    /// The episode used up every attempt.
    GiveUp { attempts: u32 },
}

/// Attempt counter for one reconnect episode.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    pub fn config(&self) -> &ReconnectConfig {
        &self.config
    }

    /// Attempts scheduled in the current episode.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.config.max_attempts
    }

    /// Record an unexpected disconnect and decide whether to retry.
    pub fn on_disconnect(&mut self) -> RetryDecision {
        if self.is_exhausted() {
            return RetryDecision::GiveUp {
                attempts: self.attempts,
            };
        }
        self.attempts += 1;
        RetryDecision::Retry {
            attempt: self.attempts,
            delay: self.config.delay,
        }
    }

    /// A connection opened: the episode is over.
    pub fn on_open(&mut self) {
        self.attempts = 0;
    }

    /// Operator-initiated start: begin with a fresh budget.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(ReconnectConfig::default())
    }
}
