//! Console rendering for the `tail` session.
//!
//! Log lines go to stdout untouched. Status, retry and command feedback go
//! to stderr, colored when enabled.

use std::io::{self, IsTerminal};

use owo_colors::OwoColorize;

use minerlog_core::ConnectionStatus;

use crate::cli::ColorMode;

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Writes operator-facing notices to stderr.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    color: bool,
}

impl Console {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn status(self, status: &ConnectionStatus) {
        let text = status.to_string();
        if !self.color {
            eprintln!("[{text}]");
            return;
        }
        match status {
            ConnectionStatus::Open => eprintln!("[{}]", text.green()),
            ConnectionStatus::Connecting => eprintln!("[{}]", text.yellow()),
            ConnectionStatus::Error { .. } => eprintln!("[{}]", text.red()),
            ConnectionStatus::Idle | ConnectionStatus::Closed { .. } => {
                eprintln!("[{}]", text.dimmed());
            }
        }
    }

    pub fn notice(self, text: &str) {
        if self.color {
            eprintln!("{}", text.cyan());
        } else {
            eprintln!("{text}");
        }
    }

    pub fn warn(self, text: &str) {
        if self.color {
            eprintln!("{}", text.yellow());
        } else {
            eprintln!("{text}");
        }
    }

    pub fn error(self, text: &str) {
        if self.color {
            eprintln!("{}", text.red());
        } else {
            eprintln!("{text}");
        }
    }
}
