//! Command handlers.

pub mod config_cmd;
pub mod console;
pub mod tail;
