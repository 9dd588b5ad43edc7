//! Clap derive structures for the `minerlog` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// minerlog -- live log console for mining appliances
#[derive(Debug, Parser)]
#[command(
    name = "minerlog",
    version,
    about = "Stream live logs from a mining appliance",
    long_about = "Connects to a mining appliance's log WebSocket and streams its \
        lines to the terminal.\n\n\
        Lines are sanitized, kept in a bounded history, and can be filtered, \
        paused and exported while the stream runs.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Appliance profile to use
    #[arg(long, short = 'p', env = "MINERLOG_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Appliance dashboard URL or host (overrides profile)
    #[arg(long, short = 'd', env = "MINERLOG_DEVICE", global = true)]
    pub device: Option<String>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if stderr is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream the appliance log and accept console commands on stdin
    #[command(alias = "t")]
    Tail(TailArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Tail ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TailArgs {
    /// Only print lines containing this text (case-insensitive)
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Connect but drop incoming lines until `resume`
    #[arg(long)]
    pub paused: bool,

    /// Directory `export` writes to (overrides config)
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Export the full history when the session ends
    #[arg(long)]
    pub export_on_exit: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the resolved configuration
    Show,

    /// Add or replace a profile
    Init {
        /// Appliance dashboard URL or host (e.g., http://192.168.1.50)
        #[arg(long)]
        device: String,

        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
