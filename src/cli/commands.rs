use std::path::PathBuf;

use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dp", about = concat!("dayplan v", env!("CARGO_PKG_VERSION"), " - keeps your day plan in step with the clock"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ./dayplan.toml)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one update cycle and write the planner if it changed
    Update(UpdateArgs),
    /// Show the current, next and past items
    Show(ShowArgs),
    /// Print the updated planner without writing it
    Render(RenderArgs),
    /// Insert an empty day planner block into a note
    Init(InitArgs),
    /// Keep updating the planner on an interval
    Watch(WatchArgs),
    /// View or edit dayplan.toml
    Config(ConfigCmd),
    /// View or clear the diagnostic log
    Log(LogArgs),
}

// ---------------------------------------------------------------------------
// Cycle command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct UpdateArgs {
    /// Planner note (default: today's note in the planner directory)
    pub file: Option<PathBuf>,
    /// Pretend the time is HH:MM today
    #[arg(long, value_parser = parse_clock_time)]
    pub at: Option<NaiveTime>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Planner note (default: today's note in the planner directory)
    pub file: Option<PathBuf>,
    /// Pretend the time is HH:MM today
    #[arg(long, value_parser = parse_clock_time)]
    pub at: Option<NaiveTime>,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Planner note (default: today's note in the planner directory)
    pub file: Option<PathBuf>,
    /// Pretend the time is HH:MM today
    #[arg(long, value_parser = parse_clock_time)]
    pub at: Option<NaiveTime>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Note to add the planner to (default: today's note, created if missing)
    pub file: Option<PathBuf>,
    /// Insert before this line, 1-based (default: end of the note)
    #[arg(long)]
    pub line: Option<usize>,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Planner note (default: today's note in the planner directory)
    pub file: Option<PathBuf>,
    /// Seconds between cycles (default: from config)
    #[arg(long)]
    pub interval: Option<u64>,
    /// Stop after this many cycles
    #[arg(long)]
    pub cycles: Option<usize>,
}

// ---------------------------------------------------------------------------
// Config and log args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set a key (complete_past_items, mermaid, break_label, end_label,
    /// cooldown_ms, directory, interval_secs)
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Args)]
pub struct LogArgs {
    /// Directory holding the log (default: the planner directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Maximum number of entries to show
    #[arg(long, default_value = "20")]
    pub limit: usize,
    /// Remove all entries
    #[arg(long)]
    pub clear: bool,
}

/// Parse `HH:MM` or `H:MM`
pub fn parse_clock_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| format!("invalid time '{}' (expected HH:MM)", s))
}
