//! CLI argument definitions for trackiton.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `load` | Load the dashboard, refreshing when the schedule says so |
//! | `refresh` | Force a refresh cycle |
//! | `show` | Print the stored ledger without fetching |
//! | `schedule` | Show last fetch time and the next scheduled refresh |
//! | `compare` | Comparison series for the selected symbols |
//! | `select` | Toggle a symbol in the comparison selection |
//! | `clear` | Drop the stored ledger |
//!
//! # Examples
//!
//! ```bash
//! trackiton load
//! trackiton refresh --symbols AAPL,MSFT --format json --pretty
//! trackiton select JPM
//! trackiton schedule --triggers 06:30,18:00
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use trackiton_core::Interval;

/// Twice-daily stock dashboard for the terminal.
///
/// Data is fetched from Alpha Vantage at 11:00 and 01:00 UTC and kept on disk
/// in between. Set TRACKITON_ALPHAVANTAGE_API_KEY before the first load.
#[derive(Debug, Parser)]
#[command(name = "trackiton", author, version, about = "Twice-daily stock dashboard")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log debug output to stderr. `RUST_LOG` takes precedence.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Data directory (defaults to TRACKITON_HOME, then ~/.trackiton).
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Comma-separated symbols to track instead of the defaults.
    #[arg(long, global = true, value_delimiter = ',')]
    pub symbols: Option<Vec<String>>,

    /// Intraday interval: 1min, 5min, 15min, 30min or 60min.
    #[arg(long, global = true)]
    pub interval: Option<Interval>,

    /// Comma-separated HH:MM UTC refresh triggers instead of 11:00,01:00.
    #[arg(long, global = true, value_delimiter = ',')]
    pub triggers: Option<Vec<String>>,

    /// Resolve company names with an extra OVERVIEW call per symbol.
    #[arg(long, global = true, default_value_t = false)]
    pub resolve_names: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// Single JSON document.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the dashboard: stored data while current, a refresh otherwise.
    Load,

    /// Fetch every tracked symbol now, regardless of the schedule.
    Refresh,

    /// Print the stored ledger without fetching.
    Show(ShowArgs),

    /// Show the last fetch time, whether a refresh is due and when the next one is.
    Schedule,

    /// Print the comparison series of the selected symbols.
    Compare,

    /// Toggle a symbol in the comparison selection.
    Select(SelectArgs),

    /// Delete the stored ledger.
    Clear,
}

/// Arguments for the `show` command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Only show these symbols.
    pub symbols: Vec<String>,
}

/// Arguments for the `select` command.
#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Symbol to add to or remove from the selection.
    pub symbol: String,
}
