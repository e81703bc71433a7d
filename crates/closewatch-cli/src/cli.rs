//! CLI argument definitions for closewatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `reconcile` | Resolve reference-date closes and changes for exchange codes |
//! | `reference-date` | Print the reference date a run would use |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat failed instruments as a failure (exit code 5) |
//! | `--config` | none | JSON configuration file |
//!
//! # Examples
//!
//! ```bash
//! closewatch reconcile 7203=Toyota 6758=Sony --pretty
//! closewatch reconcile 7203 9984 --batch-size 2 --format table
//! closewatch reference-date --at 2024-06-14T10:30:00+09:00
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Trading-day price reconciliation for exchange-listed instruments.
#[derive(Debug, Parser)]
#[command(
    name = "closewatch",
    author,
    version,
    about = "Trading-day close and change reconciliation",
    long_about = "closewatch resolves, for a list of exchange codes, the closing price on the \
current reference date (or the nearest earlier trading day) together with 1, 7, 14, 30 and \
180 day percentage changes.\n\
\n\
Instruments are fetched in paced batches. Failed instruments are reported per code and never \
abort the run.\n\
\n\
Logging goes to stderr and honors RUST_LOG."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Exit with code 5 when any instrument failed.
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// JSON configuration file; environment variables and flags override it.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile closes and changes for one or more exchange codes.
    ///
    /// Each instrument is `CODE` or `CODE=NAME`. Four-character codes get
    /// the exchange suffix; codes with a suffix or a leading `^` pass through.
    ///
    /// # Examples
    ///
    ///   closewatch reconcile 7203=Toyota 6758=Sony
    ///   closewatch reconcile ^N225 7203 --reference-date 20240614
    Reconcile(ReconcileArgs),

    /// Print the reference date for an instant (defaults to now).
    ReferenceDate(ReferenceDateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ReconcileArgs {
    /// Instruments as `CODE` or `CODE=NAME`. Duplicate codes are dropped.
    #[arg(required = true, value_name = "CODE[=NAME]")]
    pub instruments: Vec<String>,

    /// Instruments fetched concurrently per batch.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Pause between batches in milliseconds.
    #[arg(long)]
    pub batch_delay_ms: Option<u64>,

    /// Per-request timeout in milliseconds. Unbounded when unset.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Reconcile against this date instead of deriving it from the clock.
    #[arg(long, value_name = "YYYYMMDD")]
    pub reference_date: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ReferenceDateArgs {
    /// Instant to evaluate, RFC 3339.
    #[arg(long, value_name = "RFC3339")]
    pub at: Option<String>,
}
