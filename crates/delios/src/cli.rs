//! Clap derive structures for the `delios` host binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// delios -- poll a Delios photovoltaic plant and report its readings
#[derive(Debug, Parser)]
#[command(
    name = "delios",
    version,
    about = "Poll a Delios plant and report its energy readings",
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

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, short = 'c', env = "DELIOS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format for readings
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Suppress reading output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll both cycles on their intervals until interrupted
    Run,

    /// Refresh both cycles once and print the readings
    Once,
}
