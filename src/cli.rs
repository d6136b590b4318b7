//! CLI argument parsing for lintwatch

use crate::session::Mode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for session reports
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "lintwatch")]
#[command(version)]
#[command(about = "Track lint regressions against an accepted baseline", long_about = None)]
pub struct Cli {
    /// Comparison mode
    #[arg(value_enum)]
    pub mode: Mode,

    /// Target path handed to the lint tool
    pub path: PathBuf,

    /// Directory holding the baseline and last snapshots
    #[arg(long = "state-dir", value_name = "DIR", default_value = ".lintwatch")]
    pub state_dir: PathBuf,

    /// Lint executable to invoke
    #[arg(long = "tool", value_name = "PROGRAM", default_value = crate::invoker::DEFAULT_TOOL)]
    pub tool: String,

    /// Kill the lint tool after this many seconds
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Only consider findings whose rule matches this regex
    #[arg(long = "rule", value_name = "REGEX")]
    pub rule: Option<String>,

    /// Cap on listed keys per direction in text output
    #[arg(long = "max-list", value_name = "N", default_value = "50")]
    pub max_list: usize,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing to stderr
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
}
