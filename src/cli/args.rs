//! Command-line argument parsing for PredictBuddy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use crate::forecast::ForecastKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// PredictBuddy - Pattern recognition and forecasting over JSON-encoded inputs
#[derive(Parser, Debug)]
#[command(name = "predictbuddy")]
#[command(author = "Jerome (Kubashen) Naidoo")]
#[command(version)]
#[command(about = "Detect patterns, forecast and recommend from tagged JSON inputs", long_about = None)]
pub struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding persisted engine state
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect patterns and record significant ones
    Patterns {
        /// Input file with a JSON AnalysisInput (stdin when omitted or "-")
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// JSON context stored with the pattern record
        #[arg(long)]
        context: Option<String>,
    },

    /// Forecast future values
    Forecast {
        /// Forecast model: trend, behavior, performance, demand or risk
        #[arg(short, long)]
        kind: ForecastKind,

        /// Number of future steps
        #[arg(long, default_value_t = 5)]
        horizon: usize,

        /// Input file with a JSON AnalysisInput (stdin when omitted or "-")
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Rank recommendations derived from the input
    Recommend {
        /// Input file with a JSON AnalysisInput (stdin when omitted or "-")
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// JSON context passed along with the request
        #[arg(long)]
        context: Option<String>,
    },

    /// Show store sizes and engine capabilities
    Health,

    /// Display the effective configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default `tracing` filter directive for this level
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "predictbuddy=warn",
            Verbosity::Normal => "predictbuddy=info",
            Verbosity::Verbose => "predictbuddy=debug",
            Verbosity::VeryVerbose => "predictbuddy=trace",
        }
    }
}
