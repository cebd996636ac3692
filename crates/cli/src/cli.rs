//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::PageNumber;
use observability::ObservabilityConfig;
use std::path::PathBuf;

use crate::error::CliError;

/// Haptic Sync - keeps haptic cues in step with music playback
#[derive(Parser, Debug)]
#[command(
    name = "haptic-sync",
    author,
    version,
    about = "Haptic cue synchronization engine",
    long_about = "Plays an asset from a haptic manifest on a simulated media player and fires \n\
                  its cue table on the configured actuator, following the playback clock."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "HAPTIC_SYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "HAPTIC_SYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Tracing setup for the requested verbosity and format (`RUST_LOG` still wins)
    pub fn observability_config(&self) -> ObservabilityConfig {
        let level = match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        ObservabilityConfig {
            log_format: self.log_format.clone().into(),
            // the run command installs the exporter itself
            metrics_port: None,
            default_log_level: level.to_string(),
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play an asset and fire its cues
    Run(RunArgs),

    /// Validate a manifest without playing it
    Validate(ValidateArgs),

    /// Display manifest contents
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to manifest file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "haptics.toml",
        env = "HAPTIC_SYNC_MANIFEST"
    )]
    pub manifest: PathBuf,

    /// Locator of the asset to play (defaults to the first asset)
    #[arg(short, long, env = "HAPTIC_SYNC_ASSET")]
    pub asset: Option<String>,

    /// Page selected before playback starts (overrides `engine.initial_page`)
    #[arg(long, env = "HAPTIC_SYNC_INITIAL_PAGE")]
    pub initial_page: Option<PageNumber>,

    /// Switch page once playback reaches a position, as `<ms>:<page>` (repeatable)
    #[arg(long = "page-at", value_parser = parse_page_switch)]
    pub page_at: Vec<PageSwitch>,

    /// Stop after this many seconds (0 = until the asset ends)
    #[arg(long, default_value = "0", env = "HAPTIC_SYNC_MAX_DURATION")]
    pub max_duration: u64,

    /// Validate the manifest and exit without playing
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "HAPTIC_SYNC_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Scheduled page change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSwitch {
    pub at_ms: u64,
    pub page: PageNumber,
}

/// Parse `<ms>:<page>`
pub fn parse_page_switch(raw: &str) -> Result<PageSwitch, CliError> {
    let (at, page) = raw
        .split_once(':')
        .ok_or_else(|| CliError::invalid_argument("page-at", "expected <ms>:<page>"))?;
    let at_ms = at
        .trim()
        .parse()
        .map_err(|_| CliError::invalid_argument("page-at", format!("bad position '{at}'")))?;
    let page = page
        .trim()
        .parse()
        .map_err(|_| CliError::invalid_argument("page-at", format!("bad page '{page}'")))?;
    Ok(PageSwitch { at_ms, page })
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to manifest file to validate
    #[arg(short, long, default_value = "haptics.toml")]
    pub manifest: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to manifest file
    #[arg(short, long, default_value = "haptics.toml")]
    pub manifest: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List every cue of every page
    #[arg(long)]
    pub cues: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
