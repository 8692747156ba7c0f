//! CLI argument parsing via clap.

use clap::Parser;
use colorcard::config::SourceKind;

/// A themed card whose colors change on demand.
#[derive(Debug, Parser)]
#[command(name = "colorcard", version)]
pub struct Args {
    /// Path to config file (default: ./colorcard.toml or ~/.config/colorcard/colorcard.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Preset to apply right after startup (e.g. `warm`, `cold`).
    #[arg(short = 't', long = "theme")]
    pub theme: Option<String>,

    /// Color source backing "Change Theme": `presets` or `random`.
    #[arg(long = "source")]
    pub source: Option<SourceKind>,

    /// Artificial latency for each theme fetch, in milliseconds.
    #[arg(long = "delay-ms")]
    pub delay_ms: Option<u64>,

    /// Apply a JSON theme object, e.g. '{"background":"#000000","foreground":"#ffffff","primary":"#ff0000"}'.
    #[arg(long = "set", value_name = "JSON")]
    pub set: Option<String>,

    /// Fetch one new theme, print it, and exit instead of opening the card.
    #[arg(long = "once")]
    pub once: bool,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Write logs to this file instead of the default cache location.
    #[arg(long = "log-file")]
    pub log_file: Option<String>,
}
