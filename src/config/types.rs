//! Configuration data model.
//!
//! Struct/enum definitions plus default values. Loading and source
//! precedence live in `config::mod`.

use crate::theme::{Theme, ThemeDraft};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Default tracing filter when neither config nor env sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Which color source backs random-theme requests.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Pick among named palettes (`warm`, `cold`, plus `[themes.*]`).
    #[default]
    Presets,
    /// Uniformly random colors.
    Random,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "presets" | "preset" => Ok(Self::Presets),
            "random" => Ok(Self::Random),
            other => Err(format!(
                "unknown color source `{other}` (expected `presets` or `random`)"
            )),
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub display: DisplayConfig,
    pub source: SourceConfig,
    pub logging: LoggingConfig,
    /// User presets from `[themes.<name>]`, already validated.
    pub themes: BTreeMap<String, Theme>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Artificial latency added to every async fetch.
    pub delay_ms: u64,
    /// Preset applied right after bootstrap.
    pub initial: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file path. When unset, logs go to the user cache directory.
    pub file: Option<String>,
    /// `tracing_subscriber::EnvFilter` directive string.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// On-disk shape, before theme validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct FileConfig {
    pub(super) display: DisplayConfig,
    pub(super) source: SourceConfig,
    pub(super) logging: LoggingConfig,
    pub(super) themes: BTreeMap<String, ThemeDraft>,
}
