//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`COLORCARD_SOURCE`, `COLORCARD_DELAY_MS`,
//!    `COLORCARD_LOG`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./colorcard.toml in the current directory
//! 4. $XDG_CONFIG_HOME/colorcard/colorcard.toml (or
//!    ~/.config/colorcard/colorcard.toml)
//! 5. Built-in defaults

use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

mod types;

use types::FileConfig;
pub use types::{
    Config, DisplayConfig, LoggingConfig, SourceConfig, SourceKind, DEFAULT_LOG_FILTER,
};

/// Config file name used for local and per-user lookup.
pub const CONFIG_FILE_NAME: &str = "colorcard.toml";

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<Config, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let text = read_config_text(path_override, &read_file, &config_root)?;
    let parsed: FileConfig = toml::from_str(&text)?;
    let mut config = resolve_file_config(parsed)?;
    apply_env_overrides(&mut config, &env_lookup)?;
    Ok(config)
}

fn read_config_text<FRead, FRoot>(
    path_override: Option<&str>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<String, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    if let Some(p) = path_override {
        return Ok(read_file(Path::new(p))?);
    }
    if let Ok(text) = read_file(Path::new(CONFIG_FILE_NAME)) {
        return Ok(text);
    }
    if let Some(dir) = config_root() {
        if let Ok(text) = read_file(&dir.join("colorcard").join(CONFIG_FILE_NAME)) {
            return Ok(text);
        }
    }
    Ok(String::new())
}

fn resolve_file_config(parsed: FileConfig) -> Result<Config, ConfigError> {
    let mut themes = BTreeMap::new();
    for (name, draft) in parsed.themes {
        let theme = draft.validate().map_err(|e| {
            ConfigError::Invalid(format!("theme `{name}`: {e}"))
        })?;
        themes.insert(name, theme);
    }

    let mut source = parsed.source;
    source.initial = source
        .initial
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let mut logging = parsed.logging;
    if logging.filter.trim().is_empty() {
        logging.filter = DEFAULT_LOG_FILTER.to_string();
    }

    Ok(Config {
        display: parsed.display,
        source,
        logging,
        themes,
    })
}

fn apply_env_overrides<FEnv>(config: &mut Config, env_lookup: &FEnv) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(kind) = env_lookup("COLORCARD_SOURCE") {
        config.source.kind = kind.parse().map_err(ConfigError::Invalid)?;
    }
    if let Some(delay) = env_lookup("COLORCARD_DELAY_MS") {
        config.source.delay_ms = delay.trim().parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid COLORCARD_DELAY_MS value `{delay}`: expected milliseconds"
            ))
        })?;
    }
    if let Some(filter) = env_lookup("COLORCARD_LOG").filter(|f| !f.trim().is_empty()) {
        config.logging.filter = filter;
    }
    Ok(())
}

/// Per-user config root (`$XDG_CONFIG_HOME` or `~/.config`).
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}

/// Default log file (`<cache dir>/colorcard/colorcard.log`).
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("colorcard").join("colorcard.log"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
