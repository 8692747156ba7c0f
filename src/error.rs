//! Unified error types for the theme core.

use std::fmt;

// ---------------------------------------------------------------------------
// ColorParseError
// ---------------------------------------------------------------------------

/// A color literal that is neither `#rrggbb` nor a supported color name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color: {}", self.0)
    }
}

impl std::error::Error for ColorParseError {}

// ---------------------------------------------------------------------------
// ColorSourceError
// ---------------------------------------------------------------------------

/// Failure reported by a color source while producing a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSourceError {
    message: String,
}

impl ColorSourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ColorSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "color source failed: {}", self.message)
    }
}

impl std::error::Error for ColorSourceError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ThemeError
// ---------------------------------------------------------------------------

/// Top-level error type for theme mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// A theme-shaped value lacked one or more of the required fields.
    MalformedTheme { missing: Vec<&'static str> },
    /// The color source failed (only surfaced directly during bootstrap).
    ColorSource(ColorSourceError),
    /// A serialized theme payload could not be decoded.
    Payload(String),
    /// No preset with this name exists on the active color source.
    UnknownPreset(String),
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTheme { missing } => {
                write!(f, "malformed theme: missing {}", missing.join(", "))
            }
            Self::ColorSource(e) => write!(f, "{e}"),
            Self::Payload(msg) => write!(f, "invalid theme payload: {msg}"),
            Self::UnknownPreset(name) => write!(f, "unknown preset `{name}`"),
        }
    }
}

impl std::error::Error for ThemeError {}

impl From<ColorSourceError> for ThemeError {
    fn from(e: ColorSourceError) -> Self {
        Self::ColorSource(e)
    }
}

impl From<serde_json::Error> for ThemeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Payload(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_theme_lists_missing_fields() {
        let e = ThemeError::MalformedTheme {
            missing: vec!["foreground", "primary"],
        };
        assert_eq!(e.to_string(), "malformed theme: missing foreground, primary");
    }

    #[test]
    fn color_source_error_wraps_message() {
        let e = ThemeError::from(ColorSourceError::new("generator offline"));
        assert_eq!(e.to_string(), "color source failed: generator offline");
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let e = ConfigError::from(io_err);
        let s = e.to_string();
        assert!(s.starts_with("io:"), "got: {s}");
        assert!(s.contains("file not found"));
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err: toml::de::Error = toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        let e = ConfigError::from(toml_err);
        assert!(e.to_string().starts_with("toml:"));
    }

    #[test]
    fn payload_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e = ThemeError::from(json_err);
        assert!(e.to_string().starts_with("invalid theme payload:"), "got: {e}");
    }
}
