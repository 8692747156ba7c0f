//! Theme data model.
//!
//! A [`Theme`] is always a total three-color record. Anything arriving from
//! outside the process (JSON payloads, config tables, caller input) is first
//! decoded as a [`ThemeDraft`] and validated into a `Theme`, so a partial
//! theme can never reach the store.

use crate::error::{ColorParseError, ThemeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field names in declaration order; used for validation messages.
pub const THEME_FIELDS: [&str; 3] = ["background", "foreground", "primary"];

/// One sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_color(input)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_color(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// The three-color record governing presentation.
///
/// External payloads decode into [`ThemeDraft`] and become a `Theme` only
/// through [`ThemeDraft::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub primary: Color,
}

impl Theme {
    pub const fn new(background: Color, foreground: Color, primary: Color) -> Self {
        Self {
            background,
            foreground,
            primary,
        }
    }

    /// Build a theme from three color literals.
    pub fn parse(background: &str, foreground: &str, primary: &str) -> Result<Self, ColorParseError> {
        Ok(Self {
            background: background.parse()?,
            foreground: foreground.parse()?,
            primary: primary.parse()?,
        })
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "background={} foreground={} primary={}",
            self.background, self.foreground, self.primary
        )
    }
}

/// Possibly-partial theme as supplied by a caller.
///
/// Unknown keys are rejected during deserialization; missing keys are only
/// detected by [`ThemeDraft::validate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeDraft {
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub foreground: Option<Color>,
    #[serde(default)]
    pub primary: Option<Color>,
}

impl ThemeDraft {
    /// Decode a JSON object such as `{"background":"#000000", ...}`.
    pub fn from_json(payload: &str) -> Result<Self, ThemeError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Names of the fields this draft is missing, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            self.background.is_some(),
            self.foreground.is_some(),
            self.primary.is_some(),
        ];
        THEME_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Promote to a total [`Theme`], or report every missing field.
    pub fn validate(&self) -> Result<Theme, ThemeError> {
        match (self.background, self.foreground, self.primary) {
            (Some(background), Some(foreground), Some(primary)) => Ok(Theme {
                background,
                foreground,
                primary,
            }),
            _ => Err(ThemeError::MalformedTheme {
                missing: self.missing_fields(),
            }),
        }
    }
}

impl From<Theme> for ThemeDraft {
    fn from(theme: Theme) -> Self {
        Self {
            background: Some(theme.background),
            foreground: Some(theme.foreground),
            primary: Some(theme.primary),
        }
    }
}

impl TryFrom<ThemeDraft> for Theme {
    type Error = ThemeError;

    fn try_from(draft: ThemeDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

/// Parse `#rrggbb` or one of the basic terminal color names.
pub fn parse_color(input: &str) -> Result<Color, ColorParseError> {
    let normalized = input.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(ColorParseError("color value cannot be empty".to_string()));
    }
    if let Some(hex) = normalized.strip_prefix('#') {
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError(format!("`{input}` (expected #RRGGBB)")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ColorParseError(format!("`{input}`")))
        };
        return Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?));
    }

    let (r, g, b) = match normalized.as_str() {
        "black" => (0, 0, 0),
        "darkgrey" | "dark-gray" | "dark_grey" => (85, 85, 85),
        "grey" | "gray" => (170, 170, 170),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "darkred" | "dark-red" => (128, 0, 0),
        "green" => (0, 255, 0),
        "darkgreen" | "dark-green" => (0, 128, 0),
        "yellow" => (255, 255, 0),
        "darkyellow" | "dark-yellow" => (128, 128, 0),
        "blue" => (0, 0, 255),
        "darkblue" | "dark-blue" => (0, 0, 128),
        "magenta" => (255, 0, 255),
        "darkmagenta" | "dark-magenta" => (128, 0, 128),
        "cyan" => (0, 255, 255),
        "darkcyan" | "dark-cyan" => (0, 128, 128),
        _ => return Err(ColorParseError(format!("unsupported color value `{input}`"))),
    };
    Ok(Color::rgb(r, g, b))
}
