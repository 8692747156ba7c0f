//! Color sources: the collaborators that produce new themes on demand.
//!
//! The theme core treats every source as opaque. Calls may be slow, may fail,
//! and are never assumed deterministic.

use crate::config::{SourceConfig, SourceKind};
use crate::error::ColorSourceError;
use crate::theme::{Color, Theme};
use async_trait::async_trait;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Producer of themes used by the controller.
///
/// Tests provide scripted implementations; the binary uses
/// [`PresetColorSource`] or [`RandomColorSource`].
#[async_trait]
pub trait ColorSource: Send + Sync {
    /// Produce one theme synchronously. Used once at bootstrap.
    fn generate(&self) -> Result<Theme, ColorSourceError>;

    /// Produce one theme without blocking the caller's task.
    async fn generate_async(&self) -> Result<Theme, ColorSourceError> {
        self.generate()
    }

    /// Resolve a named preset, if this source has any.
    fn preset(&self, _name: &str) -> Option<Theme> {
        None
    }

    /// Stable ordered preset names.
    fn preset_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Built-in `warm` palette.
pub const WARM: Theme = Theme::new(
    Color::rgb(0xb2, 0x70, 0xa2),
    Color::rgb(0xff, 0x8f, 0xb1),
    Color::rgb(0xfc, 0xe2, 0xdb),
);

/// Built-in `cold` palette.
pub const COLD: Theme = Theme::new(
    Color::rgb(0xaf, 0xb4, 0xff),
    Color::rgb(0x9c, 0x9e, 0xfe),
    Color::rgb(0xa6, 0x6c, 0xff),
);

/// Picks uniformly among a fixed set of named themes.
#[derive(Debug, Clone)]
pub struct PresetColorSource {
    presets: BTreeMap<String, Theme>,
}

impl PresetColorSource {
    /// The `warm` and `cold` palettes.
    pub fn builtin() -> Self {
        Self::with_presets(&BTreeMap::new())
    }

    /// Built-ins plus user presets; a user preset replaces a built-in of the
    /// same (case-insensitive) name.
    pub fn with_presets(custom: &BTreeMap<String, Theme>) -> Self {
        let mut presets = BTreeMap::new();
        presets.insert("cold".to_string(), COLD);
        presets.insert("warm".to_string(), WARM);
        for (name, theme) in custom {
            let normalized = normalize_preset_name(name);
            if normalized.is_empty() {
                continue;
            }
            presets.insert(normalized, *theme);
        }
        Self { presets }
    }
}

#[async_trait]
impl ColorSource for PresetColorSource {
    fn generate(&self) -> Result<Theme, ColorSourceError> {
        if self.presets.is_empty() {
            return Err(ColorSourceError::new("no presets configured"));
        }
        let index = rand::thread_rng().gen_range(0..self.presets.len());
        self.presets
            .values()
            .nth(index)
            .copied()
            .ok_or_else(|| ColorSourceError::new("preset index out of range"))
    }

    fn preset(&self, name: &str) -> Option<Theme> {
        self.presets.get(&normalize_preset_name(name)).copied()
    }

    fn preset_names(&self) -> Vec<String> {
        self.presets.keys().cloned().collect()
    }
}

/// Draws every channel of every field uniformly at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomColorSource;

#[async_trait]
impl ColorSource for RandomColorSource {
    fn generate(&self) -> Result<Theme, ColorSourceError> {
        let mut rng = rand::thread_rng();
        let mut color = || Color::rgb(rng.gen(), rng.gen(), rng.gen());
        Ok(Theme::new(color(), color(), color()))
    }
}

/// Adds fixed latency to the async path of another source.
///
/// Handy for exercising the pending state interactively.
#[derive(Debug, Clone)]
pub struct Delayed<S> {
    inner: S,
    delay: Duration,
}

impl<S> Delayed<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<S: ColorSource> ColorSource for Delayed<S> {
    fn generate(&self) -> Result<Theme, ColorSourceError> {
        self.inner.generate()
    }

    async fn generate_async(&self) -> Result<Theme, ColorSourceError> {
        tokio::time::sleep(self.delay).await;
        self.inner.generate_async().await
    }

    fn preset(&self, name: &str) -> Option<Theme> {
        self.inner.preset(name)
    }

    fn preset_names(&self) -> Vec<String> {
        self.inner.preset_names()
    }
}

/// Build the configured color source.
pub fn source_from_config(
    config: &SourceConfig,
    presets: &BTreeMap<String, Theme>,
) -> Arc<dyn ColorSource> {
    let delay = Duration::from_millis(config.delay_ms);
    match (config.kind, delay.is_zero()) {
        (SourceKind::Presets, true) => Arc::new(PresetColorSource::with_presets(presets)),
        (SourceKind::Presets, false) => Arc::new(Delayed::new(
            PresetColorSource::with_presets(presets),
            delay,
        )),
        (SourceKind::Random, true) => Arc::new(RandomColorSource),
        (SourceKind::Random, false) => Arc::new(Delayed::new(RandomColorSource, delay)),
    }
}

fn normalize_preset_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
