use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub popup: PopupConfig,
}

/// Popup size as a multiple of a reference key size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub width: f32,
    pub height: f32,
}

impl Multipliers {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    #[serde(default = "SizingConfig::default_portrait")]
    pub portrait: Multipliers,
    #[serde(default = "SizingConfig::default_landscape")]
    pub landscape: Multipliers,
    #[serde(default = "SizingConfig::default_emoji")]
    pub emoji: Multipliers,
    /// Extra height factor applied in compact (toolbar) mode.
    #[serde(default = "SizingConfig::default_compact_height_factor")]
    pub compact_height_factor: f32,
}

impl SizingConfig {
    fn default_portrait() -> Multipliers { Multipliers::new(1.1, 2.5) }
    fn default_landscape() -> Multipliers { Multipliers::new(0.6, 3.0) }
    fn default_emoji() -> Multipliers { Multipliers::new(1.0, 2.5) }
    fn default_compact_height_factor() -> f32 { 1.2 }
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            portrait: Self::default_portrait(),
            landscape: Self::default_landscape(),
            emoji: Self::default_emoji(),
            compact_height_factor: Self::default_compact_height_factor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupConfig {
    #[serde(default = "PopupConfig::default_preview_enabled")]
    pub preview_enabled: bool,
    /// Largest item count that still fits on a single row.
    #[serde(default = "PopupConfig::default_row_capacity")]
    pub row_capacity: usize,
}

impl PopupConfig {
    fn default_preview_enabled() -> bool { true }
    fn default_row_capacity() -> usize { 5 }
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            preview_enabled: true,
            row_capacity: 5,
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("keypop")
    }

    pub fn config_path() -> PathBuf {
        // KEYPOP_CONFIG env var overrides for testing.
        if let Ok(path) = std::env::var("KEYPOP_CONFIG") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&contents).with_context(|| "parsing config TOML")
    }
}
