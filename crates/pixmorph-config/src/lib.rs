//! Configuration file handling for pixmorph.
//!
//! The file lives at `<config dir>/pixmorph/config.toml`. Every key is
//! optional; a missing file is the same as an empty one.
//!
//! ```toml
//! sources = ["hello", "world"]
//! source_kind = "text"
//! switch_interval_ms = 6000
//!
//! [effect]
//! color = "#faf0e6"
//! particle_gap = 2
//!
//! [text]
//! scale = 3
//! align = "center"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use pixmorph_core::{EffectConfig, ParseColorError, Rgba};
use pixmorph_fonts::TextStyle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid effect color: {0}")]
    Color(#[from] ParseColorError),
}

/// How sources are turned into pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Sources are strings drawn with the block font.
    #[default]
    Text,
    /// Sources are image paths.
    Image,
}

/// Top-level application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sources to cycle through when none are given on the command line.
    pub sources: Vec<String>,
    pub source_kind: SourceKind,
    /// Time each source stays on screen. `0` disables switching.
    pub switch_interval_ms: u64,
    /// Transition duration for eased motion.
    pub transition_ms: u64,
    pub frame_rate: u32,
    /// `tracing` filter directive used when `PIXMORPH_LOG` is unset.
    pub log_level: String,
    pub effect: EffectSection,
    pub text: TextStyle,
    pub image: ImageSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: vec!["pixmorph".to_string()],
            source_kind: SourceKind::Text,
            switch_interval_ms: 6000,
            transition_ms: 2000,
            frame_rate: 30,
            log_level: "info".to_string(),
            effect: EffectSection::default(),
            text: TextStyle::default(),
            image: ImageSection::default(),
        }
    }
}

/// The `[effect]` table. Mirrors [`EffectConfig`] minus the pixel filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSection {
    /// Uniform particle colour as `#rgb`, `#rrggbb` or `#rrggbbaa`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub particle_radius: f32,
    pub particle_gap: u32,
    pub move_proportion_per_frame: f32,
    pub show_mouse_circle: bool,
    pub enable_continuous_easing: bool,
    pub enable_gpu: bool,
    pub offset_x: i32,
    pub offset_y: i32,
    pub disable_cache: bool,
}

impl Default for EffectSection {
    fn default() -> Self {
        let defaults = EffectConfig::default();
        Self {
            color: None,
            particle_radius: defaults.particle_radius,
            particle_gap: defaults.particle_gap,
            move_proportion_per_frame: defaults.move_proportion_per_frame,
            show_mouse_circle: defaults.show_mouse_circle,
            enable_continuous_easing: defaults.enable_continuous_easing,
            enable_gpu: defaults.enable_gpu,
            offset_x: defaults.offset_x,
            offset_y: defaults.offset_y,
            disable_cache: defaults.disable_cache,
        }
    }
}

/// The `[image]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSection {
    pub auto_fit: bool,
}

impl Default for ImageSection {
    fn default() -> Self {
        Self { auto_fit: true }
    }
}

impl AppConfig {
    /// Default location of the config file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "pixmorph").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from [`AppConfig::default_path`], falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(io_err)
    }

    /// The effect configuration described by the `[effect]` table.
    ///
    /// The source is left empty; it is chosen per transition.
    pub fn effect_config(&self) -> Result<EffectConfig, ConfigError> {
        let e = &self.effect;
        let color = e.color.as_deref().map(str::parse::<Rgba>).transpose()?;

        Ok(EffectConfig {
            source: String::new(),
            color,
            particle_radius: e.particle_radius,
            particle_gap: e.particle_gap,
            move_proportion_per_frame: e.move_proportion_per_frame,
            show_mouse_circle: e.show_mouse_circle,
            enable_continuous_easing: e.enable_continuous_easing,
            enable_gpu: e.enable_gpu,
            offset_x: e.offset_x,
            offset_y: e.offset_y,
            disable_cache: e.disable_cache,
            pixel_filter: None,
        })
    }

    pub fn switch_interval(&self) -> Option<Duration> {
        (self.switch_interval_ms > 0).then(|| Duration::from_millis(self.switch_interval_ms))
    }

    pub fn transition_time(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    /// Time between frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.frame_rate.clamp(1, 1000) as u64)
    }
}
