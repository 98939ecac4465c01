//! Effect configuration and partial overrides.

use std::fmt;
use std::sync::Arc;

use crate::Rgba;

/// Predicate over a pixel's `(r, g, b, a)` deciding whether it becomes a
/// particle.
pub type PixelFilter = Arc<dyn Fn(u8, u8, u8, u8) -> bool + Send + Sync>;

/// Snapshot of everything that shapes how a source is sampled, animated and
/// drawn.
#[derive(Clone)]
pub struct EffectConfig {
    /// Content identifier: the text to draw or the image path.
    pub source: String,
    /// Uniform fill. Without it every particle keeps its sampled colour and
    /// the canvas backend cannot batch.
    pub color: Option<Rgba>,
    pub particle_radius: f32,
    /// Sampling stride in pixels.
    pub particle_gap: u32,
    /// Continuous easing moves `1 / n` of the remaining distance per frame.
    pub move_proportion_per_frame: f32,
    pub show_mouse_circle: bool,
    pub enable_continuous_easing: bool,
    /// Select the point-sprite backend. Fixed at construction.
    pub enable_gpu: bool,
    pub offset_x: i32,
    pub offset_y: i32,
    pub disable_cache: bool,
    pub pixel_filter: Option<PixelFilter>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            color: None,
            particle_radius: 1.0,
            particle_gap: 1,
            move_proportion_per_frame: 30.0,
            show_mouse_circle: true,
            enable_continuous_easing: true,
            enable_gpu: false,
            offset_x: 0,
            offset_y: 0,
            disable_cache: false,
            pixel_filter: None,
        }
    }
}

impl EffectConfig {
    /// Radius actually used for sampling and drawing.
    pub fn radius(&self) -> f32 {
        self.particle_radius.max(1.0)
    }

    /// Gap actually used for sampling.
    pub fn gap(&self) -> u32 {
        self.particle_gap.max(1)
    }

    /// Field-by-field merge: every value set in `patch` wins, everything
    /// else is inherited from `self`.
    pub fn merge(&self, patch: &ConfigOverride) -> EffectConfig {
        EffectConfig {
            source: patch.source.clone().unwrap_or_else(|| self.source.clone()),
            color: patch.color.unwrap_or(self.color),
            particle_radius: patch.particle_radius.unwrap_or(self.particle_radius),
            particle_gap: patch.particle_gap.unwrap_or(self.particle_gap),
            move_proportion_per_frame: patch
                .move_proportion_per_frame
                .unwrap_or(self.move_proportion_per_frame),
            show_mouse_circle: patch.show_mouse_circle.unwrap_or(self.show_mouse_circle),
            enable_continuous_easing: patch
                .enable_continuous_easing
                .unwrap_or(self.enable_continuous_easing),
            enable_gpu: patch.enable_gpu.unwrap_or(self.enable_gpu),
            offset_x: patch.offset_x.unwrap_or(self.offset_x),
            offset_y: patch.offset_y.unwrap_or(self.offset_y),
            disable_cache: patch.disable_cache.unwrap_or(self.disable_cache),
            pixel_filter: patch
                .pixel_filter
                .clone()
                .or_else(|| self.pixel_filter.clone()),
        }
    }
}

// Shallow equality: the filter compares by identity.
impl PartialEq for EffectConfig {
    fn eq(&self, other: &Self) -> bool {
        let same_filter = match (&self.pixel_filter, &other.pixel_filter) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };

        same_filter
            && self.source == other.source
            && self.color == other.color
            && self.particle_radius == other.particle_radius
            && self.particle_gap == other.particle_gap
            && self.move_proportion_per_frame == other.move_proportion_per_frame
            && self.show_mouse_circle == other.show_mouse_circle
            && self.enable_continuous_easing == other.enable_continuous_easing
            && self.enable_gpu == other.enable_gpu
            && self.offset_x == other.offset_x
            && self.offset_y == other.offset_y
            && self.disable_cache == other.disable_cache
    }
}

impl fmt::Debug for EffectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectConfig")
            .field("source", &self.source)
            .field("color", &self.color)
            .field("particle_radius", &self.particle_radius)
            .field("particle_gap", &self.particle_gap)
            .field("move_proportion_per_frame", &self.move_proportion_per_frame)
            .field("show_mouse_circle", &self.show_mouse_circle)
            .field("enable_continuous_easing", &self.enable_continuous_easing)
            .field("enable_gpu", &self.enable_gpu)
            .field("offset_x", &self.offset_x)
            .field("offset_y", &self.offset_y)
            .field("disable_cache", &self.disable_cache)
            .field("pixel_filter", &self.pixel_filter.as_ref().map(|_| ".."))
            .finish()
    }
}

/// A partial [`EffectConfig`]. `None` fields inherit.
///
/// `color` is doubly optional so an override can clear the uniform colour
/// with `Some(None)`.
#[derive(Clone, Default)]
pub struct ConfigOverride {
    pub source: Option<String>,
    pub color: Option<Option<Rgba>>,
    pub particle_radius: Option<f32>,
    pub particle_gap: Option<u32>,
    pub move_proportion_per_frame: Option<f32>,
    pub show_mouse_circle: Option<bool>,
    pub enable_continuous_easing: Option<bool>,
    pub enable_gpu: Option<bool>,
    pub offset_x: Option<i32>,
    pub offset_y: Option<i32>,
    pub disable_cache: Option<bool>,
    pub pixel_filter: Option<PixelFilter>,
}

impl fmt::Debug for ConfigOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigOverride")
            .field("source", &self.source)
            .field("color", &self.color)
            .field("particle_radius", &self.particle_radius)
            .field("particle_gap", &self.particle_gap)
            .field("show_mouse_circle", &self.show_mouse_circle)
            .field("enable_continuous_easing", &self.enable_continuous_easing)
            .finish_non_exhaustive()
    }
}
