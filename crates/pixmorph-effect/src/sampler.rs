//! Source-to-particle sampling strategies.

use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use pixmorph_core::{EffectConfig, EffectError, ParticleSet, PixelBuffer, Rgba};
use pixmorph_fonts::{TextStyle, rasterize_text};
use tracing::debug;

/// Turns a source identifier into a pixel buffer and then into particles.
///
/// Samplers run on background threads for [`crate::Effect::transition_in_background`],
/// so they must be shareable.
pub trait Sampler: Send + Sync {
    /// Draw `source` into a `width` x `height` buffer.
    fn rasterize(
        &self,
        source: &str,
        config: &EffectConfig,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, EffectError>;

    fn sample(
        &self,
        source: &str,
        config: &EffectConfig,
        width: u32,
        height: u32,
    ) -> Result<ParticleSet, EffectError> {
        let buffer = self.rasterize(source, config, width, height)?;
        let particles = pixmorph_core::sample(
            &buffer,
            config.particle_gap,
            config.particle_radius,
            config.pixel_filter.as_ref(),
        );
        debug!("sampled {} particles from `{source}`", particles.len());
        Ok(particles)
    }
}

/// Draws the source string with the block font.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSampler {
    pub style: TextStyle,
}

impl TextSampler {
    pub fn new(style: TextStyle) -> Self {
        Self { style }
    }
}

impl Sampler for TextSampler {
    fn rasterize(
        &self,
        source: &str,
        config: &EffectConfig,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, EffectError> {
        Ok(rasterize_text(
            source,
            self.style,
            config.color.unwrap_or(Rgba::LINEN),
            width,
            height,
            (config.offset_x, config.offset_y),
        ))
    }
}

/// Treats the source as an image path.
#[derive(Debug, Clone, Copy)]
pub struct ImageSampler {
    /// Scale the image to fill the surface, keeping its aspect ratio.
    pub auto_fit: bool,
}

impl Default for ImageSampler {
    fn default() -> Self {
        Self { auto_fit: true }
    }
}

impl ImageSampler {
    pub fn new(auto_fit: bool) -> Self {
        Self { auto_fit }
    }
}

impl Sampler for ImageSampler {
    fn rasterize(
        &self,
        source: &str,
        config: &EffectConfig,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, EffectError> {
        let image = image::open(Path::new(source))
            .map_err(|err| EffectError::resource_load(source, err))?
            .to_rgba8();
        Ok(draw_image(
            &image,
            self.auto_fit,
            (config.offset_x, config.offset_y),
            width,
            height,
        ))
    }
}

/// Draw a decoded image onto a fresh `width` x `height` buffer.
///
/// With `auto_fit` the image is scaled by the surface height when the
/// surface is wider than tall and by its width otherwise, then centred.
/// Without it the image keeps its size and is placed at `offset`.
pub fn draw_image(
    image: &RgbaImage,
    auto_fit: bool,
    offset: (i32, i32),
    width: u32,
    height: u32,
) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(width, height);
    if image.width() == 0 || image.height() == 0 {
        return buffer;
    }

    let (scaled, left, top) = if auto_fit {
        let scale = if height < width {
            height as f32 / image.height() as f32
        } else {
            width as f32 / image.width() as f32
        };
        let scaled_w = ((image.width() as f32 * scale).floor() as u32).max(1);
        let scaled_h = ((image.height() as f32 * scale).floor() as u32).max(1);
        let left = (width as i64 - scaled_w as i64).abs() / 2;
        let top = (height as i64 - scaled_h as i64).abs() / 2;
        let scaled = if (scaled_w, scaled_h) == image.dimensions() {
            image.clone()
        } else {
            imageops::resize(image, scaled_w, scaled_h, FilterType::Nearest)
        };
        (scaled, left, top)
    } else {
        (image.clone(), offset.0 as i64, offset.1 as i64)
    };

    for (x, y, px) in scaled.enumerate_pixels() {
        buffer.put(left + x as i64, top + y as i64, Rgba::from(px.0));
    }
    buffer
}

/// Serves buffers that were rasterized elsewhere, keyed by source.
#[derive(Debug, Clone, Default)]
pub struct StaticSampler {
    buffers: HashMap<String, PixelBuffer>,
}

impl StaticSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl Into<String>, buffer: PixelBuffer) -> Self {
        self.insert(source, buffer);
        self
    }

    pub fn insert(&mut self, source: impl Into<String>, buffer: PixelBuffer) {
        self.buffers.insert(source.into(), buffer);
    }
}

impl Sampler for StaticSampler {
    fn rasterize(
        &self,
        source: &str,
        _config: &EffectConfig,
        _width: u32,
        _height: u32,
    ) -> Result<PixelBuffer, EffectError> {
        self.buffers
            .get(source)
            .cloned()
            .ok_or_else(|| EffectError::resource_load(source, "no buffer registered"))
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba as ImageRgba;
    use pixmorph_core::ErrorKind;

    use super::*;

    #[test]
    fn text_uses_linen_without_a_colour() {
        let sampler = TextSampler::default();
        let particles = sampler
            .sample("I", &EffectConfig::default(), 40, 20)
            .unwrap();
        assert!(!particles.is_empty());
        assert!(particles.iter().all(|p| p.color == Rgba::LINEN));
    }

    #[test]
    fn text_honours_the_uniform_colour() {
        let config = EffectConfig {
            color: Some(Rgba::rgb(255, 0, 0)),
            ..EffectConfig::default()
        };
        let particles = TextSampler::default().sample("8", &config, 40, 20).unwrap();
        assert!(particles.iter().all(|p| p.color == Rgba::rgb(255, 0, 0)));
    }

    #[test]
    fn gap_thins_the_sample() {
        let sampler = TextSampler::default();
        let dense = sampler.sample("HI", &EffectConfig::default(), 60, 20).unwrap();
        let sparse_config = EffectConfig {
            particle_gap: 2,
            ..EffectConfig::default()
        };
        let sparse = sampler.sample("HI", &sparse_config, 60, 20).unwrap();
        assert!(sparse.len() < dense.len());
    }

    #[test]
    fn missing_image_is_a_resource_error() {
        let err = ImageSampler::default()
            .rasterize("/nonexistent/pixmorph.png", &EffectConfig::default(), 8, 8)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceLoad);
    }

    #[test]
    fn image_round_trips_through_disk() {
        let path = std::env::temp_dir().join(format!("pixmorph-{}.png", std::process::id()));
        let image = RgbaImage::from_pixel(4, 4, ImageRgba([255, 255, 255, 255]));
        image.save(&path).unwrap();

        let buffer = ImageSampler::new(false)
            .rasterize(path.to_str().unwrap(), &EffectConfig::default(), 8, 8)
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(buffer.get(3, 3), Some(Rgba::WHITE));
        assert_eq!(buffer.get(4, 4), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn auto_fit_scales_by_height_on_wide_surfaces() {
        let image = RgbaImage::from_pixel(2, 2, ImageRgba([255, 255, 255, 255]));
        let buffer = draw_image(&image, true, (0, 0), 20, 10);

        // 10x10, centred horizontally.
        assert_eq!(buffer.get(4, 5), Some(Rgba::TRANSPARENT));
        assert_eq!(buffer.get(5, 0), Some(Rgba::WHITE));
        assert_eq!(buffer.get(14, 9), Some(Rgba::WHITE));
        assert_eq!(buffer.get(15, 5), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn auto_fit_scales_by_width_on_tall_surfaces() {
        let image = RgbaImage::from_pixel(2, 2, ImageRgba([255, 255, 255, 255]));
        let buffer = draw_image(&image, true, (0, 0), 10, 20);

        assert_eq!(buffer.get(5, 4), Some(Rgba::TRANSPARENT));
        assert_eq!(buffer.get(0, 5), Some(Rgba::WHITE));
        assert_eq!(buffer.get(9, 14), Some(Rgba::WHITE));
    }

    #[test]
    fn offsets_shift_unfitted_images() {
        let image = RgbaImage::from_pixel(1, 1, ImageRgba([255, 255, 255, 255]));
        let buffer = draw_image(&image, false, (3, 2), 8, 8);
        assert_eq!(buffer.get(3, 2), Some(Rgba::WHITE));
        assert_eq!(buffer.get(0, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn static_sampler_rejects_unknown_sources() {
        let sampler = StaticSampler::new().with("a", PixelBuffer::new(2, 2));
        assert!(sampler.rasterize("a", &EffectConfig::default(), 2, 2).is_ok());
        let err = sampler
            .rasterize("b", &EffectConfig::default(), 2, 2)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceLoad);
    }
}
