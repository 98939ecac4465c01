//! Pixel buffers and sampling them into particles.

use crate::{Particle, ParticleSet, PixelFilter, Rgba};

/// A row-major RGBA8 raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap existing RGBA8 data. Returns `None` when the length does not
    /// match the dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    /// Read a pixel, `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        let i = self.index(x, y)?;
        Some(Rgba::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    /// Overwrite a pixel. Writes outside the buffer are ignored.
    pub fn put(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x > u32::MAX as i64 || y > u32::MAX as i64 {
            return;
        }
        if let Some(i) = self.index(x as u32, y as u32) {
            self.data[i..i + 4].copy_from_slice(&color.to_array());
        }
    }

    /// Fill an axis-aligned block, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba) {
        let x0 = x.clamp(0, self.width as i64);
        let y0 = y.clamp(0, self.height as i64);
        let x1 = x.saturating_add(width as i64).clamp(0, self.width as i64);
        let y1 = y.saturating_add(height as i64).clamp(0, self.height as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.put(px, py, color);
            }
        }
    }
}

/// Keeps any pixel that is neither fully transparent nor pure black.
pub fn default_filter(r: u8, g: u8, b: u8, a: u8) -> bool {
    (r as u32 + g as u32 + b as u32) > 0 && a > 0
}

/// Sample a pixel buffer into particles.
///
/// Pixels are visited on a `gap`-strided grid in row-major order; each pixel
/// accepted by `filter` becomes a particle at that grid coordinate carrying
/// the pixel's own colour. `gap` and `radius` are clamped to at least 1.
pub fn sample(
    buffer: &PixelBuffer,
    gap: u32,
    radius: f32,
    filter: Option<&PixelFilter>,
) -> ParticleSet {
    let gap = gap.max(1) as usize;
    let radius = radius.max(1.0);

    let mut particles = Vec::new();
    for y in (0..buffer.height()).step_by(gap) {
        for x in (0..buffer.width()).step_by(gap) {
            let Some(px) = buffer.get(x, y) else {
                continue;
            };
            let keep = match filter {
                Some(f) => f(px.r, px.g, px.b, px.a),
                None => default_filter(px.r, px.g, px.b, px.a),
            };
            if keep {
                particles.push(Particle::new(x as f32, y as f32, radius, px));
            }
        }
    }

    particles
}
