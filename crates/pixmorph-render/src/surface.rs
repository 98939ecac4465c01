//! The pixel surface particles are drawn onto.

use pixmorph_core::Rgba;

/// A fixed-size RGBA framebuffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Composite `color` over the pixel at `(x, y)` (source-over).
    pub fn blend(&mut self, x: u32, y: u32, color: Rgba) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        self.pixels[i] = source_over(color, self.pixels[i]);
    }

    /// Replace the whole surface from tightly packed RGBA8 rows.
    pub fn copy_from_rgba8(&mut self, data: &[u8]) {
        for (px, chunk) in self.pixels.iter_mut().zip(data.chunks_exact(4)) {
            *px = Rgba::new(chunk[0], chunk[1], chunk[2], chunk[3]);
        }
    }

    /// Number of pixels that are not fully transparent.
    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| !p.is_transparent()).count()
    }
}

fn source_over(src: Rgba, dst: Rgba) -> Rgba {
    if src.a == 255 || dst.a == 0 {
        return src;
    }
    if src.a == 0 {
        return dst;
    }

    let sa = src.a as f32 / 255.0;
    let da = dst.a as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let channel = |s: u8, d: u8| {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };

    Rgba::new(
        channel(src.r, dst.r),
        channel(src.g, dst.g),
        channel(src.b, dst.b),
        (out_a * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_source_replaces() {
        let mut surface = Surface::new(2, 2);
        surface.blend(1, 1, Rgba::rgb(10, 20, 30));
        surface.blend(1, 1, Rgba::WHITE);
        assert_eq!(surface.get(1, 1), Some(Rgba::WHITE));
        assert_eq!(surface.lit_pixels(), 1);
    }

    #[test]
    fn translucent_source_mixes() {
        let mut surface = Surface::new(1, 1);
        surface.blend(0, 0, Rgba::rgb(0, 0, 0));
        surface.blend(0, 0, Rgba::new(255, 255, 255, 128));
        let px = surface.get(0, 0).unwrap();
        assert_eq!(px.a, 255);
        assert!((127..=129).contains(&px.r));
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut surface = Surface::new(2, 2);
        surface.blend(5, 0, Rgba::WHITE);
        assert_eq!(surface.get(5, 0), None);
        assert_eq!(surface.lit_pixels(), 0);
    }

    #[test]
    fn copies_rgba_rows() {
        let mut surface = Surface::new(2, 1);
        surface.copy_from_rgba8(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(surface.get(1, 0), Some(Rgba::new(5, 6, 7, 8)));
        surface.clear();
        assert_eq!(surface.lit_pixels(), 0);
    }
}
