//! Immediate/batched 2D backend.
//!
//! [`Canvas`] is a small 2D drawing context over a [`Surface`]: shapes are
//! collected into a [`Path`] and rasterized by a single fill or stroke call.
//! [`CanvasRenderer`] uses it to draw particles, batching every particle into
//! one path when a uniform colour is configured.

use pixmorph_core::{EffectConfig, EffectError, Particle, Rgba};

use crate::{Backend, DrawStats, Renderer, Surface};

/// Width of a stroked outline in pixels.
const LINE_WIDTH: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Rect { x: f32, y: f32, w: f32, h: f32 },
    RoundRect { x: f32, y: f32, w: f32, h: f32, radius: f32 },
    Arc { cx: f32, cy: f32, r: f32 },
}

impl Shape {
    fn bounds(&self) -> (f32, f32, f32, f32) {
        match *self {
            Shape::Rect { x, y, w, h } | Shape::RoundRect { x, y, w, h, .. } => (x, y, x + w, y + h),
            Shape::Arc { cx, cy, r } => (cx - r, cy - r, cx + r, cy + r),
        }
    }

    /// Whether the point `(px, py)` lies inside the filled shape.
    fn contains(&self, px: f32, py: f32) -> bool {
        match *self {
            Shape::Rect { x, y, w, h } => px >= x && px < x + w && py >= y && py < y + h,
            Shape::RoundRect { x, y, w, h, radius } => {
                if px < x || px >= x + w || py < y || py >= y + h {
                    return false;
                }
                let radius = radius.min(w / 2.0).min(h / 2.0);
                let nx = px.clamp(x + radius, x + w - radius);
                let ny = py.clamp(y + radius, y + h - radius);
                (px - nx).powi(2) + (py - ny).powi(2) <= radius * radius
            }
            Shape::Arc { cx, cy, r } => (px - cx).powi(2) + (py - cy).powi(2) <= r * r,
        }
    }

    /// Whether the point lies on the shape's outline.
    fn on_outline(&self, px: f32, py: f32) -> bool {
        match *self {
            Shape::Arc { cx, cy, r } => {
                let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                (d - r).abs() <= LINE_WIDTH / 2.0
            }
            Shape::Rect { x, y, w, h } | Shape::RoundRect { x, y, w, h, .. } => {
                self.contains(px, py)
                    && (px < x + LINE_WIDTH
                        || px >= x + w - LINE_WIDTH
                        || py < y + LINE_WIDTH
                        || py >= y + h - LINE_WIDTH)
            }
        }
    }
}

/// A list of shapes filled or stroked together.
#[derive(Debug, Clone, Default)]
pub struct Path {
    shapes: Vec<Shape>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shapes: Vec::with_capacity(capacity),
        }
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.shapes.push(Shape::Rect { x, y, w, h });
    }

    pub fn round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32) {
        self.shapes.push(Shape::RoundRect { x, y, w, h, radius });
    }

    /// A full circle centred on `(cx, cy)`.
    pub fn arc(&mut self, cx: f32, cy: f32, r: f32) {
        self.shapes.push(Shape::Arc { cx, cy, r });
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// A 2D drawing context over a surface.
#[derive(Debug)]
pub struct Canvas {
    surface: Surface,
    fill_style: Rgba,
    stroke_style: Rgba,
    stats: DrawStats,
    /// Pixels already painted by the current fill or stroke. Cleared through
    /// `touched` so a paint costs what it covers, not the surface area.
    mask: Vec<bool>,
    touched: Vec<usize>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: Surface::new(width, height),
            fill_style: Rgba::TRANSPARENT,
            stroke_style: Rgba::TRANSPARENT,
            stats: DrawStats::default(),
            mask: vec![false; width as usize * height as usize],
            touched: Vec::new(),
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn stats(&self) -> DrawStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    pub fn clear(&mut self) {
        self.surface.clear();
    }

    pub fn set_fill_style(&mut self, color: Rgba) {
        if self.fill_style != color {
            self.fill_style = color;
            self.stats.style_changes += 1;
        }
    }

    pub fn set_stroke_style(&mut self, color: Rgba) {
        if self.stroke_style != color {
            self.stroke_style = color;
            self.stats.style_changes += 1;
        }
    }

    /// Fill every shape of `path` with the fill style in one operation.
    /// Overlapping shapes are covered once.
    pub fn fill(&mut self, path: &Path) {
        self.stats.fill_calls += 1;
        self.paint(path, self.fill_style, Shape::contains);
    }

    /// Outline every shape of `path` with the stroke style.
    pub fn stroke(&mut self, path: &Path) {
        self.stats.stroke_calls += 1;
        self.paint(path, self.stroke_style, Shape::on_outline);
    }

    fn paint(&mut self, path: &Path, color: Rgba, covers: fn(&Shape, f32, f32) -> bool) {
        if path.is_empty() || color.is_transparent() {
            return;
        }

        let width = self.surface.width();
        let height = self.surface.height();

        for shape in &path.shapes {
            let (x0, y0, x1, y1) = shape.bounds();
            let (x0, x1) = (x0.floor().max(0.0), x1.ceil().min(width as f32));
            let (y0, y1) = (y0.floor().max(0.0), y1.ceil().min(height as f32));
            if x0 >= x1 || y0 >= y1 {
                continue;
            }

            for py in y0 as u32..y1 as u32 {
                for px in x0 as u32..x1 as u32 {
                    let i = py as usize * width as usize + px as usize;
                    // sample at the pixel centre
                    if self.mask[i] || !covers(shape, px as f32 + 0.5, py as f32 + 0.5) {
                        continue;
                    }
                    self.mask[i] = true;
                    self.touched.push(i);
                    self.surface.blend(px, py, color);
                }
            }
        }

        for i in self.touched.drain(..) {
            self.mask[i] = false;
        }
    }
}

/// Draws particles on a [`Canvas`].
#[derive(Debug)]
pub struct CanvasRenderer {
    canvas: Canvas,
}

impl CanvasRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self, EffectError> {
        if width == 0 || height == 0 {
            return Err(EffectError::ContextUnavailable {
                context: "2D",
                reason: format!("surface has no area ({width}x{height})"),
            });
        }
        Ok(Self {
            canvas: Canvas::new(width, height),
        })
    }

    /// One path, one fill: possible because every particle shares `color`.
    fn batch_draw(&mut self, particles: &[Particle], color: Rgba, radius: f32) {
        self.canvas.set_fill_style(color);

        let mut path = Path::with_capacity(particles.len());
        for p in particles {
            if radius <= 1.0 {
                path.rect(p.x, p.y, p.r * 2.0, p.r * 2.0);
            } else {
                path.round_rect(p.x, p.y, p.r * 2.0, p.r * 2.0, p.r);
            }
        }

        self.canvas.fill(&path);
    }

    fn single_draw(&mut self, particles: &[Particle]) {
        for p in particles {
            self.canvas.set_fill_style(p.color);

            let mut path = Path::new();
            path.arc(p.x, p.y, p.r);
            self.canvas.fill(&path);
        }
    }
}

impl Renderer for CanvasRenderer {
    fn backend(&self) -> Backend {
        Backend::Canvas
    }

    // The canvas is cleared and redrawn every frame at its fixed size.
    fn resize(&mut self, _config: &EffectConfig) {}

    fn render(
        &mut self,
        particles: &[Particle],
        repulsor: Option<&Particle>,
        config: &EffectConfig,
    ) -> Result<(), EffectError> {
        self.canvas.reset_stats();
        self.canvas.clear();

        match config.color {
            Some(color) => self.batch_draw(particles, color, config.particle_radius),
            None => self.single_draw(particles),
        }

        if let Some(m) = repulsor {
            self.canvas.set_stroke_style(m.color);
            let mut path = Path::new();
            path.arc(m.x, m.y, m.r);
            self.canvas.stroke(&path);
        }

        self.canvas.stats.particles = particles.len() as u32;
        Ok(())
    }

    fn surface(&self) -> &Surface {
        self.canvas.surface()
    }

    fn stats(&self) -> DrawStats {
        self.canvas.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particles(colors: &[Rgba]) -> Vec<Particle> {
        colors
            .iter()
            .enumerate()
            .map(|(i, &c)| Particle::new(i as f32 * 4.0 + 1.0, 2.0, 1.0, c))
            .collect()
    }

    #[test]
    fn uniform_colour_batches_into_one_fill() {
        let mut renderer = CanvasRenderer::new(20, 8).unwrap();
        let config = EffectConfig {
            color: Some(Rgba::LINEN),
            ..EffectConfig::default()
        };
        let ps = particles(&[Rgba::WHITE; 4]);
        renderer.render(&ps, None, &config).unwrap();

        let stats = renderer.stats();
        assert_eq!(stats.fill_calls, 1);
        assert_eq!(stats.particles, 4);
        // 2r x 2r squares anchored at the particle position
        assert_eq!(renderer.surface().lit_pixels(), 16);
        assert_eq!(renderer.surface().get(1, 2), Some(Rgba::LINEN));
        assert_eq!(renderer.surface().get(2, 3), Some(Rgba::LINEN));
    }

    #[test]
    fn per_particle_colour_draws_each_particle() {
        let mut renderer = CanvasRenderer::new(20, 8).unwrap();
        let red = Rgba::rgb(255, 0, 0);
        let blue = Rgba::rgb(0, 0, 255);
        let ps = particles(&[red, red, blue]);
        renderer.render(&ps, None, &EffectConfig::default()).unwrap();

        let stats = renderer.stats();
        assert_eq!(stats.fill_calls, 3);
        // red once, blue once
        assert_eq!(stats.style_changes, 2);
        assert_eq!(renderer.surface().get(9, 2), Some(blue));
        assert_eq!(renderer.surface().get(0, 1), Some(red));
    }

    #[test]
    fn large_radius_uses_round_rects() {
        let mut renderer = CanvasRenderer::new(16, 16).unwrap();
        let config = EffectConfig {
            color: Some(Rgba::WHITE),
            particle_radius: 4.0,
            ..EffectConfig::default()
        };
        let ps = vec![Particle::new(0.0, 0.0, 4.0, Rgba::WHITE)];
        renderer.render(&ps, None, &config).unwrap();

        let surface = renderer.surface();
        assert_eq!(surface.get(4, 4), Some(Rgba::WHITE));
        // the corner of the 8x8 box is cut away
        assert_eq!(surface.get(0, 0), Some(Rgba::TRANSPARENT));
        assert!(surface.lit_pixels() < 64);
    }

    #[test]
    fn frames_start_from_a_clear_surface() {
        let mut renderer = CanvasRenderer::new(10, 10).unwrap();
        let config = EffectConfig {
            color: Some(Rgba::WHITE),
            ..EffectConfig::default()
        };
        renderer
            .render(&[Particle::new(1.0, 1.0, 1.0, Rgba::WHITE)], None, &config)
            .unwrap();
        renderer.render(&[], None, &config).unwrap();
        assert_eq!(renderer.surface().lit_pixels(), 0);
    }

    #[test]
    fn repulsor_is_stroked() {
        let mut renderer = CanvasRenderer::new(60, 60).unwrap();
        let repulsor = Particle::new(30.0, 30.0, 20.0, Rgba::WHITE);
        renderer
            .render(&[], Some(&repulsor), &EffectConfig::default())
            .unwrap();

        assert_eq!(renderer.stats().stroke_calls, 1);
        assert_eq!(renderer.surface().get(30, 30), Some(Rgba::TRANSPARENT));
        assert_eq!(renderer.surface().get(49, 29), Some(Rgba::WHITE));
    }

    #[test]
    fn overlapping_shapes_blend_once_per_fill() {
        let mut canvas = Canvas::new(8, 4);
        canvas.set_fill_style(Rgba::new(255, 255, 255, 128));
        let mut path = Path::new();
        path.rect(0.0, 0.0, 4.0, 4.0);
        path.rect(2.0, 0.0, 4.0, 4.0);

        canvas.fill(&path);
        let once = canvas.surface().get(0, 0);
        assert_eq!(canvas.surface().get(3, 0), once);

        // a second fill paints the overlap again
        canvas.fill(&path);
        let twice = canvas.surface().get(0, 0);
        assert_ne!(twice, once);
        assert_eq!(canvas.surface().get(3, 0), twice);
        assert_eq!(canvas.surface().get(7, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn per_particle_fills_stay_local() {
        let mut renderer = CanvasRenderer::new(400, 200).unwrap();
        let ps: Vec<Particle> = (0..2000)
            .map(|i| Particle::new((i % 400) as f32, (i / 400 * 40) as f32, 1.0, Rgba::WHITE))
            .collect();
        renderer.render(&ps, None, &EffectConfig::default()).unwrap();

        assert_eq!(renderer.stats().fill_calls, 2000);
        assert!(renderer.canvas.touched.is_empty());
        assert!(renderer.canvas.mask.iter().all(|hit| !hit));
        assert_eq!(renderer.surface().get(5, 40), Some(Rgba::WHITE));
    }

    #[test]
    fn zero_area_is_an_environment_error() {
        let err = CanvasRenderer::new(0, 10).unwrap_err();
        assert_eq!(err.kind(), pixmorph_core::ErrorKind::Environment);
    }
}
