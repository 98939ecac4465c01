//! Per-frame draw counters.

/// What the last frame cost in drawing operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Fill operations issued.
    pub fill_calls: u32,
    /// Stroke operations issued.
    pub stroke_calls: u32,
    /// Times the fill or stroke style actually changed.
    pub style_changes: u32,
    /// GPU draw calls issued.
    pub draw_calls: u32,
    /// Particles submitted.
    pub particles: u32,
}

impl DrawStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
