//! Flat vertex arrays for the point-sprite backend.

use pixmorph_core::Particle;

/// Position and colour arrays ready for upload: two floats per particle for
/// the position, four for the colour (0-255 per channel, normalised on the
/// GPU).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBatch {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl PointBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refill both arrays from `particles`, reusing their allocations.
    pub fn fill(&mut self, particles: &[Particle]) {
        self.positions.clear();
        self.colors.clear();
        self.positions.reserve(particles.len() * 2);
        self.colors.reserve(particles.len() * 4);

        for p in particles {
            self.positions.extend_from_slice(&[p.x, p.y]);
            self.colors
                .extend(p.color.to_array().iter().map(|&c| c as f32));
        }
    }

    /// Number of points in the batch.
    pub fn len(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// CPU mirror of the vertex stage: pixel space to clip space, Y up.
pub fn to_clip_space(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    let cx = x / width * 2.0 - 1.0;
    let cy = y / height * 2.0 - 1.0;
    (cx, -cy)
}

#[cfg(test)]
mod tests {
    use pixmorph_core::Rgba;

    use super::*;

    #[test]
    fn flattens_positions_and_colours() {
        let particles = vec![
            Particle::new(1.0, 2.0, 1.0, Rgba::new(10, 20, 30, 40)),
            Particle::new(3.0, 4.0, 1.0, Rgba::WHITE),
        ];
        let mut batch = PointBatch::new();
        batch.fill(&particles);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.positions, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            batch.colors,
            vec![10.0, 20.0, 30.0, 40.0, 255.0, 255.0, 255.0, 255.0]
        );

        batch.fill(&particles[..1]);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.colors.len(), 4);
    }

    #[test]
    fn clip_space_flips_y() {
        assert_eq!(to_clip_space(0.0, 0.0, 100.0, 50.0), (-1.0, 1.0));
        assert_eq!(to_clip_space(100.0, 50.0, 100.0, 50.0), (1.0, -1.0));
        assert_eq!(to_clip_space(50.0, 25.0, 100.0, 50.0), (0.0, -0.0));
    }
}
