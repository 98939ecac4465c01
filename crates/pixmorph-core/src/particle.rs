//! The particle entity.

use crate::Rgba;
use crate::motion::is_approximate_equal;

/// An ordered set of particles. Order only matters as the correspondence
/// index during reconciliation.
pub type ParticleSet = Vec<Particle>;

/// A point with a current, previous and target position.
///
/// `prev_*` is only overwritten by [`Particle::update_next`], and the current
/// position is only moved through [`Particle::update`], which snaps each axis
/// onto its target once it is within one unit of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub color: Rgba,
    prev_x: f32,
    prev_y: f32,
    next_x: f32,
    next_y: f32,
}

impl Particle {
    /// Create a resting particle whose previous and target positions equal
    /// its current position.
    pub fn new(x: f32, y: f32, r: f32, color: Rgba) -> Self {
        Self {
            x,
            y,
            r,
            color,
            prev_x: x,
            prev_y: y,
            next_x: x,
            next_y: y,
        }
    }

    /// A fresh resting particle at this particle's current position.
    ///
    /// Used when a transition needs more particles than are on screen.
    pub fn respawn(&self) -> Self {
        Self::new(self.x, self.y, self.r, self.color)
    }

    pub fn prev_x(&self) -> f32 {
        self.prev_x
    }

    pub fn prev_y(&self) -> f32 {
        self.prev_y
    }

    pub fn next_x(&self) -> f32 {
        self.next_x
    }

    pub fn next_y(&self) -> f32 {
        self.next_y
    }

    /// Whether the particle sits exactly on its target.
    pub fn arrived(&self) -> bool {
        self.x == self.next_x && self.y == self.next_y
    }

    /// Assign a new target, remembering the current position as the
    /// transition's starting point. Radius and colour change immediately.
    pub fn update_next(&mut self, x: f32, y: f32, r: Option<f32>, color: Option<Rgba>) {
        self.prev_x = self.x;
        self.prev_y = self.y;

        self.next_x = x;
        self.next_y = y;

        if let Some(r) = r {
            self.r = r;
        }
        if let Some(color) = color {
            self.color = color;
        }
    }

    /// Move to `(x, y)`, snapping each axis to the target when close enough.
    pub fn update(&mut self, x: f32, y: f32) {
        self.x = if is_approximate_equal(x, self.next_x) {
            self.next_x
        } else {
            x
        };
        self.y = if is_approximate_equal(y, self.next_y) {
            self.next_y
        } else {
            y
        };
    }

    /// Jump straight onto the target.
    pub fn update_to_next(&mut self) {
        self.update(self.next_x, self.next_y);
    }
}
