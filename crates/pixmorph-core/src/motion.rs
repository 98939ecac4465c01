//! Per-frame motion models.
//!
//! Time-based easing interpolates from each particle's previous position to
//! its target over a fixed duration. Continuous easing moves a fixed share of
//! the remaining distance every frame and lets a pointer-driven repulsor push
//! particles aside.

use crate::Particle;

/// Distance under which a coordinate snaps onto its target.
pub const SNAP_EPSILON: f32 = 1.0;

/// Extra reach of the repulsor beyond its radius.
pub const REPULSION_MARGIN: f32 = 10.0;

const MIN_REPULSION: f32 = 1.0;
const MAX_REPULSION: f32 = 1000.0;

/// Whole-unit Euclidean distance.
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = (x1 - x2).abs();
    let dy = (y1 - y2).abs();
    (dx * dx + dy * dy).sqrt().floor()
}

pub fn is_approximate_equal(a: f32, b: f32) -> bool {
    (a - b).abs() <= SNAP_EPSILON
}

/// Ease-out from `start` to `end`.
///
/// `t` is the time spent so far and `d` the duration. Returns exactly `end`
/// once `t >= d` and `start` at `t == 0`.
pub fn ease(t: f32, d: f32, start: f32, end: f32) -> f32 {
    if t >= d {
        return end;
    }

    let x = t / d;
    let y = -x * x + 2.0 * x;

    start + (end - start) * y
}

/// Advance a particle along its eased path.
pub fn step_eased(p: &mut Particle, cost_ms: f32, duration_ms: f32) {
    let x = ease(cost_ms, duration_ms, p.prev_x(), p.next_x());
    let y = ease(cost_ms, duration_ms, p.prev_y(), p.next_y());

    p.update(x, y);
}

/// Velocity pushing `p` away from the repulsor, if it is close enough.
pub fn repulsion(p: &Particle, repulsor: &Particle) -> Option<(f32, f32)> {
    let dis = distance(repulsor.x, repulsor.y, p.x, p.y);
    if dis >= repulsor.r + REPULSION_MARGIN {
        return None;
    }

    let angle = (p.y - repulsor.y).atan2(p.x - repulsor.x);
    // dis == 0 divides to infinity, which the clamp turns into the maximum
    let speed = (2.0 * repulsor.r / dis).clamp(MIN_REPULSION, MAX_REPULSION);

    Some((angle.cos() * speed, angle.sin() * speed))
}

/// Move a particle `1 / move_proportion` of the way to its target, plus the
/// repulsor's push.
pub fn step_continuous(p: &mut Particle, move_proportion: f32, repulsor: Option<&Particle>) {
    let proportion = move_proportion.max(1.0);

    let mut vx = (p.next_x() - p.x) / proportion;
    let mut vy = (p.next_y() - p.y) / proportion;

    if let Some((rx, ry)) = repulsor.and_then(|m| repulsion(p, m)) {
        vx += rx;
        vy += ry;
    }

    p.update(p.x + vx, p.y + vy);
}
