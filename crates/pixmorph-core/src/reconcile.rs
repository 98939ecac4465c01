//! Pairing the live particle set with a freshly sampled one.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{Particle, ParticleSet};

/// Retarget `current` onto `target`.
///
/// The live set is first brought to the target's length: missing particles
/// are respawned from existing ones (`current[i % len]`), surplus particles
/// are dropped from the front. The target set is then shuffled and assigned
/// to the live set by index, which is what scatters particles across the
/// whole shape during a transition instead of sliding them in scan order.
///
/// If `current` is empty, the padding is spawned at the target positions.
pub fn reconcile<R: Rng + ?Sized>(current: &mut ParticleSet, mut target: ParticleSet, rng: &mut R) {
    let old_len = current.len();
    let new_len = target.len();

    if old_len < new_len {
        let extra: Vec<Particle> = if old_len == 0 {
            target.iter().map(Particle::respawn).collect()
        } else {
            (0..new_len - old_len)
                .map(|i| current[i % old_len].respawn())
                .collect()
        };
        current.extend(extra);
    } else if old_len > new_len {
        current.drain(..old_len - new_len);
    }

    target.shuffle(rng);
    for (p, next) in current.iter_mut().zip(&target) {
        p.update_next(next.x, next.y, Some(next.r), Some(next.color));
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::Rgba;

    fn line(len: usize, y: f32) -> ParticleSet {
        (0..len)
            .map(|i| Particle::new(i as f32, y, 1.0, Rgba::WHITE))
            .collect()
    }

    #[test]
    fn lengths_always_match() {
        let sizes = [0, 1, 5, 100];
        let mut rng = StdRng::seed_from_u64(7);
        for &from in &sizes {
            for &to in &sizes {
                let mut current = line(from, 0.0);
                reconcile(&mut current, line(to, 50.0), &mut rng);
                assert_eq!(current.len(), to, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn truncation_drops_from_the_front() {
        let mut current = line(5, 0.0);
        reconcile(&mut current, line(2, 50.0), &mut StdRng::seed_from_u64(1));
        let survivors: Vec<f32> = current.iter().map(|p| p.x).collect();
        assert_eq!(survivors, vec![3.0, 4.0]);
    }

    #[test]
    fn padding_reuses_existing_particles_in_order() {
        let mut current = line(2, 0.0);
        reconcile(&mut current, line(7, 50.0), &mut StdRng::seed_from_u64(1));
        let origins: Vec<f32> = current.iter().map(|p| p.prev_x()).collect();
        assert_eq!(origins, vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn empty_current_spawns_at_targets() {
        let mut current = Vec::new();
        reconcile(&mut current, line(3, 50.0), &mut StdRng::seed_from_u64(1));
        assert_eq!(current.len(), 3);
        assert!(current.iter().all(|p| p.y == 50.0 && p.next_y() == 50.0));
    }

    #[test]
    fn every_target_is_assigned_exactly_once() {
        let mut current = line(10, 0.0);
        let target: ParticleSet = (0..10)
            .map(|i| Particle::new(i as f32 * 3.0, 9.0, 2.0, Rgba::LINEN))
            .collect();
        reconcile(&mut current, target, &mut StdRng::seed_from_u64(42));

        let mut xs: Vec<f32> = current.iter().map(|p| p.next_x()).collect();
        xs.sort_by(f32::total_cmp);
        let expected: Vec<f32> = (0..10).map(|i| i as f32 * 3.0).collect();
        assert_eq!(xs, expected);
        assert!(current.iter().all(|p| p.r == 2.0 && p.color == Rgba::LINEN));
        // the starting point is where each particle was before
        assert!(current.iter().all(|p| p.prev_y() == 0.0 && p.y == 0.0));
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let run = || {
            let mut current = line(20, 0.0);
            reconcile(&mut current, line(20, 5.0), &mut StdRng::seed_from_u64(99));
            current
        };
        assert_eq!(run(), run());
    }

    proptest! {
        #[test]
        fn reconcile_matches_target_length(from in 0usize..200, to in 0usize..200, seed in any::<u64>()) {
            let mut current = line(from, 0.0);
            reconcile(&mut current, line(to, 1.0), &mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(current.len(), to);
        }
    }
}
