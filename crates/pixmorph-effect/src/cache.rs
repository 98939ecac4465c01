//! Content-addressed particle cache.

use std::collections::HashMap;

use pixmorph_core::{EffectConfig, Particle, ParticleSet};

#[derive(Debug, Clone)]
struct CacheEntry {
    config: EffectConfig,
    particles: ParticleSet,
}

/// Sampled particle sets keyed by source.
///
/// An entry only counts as a hit while the config it was sampled with still
/// equals the current one, so changing the gap, radius or filter resamples
/// the same source. Particles are cloned in and out; the live set never
/// aliases an entry.
#[derive(Debug, Default)]
pub struct ParticleCache {
    entries: HashMap<String, CacheEntry>,
}

impl ParticleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &str, config: &EffectConfig) -> Option<ParticleSet> {
        self.entries
            .get(source)
            .filter(|entry| entry.config == *config)
            .map(|entry| entry.particles.clone())
    }

    pub fn insert(&mut self, source: &str, config: &EffectConfig, particles: &[Particle]) {
        self.entries.insert(
            source.to_string(),
            CacheEntry {
                config: config.clone(),
                particles: particles.to_vec(),
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
