//! The effect controller.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use pixmorph_core::motion::{step_continuous, step_eased};
use pixmorph_core::{ConfigOverride, EffectConfig, EffectError, Particle, ParticleSet, Rgba, reconcile};
use pixmorph_render::{Backend, DrawStats, Renderer, Surface, create_renderer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::cache::ParticleCache;
use crate::pointer::{PointerHost, PointerRegistration};
use crate::sampler::Sampler;

/// Transition length used until the first transition sets one.
pub const DEFAULT_ANIMATION_TIME: Duration = Duration::from_millis(2000);

/// Radius of the pointer-tracked repulsor.
pub const REPULSOR_RADIUS: f32 = 20.0;

/// Where the effect draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectRoot {
    /// A surface of this many pixels.
    Surface { width: u32, height: u32 },
    /// A terminal area. Every cell holds two vertically stacked pixels.
    Container(Rect),
}

impl EffectRoot {
    pub fn pixel_size(&self) -> (u32, u32) {
        match *self {
            EffectRoot::Surface { width, height } => (width, height),
            EffectRoot::Container(area) => (area.width as u32, area.height as u32 * 2),
        }
    }
}

/// Outcome of a background transition, available once a frame tick has
/// committed (or rejected) it.
#[derive(Debug)]
pub struct TransitionTicket {
    source: String,
    rx: Receiver<Result<(), EffectError>>,
    delivered: Cell<bool>,
}

impl TransitionTicket {
    fn new(source: &str, rx: Receiver<Result<(), EffectError>>) -> Self {
        Self {
            source: source.to_string(),
            rx,
            delivered: Cell::new(false),
        }
    }

    fn resolved(source: &str) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let _ = tx.send(Ok(()));
        Self::new(source, rx)
    }

    /// The outcome, handed out exactly once.
    ///
    /// `None` while the transition is still sampling or waiting for a tick,
    /// and after the outcome was taken. A transition whose effect was dropped
    /// before committing it reports [`EffectError::Abandoned`].
    pub fn try_outcome(&self) -> Option<Result<(), EffectError>> {
        if self.delivered.get() {
            return None;
        }
        let outcome = match self.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(EffectError::Abandoned {
                origin: self.source.clone(),
            }),
        };
        self.delivered.set(true);
        Some(outcome)
    }
}

/// A sampling finished on a worker thread.
struct Resolved {
    config: EffectConfig,
    duration: Duration,
    result: Result<ParticleSet, EffectError>,
    ticket: Sender<Result<(), EffectError>>,
}

/// Morphs a particle field between sources.
///
/// The effect owns the live particle set, the renderer, the cache and the
/// pointer registration. Everything that mutates particles happens on the
/// thread calling [`Effect::frame`]; background samplings only hand their
/// results over a channel.
pub struct Effect {
    config: EffectConfig,
    width: u32,
    height: u32,
    sampler: Arc<dyn Sampler>,
    renderer: Box<dyn Renderer>,
    particles: ParticleSet,
    cache: ParticleCache,
    rendering: bool,
    animation_time: Duration,
    animation_began_at: Instant,
    pointer_host: Option<Arc<dyn PointerHost>>,
    pointer: Option<PointerRegistration>,
    repulsor: Option<Particle>,
    rng: StdRng,
    resolved_tx: Sender<Resolved>,
    resolved_rx: Receiver<Resolved>,
}

impl Effect {
    /// Create an idle effect. The renderer backend is picked here from
    /// `config.enable_gpu` and never changes afterwards.
    pub fn new(
        root: EffectRoot,
        config: EffectConfig,
        sampler: Arc<dyn Sampler>,
    ) -> Result<Self, EffectError> {
        let (width, height) = root.pixel_size();
        let renderer = create_renderer(&config, width, height)?;
        let (resolved_tx, resolved_rx) = crossbeam_channel::unbounded();

        Ok(Self {
            config,
            width,
            height,
            sampler,
            renderer,
            particles: Vec::new(),
            cache: ParticleCache::new(),
            rendering: false,
            animation_time: DEFAULT_ANIMATION_TIME,
            animation_began_at: Instant::now(),
            pointer_host: None,
            pointer: None,
            repulsor: None,
            rng: StdRng::from_entropy(),
            resolved_tx,
            resolved_rx,
        })
    }

    /// Route pointer tracking through `host`. Attaches right away if the
    /// mouse circle is enabled.
    pub fn with_pointer_host(mut self, host: Arc<dyn PointerHost>) -> Self {
        self.pointer_host = Some(host);
        self.sync_pointer();
        self
    }

    /// Make the transition shuffle reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Sample `source` (or the configured one) and start rendering it.
    ///
    /// Does nothing once rendering has started; use
    /// [`Effect::transition_to`] to change the source.
    pub fn render(&mut self, source: Option<&str>) -> Result<(), EffectError> {
        self.renderer.resize(&self.config);
        if self.rendering {
            return Ok(());
        }

        let source = source
            .filter(|s| !s.is_empty())
            .or_else(|| Some(self.config.source.as_str()).filter(|s| !s.is_empty()))
            .map(str::to_string)
            .ok_or(EffectError::MissingSource)?;

        let sampling = self.sampling_config(&source);
        let particles = self.generate(&sampling)?;
        if particles.is_empty() {
            return Err(EffectError::EmptySample { origin: source });
        }

        info!("rendering `{source}` with {} particles", particles.len());
        self.particles = particles;
        self.config.source = source;
        self.rendering = true;
        self.animation_began_at = Instant::now();
        Ok(())
    }

    /// Sample `source` now and retarget the live particles onto it.
    ///
    /// Before the first render this is just [`Effect::render`]. A transition
    /// to the current source only applies the override. On failure the
    /// particles and source are left untouched.
    pub fn transition_to(
        &mut self,
        source: &str,
        duration: Duration,
        patch: Option<ConfigOverride>,
    ) -> Result<(), EffectError> {
        self.apply_override(patch);
        if !self.rendering {
            return self.render(Some(source));
        }
        if self.config.source == source {
            return Ok(());
        }

        let sampling = self.sampling_config(source);
        let target = self.generate(&sampling)?;
        self.commit(sampling.source, duration, target);
        Ok(())
    }

    /// Like [`Effect::transition_to`], but sample on a worker thread.
    ///
    /// The result is committed by the first frame tick after sampling
    /// finishes. Concurrent transitions are not serialized: whichever
    /// finishes sampling last wins.
    pub fn transition_in_background(
        &mut self,
        source: &str,
        duration: Duration,
        patch: Option<ConfigOverride>,
    ) -> Result<TransitionTicket, EffectError> {
        self.apply_override(patch);
        if !self.rendering {
            self.render(Some(source))?;
            return Ok(TransitionTicket::resolved(source));
        }
        if self.config.source == source {
            return Ok(TransitionTicket::resolved(source));
        }

        let sampling = self.sampling_config(source);
        if !sampling.disable_cache {
            if let Some(target) = self.cache.get(source, &sampling) {
                debug!("cache hit for `{source}`");
                self.commit(sampling.source, duration, target);
                return Ok(TransitionTicket::resolved(source));
            }
        }

        let (ticket_tx, ticket_rx) = crossbeam_channel::bounded(1);
        let sampler = Arc::clone(&self.sampler);
        let resolved_tx = self.resolved_tx.clone();
        let (width, height) = (self.width, self.height);

        debug!("sampling `{source}` in the background");
        thread::spawn(move || {
            let result = sampler.sample(&sampling.source, &sampling, width, height);
            let _ = resolved_tx.send(Resolved {
                config: sampling,
                duration,
                result,
                ticket: ticket_tx,
            });
        });

        Ok(TransitionTicket::new(source, ticket_rx))
    }

    /// Block until one background transition resolves and apply it, then
    /// apply any others that are ready. Returns `false` on timeout.
    pub fn await_transition(&mut self, timeout: Duration) -> bool {
        match self.resolved_rx.recv_timeout(timeout) {
            Ok(resolved) => {
                self.apply_resolved(resolved);
                self.drain_resolved();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Advance one frame at the current time.
    pub fn frame(&mut self) -> Result<(), EffectError> {
        self.frame_at(Instant::now())
    }

    /// Advance one frame as if it were `now`.
    pub fn frame_at(&mut self, now: Instant) -> Result<(), EffectError> {
        self.drain_resolved();
        if !self.rendering {
            return Ok(());
        }

        let repulsor = self
            .repulsor
            .as_ref()
            .filter(|_| self.config.show_mouse_circle);

        if self.config.enable_continuous_easing {
            let proportion = self.config.move_proportion_per_frame;
            for p in &mut self.particles {
                step_continuous(p, proportion, repulsor);
            }
        } else {
            let cost = now.saturating_duration_since(self.animation_began_at);
            let cost_ms = cost.as_secs_f32() * 1000.0;
            let duration_ms = self.animation_time.as_secs_f32() * 1000.0;
            for p in &mut self.particles {
                step_eased(p, cost_ms, duration_ms);
            }
        }

        self.renderer.render(&self.particles, repulsor, &self.config)
    }

    /// Merge `patch` into the live config and re-sync the pointer listener.
    ///
    /// The source only changes through [`Effect::render`] and the
    /// transitions, and the backend is fixed at construction.
    pub fn update_config(&mut self, patch: ConfigOverride) {
        self.apply_override(Some(patch));
    }

    /// Move the repulsor to `(x, y)`, creating it if needed. Ignored while
    /// no pointer listener is held.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if self.pointer.is_none() {
            return;
        }

        let repulsor = self
            .repulsor
            .get_or_insert_with(|| Particle::new(-100.0, -100.0, REPULSOR_RADIUS, Rgba::WHITE));
        repulsor.update_next(x, y, None, None);
        repulsor.update_to_next();
    }

    pub fn pointer_left(&mut self) {
        self.repulsor = None;
    }

    /// Release the pointer listener and clear the cache.
    ///
    /// The effect keeps rendering if frames keep coming.
    pub fn destroy(&mut self) {
        self.pointer = None;
        self.repulsor = None;
        self.cache.clear();
        info!("effect destroyed");
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn surface(&self) -> &Surface {
        self.renderer.surface()
    }

    pub fn repulsor(&self) -> Option<&Particle> {
        self.repulsor.as_ref()
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    pub fn is_tracking_pointer(&self) -> bool {
        self.pointer.is_some()
    }

    pub fn animation_began_at(&self) -> Instant {
        self.animation_began_at
    }

    pub fn animation_time(&self) -> Duration {
        self.animation_time
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn backend(&self) -> Backend {
        self.renderer.backend()
    }

    pub fn renderer_stats(&self) -> DrawStats {
        self.renderer.stats()
    }

    fn sampling_config(&self, source: &str) -> EffectConfig {
        EffectConfig {
            source: source.to_string(),
            ..self.config.clone()
        }
    }

    fn generate(&mut self, sampling: &EffectConfig) -> Result<ParticleSet, EffectError> {
        let source = sampling.source.as_str();
        if !sampling.disable_cache {
            if let Some(particles) = self.cache.get(source, sampling) {
                debug!("cache hit for `{source}`");
                return Ok(particles);
            }
        }

        let particles = self.sampler.sample(source, sampling, self.width, self.height)?;
        if !sampling.disable_cache {
            self.cache.insert(source, sampling, &particles);
        }
        Ok(particles)
    }

    fn commit(&mut self, source: String, duration: Duration, target: ParticleSet) {
        info!(
            "transition to `{source}`: {} -> {} particles over {duration:?}",
            self.particles.len(),
            target.len()
        );
        reconcile(&mut self.particles, target, &mut self.rng);
        self.config.source = source;
        self.animation_time = duration;
        self.animation_began_at = Instant::now();
    }

    fn drain_resolved(&mut self) {
        while let Ok(resolved) = self.resolved_rx.try_recv() {
            self.apply_resolved(resolved);
        }
    }

    fn apply_resolved(&mut self, resolved: Resolved) {
        let Resolved {
            config,
            duration,
            result,
            ticket,
        } = resolved;

        let outcome = match result {
            Ok(target) => {
                if !config.disable_cache {
                    self.cache.insert(&config.source, &config, &target);
                }
                self.commit(config.source, duration, target);
                Ok(())
            }
            Err(err) => {
                warn!("transition to `{}` failed: {err}", config.source);
                Err(err)
            }
        };
        let _ = ticket.send(outcome);
    }

    fn apply_override(&mut self, patch: Option<ConfigOverride>) {
        if let Some(patch) = patch {
            let merged = self.config.merge(&patch);
            self.config = EffectConfig {
                source: std::mem::take(&mut self.config.source),
                enable_gpu: self.renderer.backend() == Backend::Points,
                ..merged
            };
        }
        self.sync_pointer();
    }

    /// Hold a pointer registration exactly while the mouse circle is on.
    fn sync_pointer(&mut self) {
        if !self.config.show_mouse_circle {
            if self.pointer.take().is_some() {
                debug!("pointer listener released");
            }
            self.repulsor = None;
            return;
        }
        if self.pointer.is_some() {
            return;
        }
        let Some(host) = self.pointer_host.clone() else {
            return;
        };
        match PointerRegistration::acquire(host) {
            Ok(registration) => {
                debug!("pointer listener attached");
                self.pointer = Some(registration);
            }
            Err(err) => warn!("pointer tracking unavailable: {err}"),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("config", &self.config)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("backend", &self.renderer.backend())
            .field("particles", &self.particles.len())
            .field("rendering", &self.rendering)
            .field("animation_time", &self.animation_time)
            .field("cache", &self.cache.len())
            .field("tracking_pointer", &self.pointer.is_some())
            .finish_non_exhaustive()
    }
}
