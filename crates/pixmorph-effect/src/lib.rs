//! The pixmorph particle effect.
//!
//! [`Effect`] samples a source into particles through a [`Sampler`], keeps
//! them moving toward their targets every frame and morphs them into a new
//! shape whenever the source changes. Sampled sets are kept in a
//! [`ParticleCache`] and the pointer-driven repulsor is only tracked while a
//! [`PointerRegistration`] is held.

mod cache;
mod controller;
mod pointer;
mod sampler;

pub use cache::ParticleCache;
pub use controller::{
    DEFAULT_ANIMATION_TIME, Effect, EffectRoot, REPULSOR_RADIUS, TransitionTicket,
};
pub use pointer::{PointerHost, PointerRegistration};
pub use sampler::{ImageSampler, Sampler, StaticSampler, TextSampler, draw_image};
