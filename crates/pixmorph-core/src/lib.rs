//! Core types for the pixmorph particle field.
//!
//! This crate holds everything that does not touch a terminal or a GPU:
//! particles, pixel sampling, the reconciliation step that pairs an old
//! particle set with a new one, the two per-frame motion models and the
//! effect configuration.

mod color;
mod config;
mod error;
pub mod motion;
mod particle;
pub mod pixels;
pub mod reconcile;

pub use color::{ParseColorError, Rgba};
pub use config::{ConfigOverride, EffectConfig, PixelFilter};
pub use error::{EffectError, ErrorKind};
pub use particle::{Particle, ParticleSet};
pub use pixels::{PixelBuffer, default_filter, sample};
pub use reconcile::reconcile;
