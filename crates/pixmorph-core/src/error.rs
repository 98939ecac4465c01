//! Error taxonomy shared by every pixmorph crate.

use thiserror::Error;

/// Broad category of an [`EffectError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The effect was asked to do something its configuration cannot support.
    Configuration,
    /// The host cannot provide the requested drawing context. Not recoverable.
    Environment,
    /// A source could not be loaded or rasterized.
    ResourceLoad,
}

/// Errors raised by the particle effect and its collaborators.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("render needs a configured source first")]
    MissingSource,

    #[error("sampling `{origin}` produced no particles, check the configuration")]
    EmptySample { origin: String },

    #[error("{context} context is unavailable: {reason}")]
    ContextUnavailable {
        context: &'static str,
        reason: String,
    },

    #[error("shader pipeline creation failed:\n{0}")]
    Shader(String),

    #[error("failed to load `{origin}`: {reason}")]
    ResourceLoad { origin: String, reason: String },

    #[error("transition to `{origin}` was dropped with its effect")]
    Abandoned { origin: String },
}

impl EffectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EffectError::MissingSource | EffectError::EmptySample { .. } => {
                ErrorKind::Configuration
            }
            EffectError::ContextUnavailable { .. }
            | EffectError::Shader(_)
            | EffectError::Abandoned { .. } => ErrorKind::Environment,
            EffectError::ResourceLoad { .. } => ErrorKind::ResourceLoad,
        }
    }

    /// Shorthand for a [`EffectError::ResourceLoad`].
    pub fn resource_load(origin: impl Into<String>, reason: impl ToString) -> Self {
        EffectError::ResourceLoad {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}
