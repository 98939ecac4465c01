//! Particle renderers for pixmorph.
//!
//! A [`Renderer`] draws a particle set onto its own [`Surface`]; the surface
//! is then presented in the terminal through [`SurfaceWidget`]. Two backends
//! exist and one is picked when the effect is constructed:
//!
//! - [`CanvasRenderer`] rasterizes shapes on the CPU, batching all particles
//!   into a single fill when they share a colour.
//! - `PointRenderer` (feature `gpu`) uploads flat position/colour arrays to
//!   wgpu and draws them with one point-list draw call.

mod canvas;
#[cfg(feature = "gpu")]
mod gpu;
pub mod points;
mod stats;
mod surface;
mod widget;

use pixmorph_core::{EffectConfig, EffectError, Particle};
use tracing::debug;

pub use canvas::{Canvas, CanvasRenderer, Path};
#[cfg(feature = "gpu")]
pub use gpu::PointRenderer;
pub use stats::DrawStats;
pub use surface::Surface;
pub use widget::SurfaceWidget;

/// Which backend a renderer draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Canvas,
    Points,
}

/// Draws particle sets onto a surface.
pub trait Renderer {
    fn backend(&self) -> Backend;

    /// Re-read the surface size and radius-dependent state.
    fn resize(&mut self, config: &EffectConfig);

    /// Draw one frame. `repulsor` is the pointer particle, if any.
    fn render(
        &mut self,
        particles: &[Particle],
        repulsor: Option<&Particle>,
        config: &EffectConfig,
    ) -> Result<(), EffectError>;

    fn surface(&self) -> &Surface;

    /// Counters for the last frame.
    fn stats(&self) -> DrawStats;
}

/// Create the renderer selected by `config.enable_gpu`.
pub fn create_renderer(
    config: &EffectConfig,
    width: u32,
    height: u32,
) -> Result<Box<dyn Renderer>, EffectError> {
    if config.enable_gpu {
        debug!("creating point renderer {width}x{height}");
        return create_point_renderer(config, width, height);
    }

    debug!("creating canvas renderer {width}x{height}");
    Ok(Box::new(CanvasRenderer::new(width, height)?))
}

#[cfg(feature = "gpu")]
fn create_point_renderer(
    config: &EffectConfig,
    width: u32,
    height: u32,
) -> Result<Box<dyn Renderer>, EffectError> {
    Ok(Box::new(PointRenderer::new(config, width, height)?))
}

#[cfg(not(feature = "gpu"))]
fn create_point_renderer(
    _config: &EffectConfig,
    _width: u32,
    _height: u32,
) -> Result<Box<dyn Renderer>, EffectError> {
    Err(EffectError::ContextUnavailable {
        context: "GPU",
        reason: "pixmorph was built without the `gpu` feature".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_is_the_default_backend() {
        let renderer = create_renderer(&EffectConfig::default(), 8, 8).unwrap();
        assert_eq!(renderer.backend(), Backend::Canvas);
        assert_eq!(renderer.surface().width(), 8);
    }

    #[cfg(not(feature = "gpu"))]
    #[test]
    fn gpu_without_feature_is_an_environment_error() {
        let config = EffectConfig {
            enable_gpu: true,
            ..EffectConfig::default()
        };
        let err = create_renderer(&config, 8, 8).err().unwrap();
        assert_eq!(err.kind(), pixmorph_core::ErrorKind::Environment);
    }
}
