//! Point-sprite backend on wgpu.
//!
//! Particles are uploaded as two vertex buffers (positions and colours) and
//! drawn with a single point-list draw call into an offscreen texture, which
//! is read back into the [`Surface`] for presentation.
//!
//! WGSL has no point size builtin, so every point covers exactly one pixel;
//! the radius still travels in the uniform block for parity with the canvas
//! backend.

use std::sync::mpsc;

use bytemuck::{Pod, Zeroable};
use pixmorph_core::{EffectConfig, EffectError, Particle};
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::points::PointBatch;
use crate::{Backend, DrawStats, Renderer, Surface};

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Initial vertex capacity, grown by powers of two.
const INITIAL_CAPACITY: usize = 1024;

const POINT_SHADER: &str = r#"
struct Uniforms {
    resolution: vec2<f32>,
    point_size: f32,
    _pad: f32,
}

@group(0) @binding(0)
var<uniform> u: Uniforms;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(@location(0) a_position: vec2<f32>, @location(1) a_color: vec4<f32>) -> VertexOutput {
    var out: VertexOutput;
    let zero_to_two = a_position / u.resolution * 2.0;
    let clip = zero_to_two - vec2<f32>(1.0, 1.0);
    out.position = vec4<f32>(clip * vec2<f32>(1.0, -1.0), 0.0, 1.0);
    out.color = a_color / 255.0;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Uniforms {
    resolution: [f32; 2],
    point_size: f32,
    _pad: f32,
}

impl Uniforms {
    fn new(width: f32, height: f32, config: &EffectConfig) -> Self {
        Self {
            resolution: [width, height],
            point_size: config.radius(),
            _pad: 0.0,
        }
    }
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: 0,
}];

const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x4,
    offset: 0,
    shader_location: 1,
}];

fn gpu_unavailable(reason: impl ToString) -> EffectError {
    EffectError::ContextUnavailable {
        context: "GPU",
        reason: reason.to_string(),
    }
}

/// Renders particles as GPU points.
///
/// Every particle is drawn as a single 1 px point: `particle_radius` still
/// drives sampling but has no effect on the drawn size with this backend.
/// Use the canvas backend when particles should be drawn larger.
pub struct PointRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    readback: wgpu::Buffer,
    bytes_per_row: u32,
    position_buffer: wgpu::Buffer,
    color_buffer: wgpu::Buffer,
    capacity: usize,
    viewport: (f32, f32),
    batch: PointBatch,
    surface: Surface,
    stats: DrawStats,
}

impl PointRenderer {
    /// Create a headless point renderer drawing into a `width` x `height`
    /// surface.
    pub fn new(config: &EffectConfig, width: u32, height: u32) -> Result<Self, EffectError> {
        pollster::block_on(Self::new_async(config, width, height))
    }

    async fn new_async(
        config: &EffectConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, EffectError> {
        if width == 0 || height == 0 {
            return Err(gpu_unavailable(format!(
                "surface has no area ({width}x{height})"
            )));
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| gpu_unavailable("no compatible GPU adapter found"))?;

        let adapter_info = adapter.get_info();
        info!(
            "point renderer using {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("pixmorph points"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await
            .map_err(gpu_unavailable)?;

        // Surface shader and pipeline problems as errors instead of panics.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("point shader"),
            source: wgpu::ShaderSource::Wgsl(POINT_SHADER.into()),
        });

        let uniforms = Uniforms::new(width as f32, height as f32, config);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("point uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("point bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("point bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("point pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("point pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: 2 * 4,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &POSITION_ATTRIBUTES,
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 4 * 4,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &COLOR_ATTRIBUTES,
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        if let Some(err) = device.pop_error_scope().await {
            return Err(EffectError::Shader(err.to_string()));
        }

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("point target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        // Rows of a texture copy must be 256-byte aligned
        let bytes_per_row = (width * 4 + 255) & !255;
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("point readback"),
            size: (bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (position_buffer, color_buffer) = create_vertex_buffers(&device, INITIAL_CAPACITY);

        Ok(Self {
            device,
            queue,
            pipeline,
            uniform_buffer,
            bind_group,
            target,
            target_view,
            readback,
            bytes_per_row,
            position_buffer,
            color_buffer,
            capacity: INITIAL_CAPACITY,
            viewport: (width as f32, height as f32),
            batch: PointBatch::new(),
            surface: Surface::new(width, height),
            stats: DrawStats::default(),
        })
    }

    fn ensure_capacity(&mut self, points: usize) {
        if points <= self.capacity {
            return;
        }
        let capacity = points.next_power_of_two();
        debug!("growing point buffers from {} to {capacity}", self.capacity);
        let (positions, colors) = create_vertex_buffers(&self.device, capacity);
        self.position_buffer = positions;
        self.color_buffer = colors;
        self.capacity = capacity;
    }

    fn read_back(&mut self) -> Result<(), EffectError> {
        let width = self.surface.width();
        let height = self.surface.height();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("point readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &self.readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(self.bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = self.readback.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(gpu_unavailable)?
            .map_err(gpu_unavailable)?;

        {
            let data = slice.get_mapped_range();
            let row_bytes = (width * 4) as usize;
            let mut packed = Vec::with_capacity(row_bytes * height as usize);
            for row in 0..height as usize {
                let start = row * self.bytes_per_row as usize;
                packed.extend_from_slice(&data[start..start + row_bytes]);
            }
            self.surface.copy_from_rgba8(&packed);
        }
        self.readback.unmap();

        Ok(())
    }
}

fn create_vertex_buffers(device: &wgpu::Device, capacity: usize) -> (wgpu::Buffer, wgpu::Buffer) {
    let buffer = |label: &str, floats_per_point: usize| {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity * floats_per_point * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    };
    (buffer("point positions", 2), buffer("point colors", 4))
}

impl Renderer for PointRenderer {
    fn backend(&self) -> Backend {
        Backend::Points
    }

    fn resize(&mut self, config: &EffectConfig) {
        let width = self.surface.width() as f32;
        let height = self.surface.height() as f32;
        let uniforms = Uniforms::new(width, height, config);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.viewport = (width, height);
    }

    fn render(
        &mut self,
        particles: &[Particle],
        _repulsor: Option<&Particle>,
        _config: &EffectConfig,
    ) -> Result<(), EffectError> {
        self.stats.reset();
        self.batch.fill(particles);
        let count = self.batch.len();
        self.ensure_capacity(count);

        if count > 0 {
            self.queue.write_buffer(
                &self.position_buffer,
                0,
                bytemuck::cast_slice(&self.batch.positions),
            );
            self.queue
                .write_buffer(&self.color_buffer, 0, bytemuck::cast_slice(&self.batch.colors));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("point encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("point pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if count > 0 {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.bind_group, &[]);
                pass.set_viewport(0.0, 0.0, self.viewport.0, self.viewport.1, 0.0, 1.0);
                pass.set_vertex_buffer(0, self.position_buffer.slice(..));
                pass.set_vertex_buffer(1, self.color_buffer.slice(..));
                pass.draw(0..count as u32, 0..1);
                self.stats.draw_calls = 1;
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        self.stats.particles = count as u32;
        self.read_back()
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }

    fn stats(&self) -> DrawStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_match_the_shader_layout() {
        let config = EffectConfig {
            particle_radius: 0.0,
            ..EffectConfig::default()
        };
        let uniforms = Uniforms::new(80.0, 40.0, &config);
        assert_eq!(bytemuck::bytes_of(&uniforms).len(), 16);
        assert_eq!(uniforms.resolution, [80.0, 40.0]);
        // carried for the shader, clamped like everywhere else
        assert_eq!(uniforms.point_size, 1.0);
    }

    #[test]
    fn shader_never_reads_the_point_size() {
        assert!(!POINT_SHADER.contains("u.point_size"));
        assert!(POINT_SHADER.contains("u.resolution"));
    }
}
