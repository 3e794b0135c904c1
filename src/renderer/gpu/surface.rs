use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Vec3;
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use super::context::{GpuContext, GpuError};
use super::pipeline_helpers;
use super::texture::CanvasTargets;
use crate::error::VitrineError;
use crate::options::SurfaceOptions;
use crate::renderer::surface::{DrawItem, FrameDescription, RenderSurface, SurfaceEvent};
use crate::scene::{Geometry, GeometryId};

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Per-frame uniform.
/// NOTE: Must match the WGSL `Frame` struct layout exactly (128 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    key: [f32; 4],
    fill: [f32; 4],
    ambient: [f32; 4],
}

const _: () = assert!(size_of::<FrameUniform>() == 128);

/// Per-draw uniform, bound with a dynamic offset.
/// NOTE: Must match the WGSL `Draw` struct layout exactly (160 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct DrawUniform {
    world: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    color: [f32; 4],
    material: [f32; 4],
}

impl From<&DrawItem> for DrawUniform {
    fn from(item: &DrawItem) -> Self {
        let normal = if item.world.determinant().abs() > f32::EPSILON {
            item.world.inverse().transpose()
        } else {
            item.world
        };
        Self {
            world: item.world.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            color: item.base_color.to_array(),
            material: [item.metallic, item.roughness, 0.0, 0.0],
        }
    }
}

const _: () = assert!(size_of::<DrawUniform>() == 160);

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let mut data = Vec::with_capacity(geometry.positions.len() * 6);
        for (i, p) in geometry.positions.iter().enumerate() {
            let n = geometry.normals.get(i).copied().unwrap_or(Vec3::Y);
            data.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
        }
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertices"),
            contents: bytemuck::cast_slice(&data),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Indices"),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertices,
            indices,
            index_count: geometry.indices.len() as u32,
        }
    }
}

struct DrawBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
}

impl DrawBuffer {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<DrawUniform>() as u64),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            capacity,
        }
    }
}

/// Offscreen wgpu canvas.
///
/// Geometry is uploaded once per [`GeometryId`]; each draw reads its
/// matrices from one dynamic-offset uniform buffer. Device loss is
/// reported as [`SurfaceEvent::ContextLost`] and never recovered.
pub struct GpuSurface {
    context: GpuContext,
    size: (u32, u32),
    sample_count: u32,
    targets: CanvasTargets,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    draw_stride: u64,
    draws: DrawBuffer,
    meshes: FxHashMap<GeometryId, GpuMesh>,
    lost: Arc<AtomicBool>,
    loss_reported: bool,
    frames: u64,
}

impl GpuSurface {
    /// Create a canvas of `size` physical pixels.
    ///
    /// # Errors
    ///
    /// Returns [`GpuError`] if no adapter or device is available.
    pub fn new(size: (u32, u32), options: &SurfaceOptions) -> Result<Self, GpuError> {
        let context = pollster::block_on(GpuContext::new(options.power_preference))?;
        let device = &context.device;
        let sample_count = if options.antialias { 4 } else { 1 };

        let lost = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            log::warn!("GPU device lost ({reason:?}): {message}");
            flag.store(true, Ordering::Release);
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[pipeline_helpers::uniform_buffer(0, false, None)],
        });
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[pipeline_helpers::uniform_buffer(
                0,
                true,
                wgpu::BufferSize::new(size_of::<DrawUniform>() as u64),
            )],
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform"),
            size: size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
        });
        let pipeline = pipeline_helpers::create_mesh_pipeline(
            device,
            "Mesh Pipeline",
            &shader,
            COLOR_FORMAT,
            sample_count,
            &[&frame_layout, &draw_layout],
        );

        let align = context.uniform_alignment.max(1);
        let draw_stride = (size_of::<DrawUniform>() as u64).div_ceil(align) * align;
        let draws = DrawBuffer::new(device, &draw_layout, draw_stride, 16);
        let targets = CanvasTargets::new(device, size, COLOR_FORMAT, sample_count);

        Ok(Self {
            context,
            size,
            sample_count,
            targets,
            pipeline,
            frame_buffer,
            frame_bind_group,
            draw_layout,
            draw_stride,
            draws,
            meshes: FxHashMap::default(),
            lost,
            loss_reported: false,
            frames: 0,
        })
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Geometries resident on the GPU.
    #[must_use]
    pub fn uploaded_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Resolved color texture of the last frame.
    #[must_use]
    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.targets.color.texture
    }

    fn write_frame_uniform(&self, frame: &FrameDescription<'_>) {
        let lights = frame.lights;
        let key = lights.key.direction_to(Vec3::ZERO);
        let fill = lights.group.map_or([0.0, -1.0, 0.0, 0.0], |g| {
            let d = g.direction_to(Vec3::ZERO);
            [d.x, d.y, d.z, g.intensity]
        });
        let ambient = lights.environment_tint() * lights.ambient;
        let uniform = FrameUniform {
            view_proj: frame.view_proj.to_cols_array_2d(),
            eye: frame.eye.extend(1.0).to_array(),
            key: key.extend(lights.key.intensity).to_array(),
            fill,
            ambient: ambient.extend(1.0).to_array(),
        };
        self.context
            .queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    fn write_draw_uniforms(&mut self, draws: &[DrawItem]) {
        if draws.len() > self.draws.capacity {
            let capacity = draws.len().next_power_of_two();
            self.draws = DrawBuffer::new(
                &self.context.device,
                &self.draw_layout,
                self.draw_stride,
                capacity,
            );
        }
        let stride = self.draw_stride as usize;
        let mut bytes = vec![0u8; stride * draws.len()];
        for (chunk, item) in bytes.chunks_exact_mut(stride).zip(draws) {
            let uniform = DrawUniform::from(item);
            chunk[..size_of::<DrawUniform>()].copy_from_slice(bytemuck::bytes_of(&uniform));
        }
        if !bytes.is_empty() {
            self.context.queue.write_buffer(&self.draws.buffer, 0, &bytes);
        }
    }
}

impl RenderSurface for GpuSurface {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        self.targets = CanvasTargets::new(
            &self.context.device,
            self.size,
            COLOR_FORMAT,
            self.sample_count,
        );
    }

    fn submit(&mut self, frame: &FrameDescription<'_>) -> Result<(), VitrineError> {
        if self.lost.load(Ordering::Acquire) {
            return Err(GpuError::DeviceLost.into());
        }

        for item in &frame.draws {
            let id = item.geometry.id();
            if !self.meshes.contains_key(&id) {
                let mesh = GpuMesh::upload(&self.context.device, &item.geometry);
                let _ = self.meshes.insert(id, mesh);
            }
        }
        self.write_frame_uniform(frame);
        self.write_draw_uniforms(&frame.draws);

        let (view, resolve_target) = match &self.targets.msaa {
            Some(msaa) => (&msaa.view, Some(&self.targets.color.view)),
            None => (&self.targets.color.view, None),
        };
        let mut encoder = self.context.create_encoder();
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Canvas Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.0,
                            a: f64::from(frame.clear_alpha),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (i, item) in frame.draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(&item.geometry.id()) else {
                    continue;
                };
                let offset = (i as u64 * self.draw_stride) as u32;
                render_pass.set_bind_group(1, &self.draws.bind_group, &[offset]);
                render_pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                render_pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        self.context.submit(encoder);
        self.frames += 1;
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        if !self.loss_reported && self.lost.load(Ordering::Acquire) {
            self.loss_reported = true;
            vec![SurfaceEvent::ContextLost]
        } else {
            Vec::new()
        }
    }
}

impl std::fmt::Debug for GpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuSurface")
            .field("size", &self.size)
            .field("sample_count", &self.sample_count)
            .field("meshes", &self.meshes.len())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
