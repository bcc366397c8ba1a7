use crate::device::GpuContext;
use binviz_core::{clamp_color, Error, PointBatch, RenderPoint, Renderer, Result, Transform3D};
use bytemuck::{Pod, Zeroable};
use nalgebra::Matrix4;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Depth range kept by the orthographic projection, on each side of the origin
pub const VIEW_DEPTH: f32 = 5.0;

/// Converts OpenGL clip space (z in [-1, 1]) to WebGPU clip space (z in [0, 1])
#[rustfmt::skip]
pub fn opengl_to_wgpu_matrix() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Vertex data for point cloud rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl PointVertex {
    /// Vertex for a render point, with its color clamped into `[0, 1]`
    pub fn from_render_point(point: &RenderPoint) -> Self {
        Self {
            position: [point.position.x, point.position.y, point.position.z],
            color: clamp_color(point.color),
        }
    }

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Color
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Camera uniform data
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub background_color: [f64; 4],
    pub vsync: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background_color: [0.0, 0.0, 0.0, 1.0],
            vsync: true,
        }
    }
}

/// Orthographic projection spanning `[-aspect, aspect] x [-1, 1]`, in WebGPU
/// clip space
pub fn projection_matrix(aspect_ratio: f32) -> Matrix4<f32> {
    let ortho = Matrix4::new_orthographic(
        -aspect_ratio,
        aspect_ratio,
        -1.0,
        1.0,
        -VIEW_DEPTH,
        VIEW_DEPTH,
    );
    opengl_to_wgpu_matrix() * ortho
}

/// Convert a batch into vertices, split so no chunk exceeds `max_bytes`
pub fn batch_to_vertex_chunks(points: &[RenderPoint], max_bytes: u64) -> Vec<Vec<PointVertex>> {
    let stride = std::mem::size_of::<PointVertex>() as u64;
    let per_chunk = (max_bytes / stride).max(1) as usize;
    points
        .chunks(per_chunk)
        .map(|chunk| chunk.iter().map(PointVertex::from_render_point).collect())
        .collect()
}

struct UploadedBatch {
    generation: u64,
    buffers: Vec<(wgpu::Buffer, u32)>,
}

/// GPU point cloud renderer drawing one pixel per point
pub struct PointCloudRenderer {
    pub gpu_context: GpuContext,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub render_pipeline: wgpu::RenderPipeline,
    pub camera_uniform: CameraUniform,
    pub camera_buffer: wgpu::Buffer,
    pub camera_bind_group: wgpu::BindGroup,
    pub config: RenderConfig,
    uploaded: Option<UploadedBatch>,
}

impl PointCloudRenderer {
    /// Create a renderer presenting to `window`
    pub async fn new(window: Arc<Window>, config: RenderConfig) -> Result<Self> {
        let instance = GpuContext::create_instance();
        let size = window.inner_size();

        let surface = instance
            .create_surface(window)
            .map_err(|e| Error::Gpu(format!("Failed to create surface: {:?}", e)))?;

        let gpu_context = GpuContext::new(instance, Some(&surface)).await?;

        let surface_caps = surface.get_capabilities(&gpu_context.adapter);
        // Colors are written as computed, without an sRGB encode.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu_context.device, &surface_config);
        let device = &gpu_context.device;

        let camera_uniform = CameraUniform {
            view_proj: Matrix4::identity().into(),
        };

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&camera_uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("camera_bind_group_layout"),
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let shader = gpu_context.create_shader_module(
            "Point Cloud Shader",
            include_str!("shaders/point_cloud.wgsl"),
        );

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Cloud Render Pipeline Layout"),
            bind_group_layouts: &[&camera_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Cloud Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[PointVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            // Later points overdraw earlier ones, in sequence order.
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        Ok(Self {
            gpu_context,
            surface,
            surface_config,
            render_pipeline,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            config,
            uploaded: None,
        })
    }

    /// Surface width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    /// Resize renderer surface
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.gpu_context.device, &self.surface_config);
        }
    }

    /// Upload the model transform combined with the projection
    pub fn update_camera(&mut self, transform: &Transform3D) {
        let view_proj = projection_matrix(self.aspect_ratio()) * Matrix4::from(*transform);
        self.camera_uniform.view_proj = view_proj.into();

        self.gpu_context.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&self.camera_uniform),
        );
    }

    /// Upload the batch unless this generation is already on the GPU
    fn ensure_uploaded(&mut self, batch: &PointBatch) {
        if matches!(&self.uploaded, Some(u) if u.generation == batch.generation()) {
            return;
        }

        let chunks = batch_to_vertex_chunks(batch.points(), self.gpu_context.max_buffer_size());
        let device = &self.gpu_context.device;
        let buffers = chunks
            .iter()
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Point Cloud Vertex Buffer"),
                    contents: bytemuck::cast_slice(chunk),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                (buffer, chunk.len() as u32)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "uploaded generation {} as {} vertex buffer(s)",
            batch.generation(),
            buffers.len()
        );
        self.uploaded = Some(UploadedBatch {
            generation: batch.generation(),
            buffers,
        });
    }

    /// Acquire the next surface texture, reconfiguring once if it was lost
    fn acquire_frame(&mut self) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.gpu_context.device, &self.surface_config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface texture timed out, skipping frame");
                Ok(None)
            }
            Err(e) => Err(Error::Gpu(format!("Failed to get surface texture: {:?}", e))),
        }
    }

    /// Render the batch under `transform`
    pub fn render(&mut self, batch: &PointBatch, transform: &Transform3D) -> Result<()> {
        self.update_camera(transform);
        self.ensure_uploaded(batch);

        let output = match self.acquire_frame()? {
            Some(output) => output,
            None => return Ok(()),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let encoder_desc = wgpu::CommandEncoderDescriptor {
            label: Some("Point Cloud Render Encoder"),
        };
        let mut encoder = self.gpu_context.device.create_command_encoder(&encoder_desc);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Cloud Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: self.config.background_color[0],
                            g: self.config.background_color[1],
                            b: self.config.background_color[2],
                            a: self.config.background_color[3],
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            if let Some(uploaded) = &self.uploaded {
                for (buffer, count) in &uploaded.buffers {
                    render_pass.set_vertex_buffer(0, buffer.slice(..));
                    render_pass.draw(0..*count, 0..1);
                }
            }
        }

        self.gpu_context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl Renderer for PointCloudRenderer {
    fn draw_points(&mut self, batch: &PointBatch, transform: &Transform3D) -> Result<()> {
        self.render(batch, transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use binviz_core::Point3f;
    use nalgebra::Vector4;

    fn render_point(x: f32, color: [f32; 3]) -> RenderPoint {
        RenderPoint {
            position: Point3f::new(x, 0.0, 0.0),
            color,
        }
    }

    #[test]
    fn test_vertex_layout_size() {
        assert_eq!(std::mem::size_of::<PointVertex>(), 24);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
    }

    #[test]
    fn test_vertex_colors_are_clamped() {
        let v = PointVertex::from_render_point(&render_point(0.5, [0.5, -0.2, 1.3]));
        assert_eq!(v.position, [0.5, 0.0, 0.0]);
        assert_eq!(v.color, [0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_projection_maps_unit_ball_into_clip_space() {
        let proj = projection_matrix(2.0);

        let right = proj * Vector4::new(2.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(right.x, 1.0, epsilon = 1e-6);

        let top = proj * Vector4::new(0.0, 1.0, 0.0, 1.0);
        assert_relative_eq!(top.y, 1.0, epsilon = 1e-6);

        for z in [-VIEW_DEPTH, 0.0, VIEW_DEPTH] {
            let p = proj * Vector4::new(0.0, 0.0, z, 1.0);
            assert!((0.0..=1.0).contains(&p.z), "z {} mapped to {}", z, p.z);
        }
    }

    #[test]
    fn test_chunks_respect_buffer_limit() {
        let points: Vec<RenderPoint> = (0..10).map(|i| render_point(i as f32, [1.0; 3])).collect();
        let chunks = batch_to_vertex_chunks(&points, 24 * 4);

        assert_eq!(chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![4, 4, 2]);
        assert_eq!(chunks[2][1].position[0], 9.0);
    }

    #[test]
    fn test_single_chunk_when_it_fits() {
        let points: Vec<RenderPoint> = (0..3).map(|i| render_point(i as f32, [0.0; 3])).collect();
        assert_eq!(batch_to_vertex_chunks(&points, u64::MAX).len(), 1);
        assert!(batch_to_vertex_chunks(&[], 1024).is_empty());
    }
}
