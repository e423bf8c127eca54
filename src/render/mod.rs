pub mod instance;
pub mod mesh;
pub mod pipeline;

use std::sync::Arc;
use winit::window::Window;

use self::instance::FrameInstances;
use self::pipeline::{CameraSlot, LinePipeline, ScenePipeline};

/// Depth buffer format for both viewports.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Core GPU state — device, queue, surface, pipelines, depth buffer.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub scene_pipeline: ScenePipeline,
    pub line_pipeline: LinePipeline,
    depth_view: wgpu::TextureView,
}

/// Intermediate frame state returned by `begin_frame`.
pub struct FrameContext {
    pub output: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuState {
    /// Initialize wgpu and the scene pipelines.
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance
            .create_surface(window)
            .expect("failed to create wgpu surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("no suitable GPU adapter found");

        log::info!(
            "GPU adapter: {:?} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("walkbot_device"),
                // Line polygon mode backs the wireframe toggle.
                required_features: wgpu::Features::POLYGON_MODE_LINE,
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))
        .expect("failed to create wgpu device");

        let surface_caps = surface.get_capabilities(&adapter);

        let format = surface_caps
            .formats
            .iter()
            .find(|f| **f == wgpu::TextureFormat::Bgra8UnormSrgb)
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        // Fifo is universally supported and this scene never strains a GPU.
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        log::info!("Surface: format={:?}", format);

        let depth_view = create_depth_view(&device, &surface_config);

        let scene_pipeline = ScenePipeline::new(&device, format);
        let line_pipeline = LinePipeline::new(&device, format, &scene_pipeline.camera_layout);

        Self {
            device,
            queue,
            surface,
            surface_config,
            scene_pipeline,
            line_pipeline,
            depth_view,
        }
    }

    /// Resize the surface and rebuild the depth buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    /// Upload this frame's staged instances and line vertices.
    pub fn update_instances(&mut self, frame: &FrameInstances) {
        self.scene_pipeline
            .update_instances(&self.queue, &frame.cubes, &frame.spheres);
        self.line_pipeline.update_vertices(&self.queue, &frame.lines);
    }

    /// Update one camera's view-projection matrix.
    pub fn update_camera(&self, slot: CameraSlot, view_proj: glam::Mat4) {
        self.scene_pipeline.update_camera(&self.queue, slot, view_proj);
    }

    /// Acquire the next surface texture and create a command encoder.
    /// Returns None if the surface is lost/outdated (caller should skip
    /// this frame).
    pub fn begin_frame(&self) -> Option<FrameContext> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface
                    .configure(&self.device, &self.surface_config);
                return None;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return None;
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return None;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        Some(FrameContext {
            output,
            view,
            encoder,
        })
    }

    /// Full-window pass from the outer camera: clears color and depth,
    /// draws everything including the inner-camera gizmo.
    pub fn draw_main_view(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        wireframe: bool,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("main_view_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let line_count = self.line_pipeline.num_vertices;
        self.draw_scene(&mut render_pass, CameraSlot::Outer, wireframe, line_count);
    }

    /// Corner inset from the inner camera: keeps the main view's color,
    /// clears depth, restricts the viewport to the top-right third. The
    /// gizmo tail of the line buffer is skipped so the inner camera never
    /// draws its own marker.
    pub fn draw_inset_view(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        wireframe: bool,
        shared_line_count: u32,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("inset_view_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let w = self.surface_config.width as f32;
        let h = self.surface_config.height as f32;
        render_pass.set_viewport(w * 2.0 / 3.0, 0.0, w / 3.0, h / 3.0, 0.0, 1.0);

        self.draw_scene(
            &mut render_pass,
            CameraSlot::Inner,
            wireframe,
            shared_line_count,
        );
    }

    fn draw_scene(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        slot: CameraSlot,
        wireframe: bool,
        line_count: u32,
    ) {
        let p = &self.scene_pipeline;
        let bind_group = &p.camera_bind_groups[slot as usize];

        render_pass.set_pipeline(if wireframe {
            &p.wire_pipeline
        } else {
            &p.fill_pipeline
        });
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.set_vertex_buffer(1, p.instance_buffer.slice(..));

        if p.cube_count > 0 {
            render_pass.set_vertex_buffer(0, p.cube.vertex_buffer.slice(..));
            render_pass.set_index_buffer(p.cube.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..p.cube.index_count, 0, 0..p.cube_count);
        }
        if p.sphere_count > 0 {
            render_pass.set_vertex_buffer(0, p.sphere.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(p.sphere.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(
                0..p.sphere.index_count,
                0,
                p.cube_count..p.cube_count + p.sphere_count,
            );
        }

        if line_count > 0 {
            render_pass.set_pipeline(&self.line_pipeline.pipeline);
            render_pass.set_bind_group(0, bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.line_pipeline.vertex_buffer.slice(..));
            render_pass.draw(0..line_count, 0..1);
        }
    }

    /// Create an egui render pass that preserves existing content.
    /// Returns a 'static render pass suitable for egui_wgpu::Renderer::render().
    pub fn begin_egui_pass<'a>(
        encoder: &'a mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'static> {
        let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("egui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.forget_lifetime()
    }

    /// Submit the command encoder and present.
    pub fn finish_frame(
        &self,
        encoder: wgpu::CommandEncoder,
        output: wgpu::SurfaceTexture,
        extra_cmd_bufs: Vec<wgpu::CommandBuffer>,
    ) {
        self.queue.submit(
            extra_cmd_bufs
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        output.present();
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
