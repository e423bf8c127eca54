use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::instance::{LineVertex, PartInstance};
use super::mesh::{self, Vertex};
use super::DEPTH_FORMAT;

/// Maximum solid instances per frame (parts + props + ground).
pub const MAX_INSTANCES: usize = 256;
/// Maximum debug-line vertices per frame (axes + gizmo).
pub const MAX_LINE_VERTICES: usize = 256;

/// Sphere tessellation.
const SPHERE_STACKS: u16 = 12;
const SPHERE_SECTORS: u16 = 16;

/// Per-viewport camera uniform.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Which camera uniform a draw call binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum CameraSlot {
    Outer = 0,
    Inner = 1,
}

/// One indexed mesh on the GPU.
pub struct MeshBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, label: &str, vertices: &[Vertex], indices: &[u16]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// GPU resources for the solid scene geometry: shared meshes, the instance
/// buffer, per-camera uniforms, and fill/wireframe pipeline variants.
pub struct ScenePipeline {
    pub fill_pipeline: wgpu::RenderPipeline,
    pub wire_pipeline: wgpu::RenderPipeline,
    pub cube: MeshBuffers,
    pub sphere: MeshBuffers,
    pub instance_buffer: wgpu::Buffer,
    pub camera_buffers: [wgpu::Buffer; 2],
    pub camera_bind_groups: [wgpu::BindGroup; 2],
    pub camera_layout: wgpu::BindGroupLayout,
    pub cube_count: u32,
    pub sphere_count: u32,
}

impl ScenePipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_uniform_layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&camera_layout],
            push_constant_ranges: &[],
        });

        // Instance buffer layout (80 bytes: model matrix columns + color).
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PartInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 0,
                    shader_location: 2,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 16,
                    shader_location: 3,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 32,
                    shader_location: 4,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 48,
                    shader_location: 5,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Uint32,
                    offset: 64,
                    shader_location: 6,
                },
            ],
        };

        let make_pipeline = |label: &str, polygon_mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout(), instance_layout.clone()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    unclipped_depth: false,
                    polygon_mode,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let fill_pipeline = make_pipeline("scene_pipeline_fill", wgpu::PolygonMode::Fill);
        let wire_pipeline = make_pipeline("scene_pipeline_wire", wgpu::PolygonMode::Line);

        let (cube_vertices, cube_indices) = mesh::cube();
        let cube = MeshBuffers::new(device, "cube_mesh", &cube_vertices, &cube_indices);
        let (sphere_vertices, sphere_indices) = mesh::sphere(SPHERE_STACKS, SPHERE_SECTORS);
        let sphere = MeshBuffers::new(device, "sphere_mesh", &sphere_vertices, &sphere_indices);

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("part_instance_buffer"),
            size: (MAX_INSTANCES * std::mem::size_of::<PartInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let make_camera = |label: &str| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&[CameraUniform {
                    view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
                }]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let camera_buffers = [
            make_camera("outer_camera_uniform"),
            make_camera("inner_camera_uniform"),
        ];
        let camera_bind_groups = [0usize, 1].map(|i| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("camera_bind_group"),
                layout: &camera_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffers[i].as_entire_binding(),
                }],
            })
        });

        Self {
            fill_pipeline,
            wire_pipeline,
            cube,
            sphere,
            instance_buffer,
            camera_buffers,
            camera_bind_groups,
            camera_layout,
            cube_count: 0,
            sphere_count: 0,
        }
    }

    /// Upload this frame's instances: cubes first, spheres after, so each
    /// mesh draws one contiguous instance range.
    pub fn update_instances(
        &mut self,
        queue: &wgpu::Queue,
        cubes: &[PartInstance],
        spheres: &[PartInstance],
    ) {
        let cube_count = cubes.len().min(MAX_INSTANCES);
        let sphere_count = spheres.len().min(MAX_INSTANCES - cube_count);
        self.cube_count = cube_count as u32;
        self.sphere_count = sphere_count as u32;

        if cube_count > 0 {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&cubes[..cube_count]),
            );
        }
        if sphere_count > 0 {
            queue.write_buffer(
                &self.instance_buffer,
                (cube_count * std::mem::size_of::<PartInstance>()) as wgpu::BufferAddress,
                bytemuck::cast_slice(&spheres[..sphere_count]),
            );
        }
    }

    /// Update one camera's view-projection matrix.
    pub fn update_camera(&self, queue: &wgpu::Queue, slot: CameraSlot, view_proj: glam::Mat4) {
        queue.write_buffer(
            &self.camera_buffers[slot as usize],
            0,
            bytemuck::cast_slice(&[CameraUniform {
                view_proj: view_proj.to_cols_array_2d(),
            }]),
        );
    }
}

/// Line-list pipeline for the axes and the inner-camera gizmo. Shares the
/// scene pipeline's camera bind groups.
pub struct LinePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    pub num_vertices: u32,
}

impl LinePipeline {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/line.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line_pipeline_layout"),
            bind_group_layouts: &[camera_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Uint32,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("line_vertex_buffer"),
            size: (MAX_LINE_VERTICES * std::mem::size_of::<LineVertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            vertex_buffer,
            num_vertices: 0,
        }
    }

    pub fn update_vertices(&mut self, queue: &wgpu::Queue, vertices: &[LineVertex]) {
        let count = vertices.len().min(MAX_LINE_VERTICES);
        self.num_vertices = count as u32;
        if count > 0 {
            queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&vertices[..count]),
            );
        }
    }
}
