//! Rendering system with wgpu pipelines, buffers, and the density texture.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::density::DensityGrid;
use crate::input::RenderMode;
use crate::mesh::{MeshData, MeshVertex};
use crate::overlay::DebugOverlay;
use crate::params::RenderConfig;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Fog configuration shared by every pass
const FOG_COLOR: [f32; 4] = [0.75, 0.75, 0.75, 1.0];
const FOG_START: f32 = 15.0;
const FOG_RANGE: f32 = 175.0;

/// World-space height of one extruded terrain voxel layer
pub const LAYER_HEIGHT: f32 = 15.0;

/// Fatal resource-creation failures during renderer init
#[derive(Debug, Error)]
pub enum RenderInitError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Per-object shader constants (one uniform buffer per drawn object)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub world: [[f32; 4]; 4],
    pub world_inv_transpose: [[f32; 4]; 4],
    pub world_view_proj: [[f32; 4]; 4],
    pub tex_transform: [[f32; 4]; 4],
    pub tint: [f32; 4],
    pub fog_color: [f32; 4],
    pub eye_pos: [f32; 3],
    pub render_mode: u32,
    pub fog_start: f32,
    pub fog_range: f32,
    pub layer_height: f32,
    pub _pad: f32,
}

impl ObjectUniforms {
    pub fn new(
        world: Mat4,
        view_proj: Mat4,
        tex_transform: Mat4,
        eye_pos: Vec3,
        render_mode: RenderMode,
    ) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            world_inv_transpose: world.inverse().transpose().to_cols_array_2d(),
            world_view_proj: (view_proj * world).to_cols_array_2d(),
            tex_transform: tex_transform.to_cols_array_2d(),
            tint: [1.0, 1.0, 1.0, 1.0],
            fog_color: FOG_COLOR,
            eye_pos: eye_pos.to_array(),
            render_mode: render_mode.as_index(),
            fog_start: FOG_START,
            fog_range: FOG_RANGE,
            layer_height: LAYER_HEIGHT,
            _pad: 0.0,
        }
    }
}

struct GeometryBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Rendering system owning the device, pipelines, and every GPU resource.
///
/// All geometry buffers are immutable uploads except the wave vertex buffer,
/// which is fully overwritten each frame from the simulation output.
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    terrain_pipeline: wgpu::RenderPipeline,
    basic_pipeline: wgpu::RenderPipeline,
    water_pipeline: wgpu::RenderPipeline,

    terrain: GeometryBuffers,
    land: GeometryBuffers,
    box_geo: GeometryBuffers,
    waves: GeometryBuffers,
    terrain_instances: u32,
}

impl RenderSystem {
    /// Create the device, upload all geometry and the density field, and
    /// build the render pipelines. Any failure here is fatal to the demo.
    #[allow(clippy::too_many_arguments)]
    pub async fn new(
        window: std::sync::Arc<winit::window::Window>,
        terrain_mesh: &MeshData,
        land_mesh: &MeshData,
        box_mesh: &MeshData,
        wave_vertex_count: usize,
        wave_indices: &[u32],
        density: &DensityGrid,
    ) -> Result<Self, RenderInitError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderInitError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            // Present without waiting for vsync.
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        // Density field: one-time upload into an R32Float 3D texture. The
        // render-attachment usage mirrors a planned GPU-side regeneration
        // pass that is not wired up; only the sampled binding is exercised.
        let dims = density.dims();
        let density_extent = wgpu::Extent3d {
            width: dims.width as u32,
            height: dims.depth as u32,
            depth_or_array_layers: dims.height as u32,
        };
        let density_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Density Texture"),
            size: density_extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: wgpu::TextureFormat::R32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &density_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            density.as_bytes(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * dims.width as u32),
                rows_per_image: Some(dims.depth as u32),
            },
            density_extent,
        );
        let density_view = density_texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Bind group layouts: the terrain pass adds the density texture to
        // the shared per-object uniform slot.
        let uniform_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let basic_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[uniform_entry],
        });

        let terrain_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Terrain Bind Group Layout"),
            entries: &[
                uniform_entry,
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D3,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        // Geometry uploads. Land, box, and terrain are immutable; the wave
        // vertex buffer only reserves space and is rewritten every frame.
        let terrain = upload_mesh(
            &device,
            "Terrain",
            terrain_mesh,
            &terrain_layout,
            Some(&density_view),
        );
        let land = upload_mesh(&device, "Land", land_mesh, &basic_layout, None);
        let box_geo = upload_mesh(&device, "Box", box_mesh, &basic_layout, None);

        let waves_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Waves Vertex Buffer"),
            size: (wave_vertex_count * std::mem::size_of::<MeshVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let waves_ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Waves Index Buffer"),
            contents: bytemuck::cast_slice(wave_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let waves_ub = create_uniform_buffer(&device, "Waves");
        let waves_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Waves Bind Group"),
            layout: &basic_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: waves_ub.as_entire_binding(),
            }],
        });
        let waves = GeometryBuffers {
            vertex_buffer: waves_vb,
            index_buffer: waves_ib,
            index_count: wave_indices.len() as u32,
            uniform_buffer: waves_ub,
            bind_group: waves_bg,
        };

        // Pipelines
        let terrain_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("terrain.wgsl").into()),
        });
        let basic_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Basic Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("basic.wgsl").into()),
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        };

        let terrain_pipeline = build_pipeline(
            &device,
            "Terrain Pipeline",
            &terrain_shader,
            &terrain_layout,
            &vertex_layout,
            config.format,
            PipelineKind::Terrain,
        );
        let basic_pipeline = build_pipeline(
            &device,
            "Basic Pipeline",
            &basic_shader,
            &basic_layout,
            &vertex_layout,
            config.format,
            PipelineKind::Opaque,
        );
        let water_pipeline = build_pipeline(
            &device,
            "Water Pipeline",
            &basic_shader,
            &basic_layout,
            &vertex_layout,
            config.format,
            PipelineKind::Transparent,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            terrain_pipeline,
            basic_pipeline,
            water_pipeline,
            terrain,
            land,
            box_geo,
            waves,
            terrain_instances: density.dims().layer_count() as u32,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Full overwrite of the dynamic wave vertex buffer
    pub fn update_wave_vertices(&self, vertices: &[MeshVertex]) {
        self.queue
            .write_buffer(&self.waves.vertex_buffer, 0, bytemuck::cast_slice(vertices));
    }

    pub fn update_terrain_uniforms(&self, uniforms: &ObjectUniforms) {
        self.write_uniforms(&self.terrain.uniform_buffer, uniforms);
    }

    pub fn update_land_uniforms(&self, uniforms: &ObjectUniforms) {
        self.write_uniforms(&self.land.uniform_buffer, uniforms);
    }

    pub fn update_box_uniforms(&self, uniforms: &ObjectUniforms) {
        self.write_uniforms(&self.box_geo.uniform_buffer, uniforms);
    }

    pub fn update_water_uniforms(&self, uniforms: &ObjectUniforms) {
        self.write_uniforms(&self.waves.uniform_buffer, uniforms);
    }

    fn write_uniforms(&self, buffer: &wgpu::Buffer, uniforms: &ObjectUniforms) {
        self.queue
            .write_buffer(buffer, 0, bytemuck::cast_slice(&[*uniforms]));
    }

    /// Render one frame: clear, draw the instanced terrain, the optional
    /// land/box/water passes, then the debug overlay, and present.
    pub fn render(
        &mut self,
        render_config: &RenderConfig,
        overlay: &mut DebugOverlay,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
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

            // Terrain: one instance per voxel layer; the vertex stage
            // extrudes the 2D grid using the bound density texture.
            render_pass.set_pipeline(&self.terrain_pipeline);
            render_pass.set_bind_group(0, &self.terrain.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.terrain.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.terrain.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.terrain.index_count, 0, 0..self.terrain_instances);

            if render_config.draw_scenery {
                render_pass.set_pipeline(&self.basic_pipeline);
                for geo in [&self.land, &self.box_geo] {
                    render_pass.set_bind_group(0, &geo.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, geo.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(geo.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..geo.index_count, 0, 0..1);
                }
            }

            if render_config.draw_water {
                render_pass.set_pipeline(&self.water_pipeline);
                render_pass.set_bind_group(0, &self.waves.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.waves.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.waves.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.waves.index_count, 0, 0..1);
            }
        }

        overlay.paint(
            &self.device,
            &self.queue,
            &mut encoder,
            &view,
            [self.config.width, self.config.height],
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

enum PipelineKind {
    Terrain,
    Opaque,
    Transparent,
}

fn build_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
    vertex_layout: &wgpu::VertexBufferLayout,
    format: wgpu::TextureFormat,
    kind: PipelineKind,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let (blend, cull_mode, depth_write) = match kind {
        PipelineKind::Terrain => (None, None, true),
        PipelineKind::Opaque => (None, Some(wgpu::Face::Back), true),
        PipelineKind::Transparent => (Some(wgpu::BlendState::ALPHA_BLENDING), None, false),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: std::slice::from_ref(vertex_layout),
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
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

fn create_uniform_buffer(device: &wgpu::Device, name: &str) -> wgpu::Buffer {
    let uniforms = ObjectUniforms::new(
        Mat4::IDENTITY,
        Mat4::IDENTITY,
        Mat4::IDENTITY,
        Vec3::ZERO,
        RenderMode::default(),
    );
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Uniform Buffer", name)),
        contents: bytemuck::cast_slice(&[uniforms]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

fn upload_mesh(
    device: &wgpu::Device,
    name: &str,
    mesh: &MeshData,
    layout: &wgpu::BindGroupLayout,
    density_view: Option<&wgpu::TextureView>,
) -> GeometryBuffers {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Vertex Buffer", name)),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Index Buffer", name)),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let uniform_buffer = create_uniform_buffer(device, name);

    let mut entries = vec![wgpu::BindGroupEntry {
        binding: 0,
        resource: uniform_buffer.as_entire_binding(),
    }];
    if let Some(view) = density_view {
        entries.push(wgpu::BindGroupEntry {
            binding: 1,
            resource: wgpu::BindingResource::TextureView(view),
        });
    }
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{} Bind Group", name)),
        layout,
        entries: &entries,
    });

    GeometryBuffers {
        vertex_buffer,
        index_buffer,
        index_count: mesh.indices.len() as u32,
        uniform_buffer,
        bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_uniforms_layout() {
        // Four mat4s, two vec4s, then four 4-byte scalars after the vec3.
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 4 * 64 + 2 * 16 + 32);
        assert_eq!(std::mem::size_of::<ObjectUniforms>() % 16, 0);
    }

    #[test]
    fn test_object_uniforms_compose_wvp() {
        let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let view_proj = Mat4::from_scale(Vec3::splat(2.0));
        let u = ObjectUniforms::new(
            world,
            view_proj,
            Mat4::IDENTITY,
            Vec3::ZERO,
            RenderMode::Lighting,
        );

        let expected = (view_proj * world).to_cols_array_2d();
        assert_eq!(u.world_view_proj, expected);
        assert_eq!(u.render_mode, 0);
        assert_eq!(u.layer_height, LAYER_HEIGHT);
    }
}
