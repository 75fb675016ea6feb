//! Lit mesh rendering with depth testing, fog and alpha blending.
//!
//! The pass uses two bind groups:
//! - **Group 0**: Scene uniforms (view-projection, camera position, fog, ambient and
//!   hemisphere terms) plus a fixed-size array of point and spot lights
//! - **Group 1**: Model uniforms (model matrix, normal matrix, material), one slot per
//!   draw in a single buffer addressed by dynamic offset
//!
//! Opaque draws go first with depth writes on. Transparent draws follow, sorted back
//! to front, with depth writes off. Faces are not culled: flat shapes are visible
//! from both sides and the shader flips normals on back faces.

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::color::Color;
use crate::gpu::GpuContext;
use crate::material::Material;
use crate::mesh::{Mesh, Vertex3d};
use crate::scene::{Fog, Light};

/// Point and spot lights beyond this count are dropped with a warning.
pub const MAX_LIGHTS: usize = 64;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-frame scene uniforms.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = camera position, w = fog density.
    pub camera_pos: [f32; 4],
    pub fog_color: [f32; 4],
    /// Ambient light, premultiplied by intensity.
    pub ambient: [f32; 4],
    pub sky: [f32; 4],
    pub ground: [f32; 4],
    /// x = number of valid entries in the light array.
    pub counts: [u32; 4],
}

/// One point or spot light as the shader sees it.
#[repr(C)]
#[derive(Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    /// xyz = position, w = range (0 = unlimited).
    pub position: [f32; 4],
    /// rgb = color times intensity, w = 0 for point, 1 for spot.
    pub color: [f32; 4],
    /// xyz = spot axis, w = cosine of the outer cone angle.
    pub direction: [f32; 4],
    /// x = cosine of the inner (fully lit) cone angle.
    pub cone: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct LightArray {
    items: [GpuLight; MAX_LIGHTS],
}

/// Per-draw model uniforms.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix.
    pub normal_matrix: [[f32; 4]; 4],
    /// rgb = base color, a = opacity.
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    /// x = roughness, y = metalness.
    pub surface: [f32; 4],
}

impl ModelUniforms {
    fn new(model: Mat4, material: &Material) -> Self {
        let normal_matrix = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            color: material.color.with_alpha(material.opacity).to_array(),
            emissive: material.emission().to_array(),
            surface: [material.roughness, material.metalness, 0.0, 0.0],
        }
    }
}

/// One mesh to draw this frame.
pub struct DrawCall<'a> {
    pub mesh: &'a Mesh,
    /// Node-to-world matrix.
    pub model: Mat4,
    pub material: Material,
}

/// Scene-wide lighting and atmosphere for one frame.
#[derive(Clone, Copy)]
pub struct Environment<'a> {
    pub lights: &'a [Light],
    pub fog: Fog,
    pub background: Color,
}

/// Renders lit meshes into a color target with its own depth buffer.
pub struct MeshPass {
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_stride: u64,
    model_capacity: usize,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    /// Draw order of the last `prepare`: (index into the draw list, model slot).
    order: Vec<(usize, u32)>,
    transparent_from: usize,
}

impl MeshPass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        // Scene uniforms + light array (group 0)
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Uniforms"),
            size: std::mem::size_of::<LightArray>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding: u32, dynamic: bool, size: Option<wgpu::BufferSize>| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: dynamic,
                    min_binding_size: size,
                },
                count: None,
            }
        };

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[uniform_entry(0, false, None), uniform_entry(1, false, None)],
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        // Model uniforms (group 1), one aligned slot per draw
        let model_size = std::mem::size_of::<ModelUniforms>() as u64;
        let align = u64::from(device.limits().min_uniform_buffer_offset_alignment).max(1);
        let model_stride = model_size.div_ceil(align) * align;

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[uniform_entry(0, true, wgpu::BufferSize::new(model_size))],
        });

        let model_capacity = 256;
        let (model_buffer, model_bind_group) =
            Self::create_model_slots(gpu, &model_layout, model_stride, model_capacity);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&scene_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let pipeline = |label: &str, blend: wgpu::BlendState, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    front_face: wgpu::FrontFace::Ccw,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let opaque_pipeline = pipeline("Mesh Opaque Pipeline", wgpu::BlendState::REPLACE, true);
        let transparent_pipeline = pipeline(
            "Mesh Transparent Pipeline",
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        );

        let (depth_texture, depth_view) = Self::create_depth_texture(gpu);

        Self {
            opaque_pipeline,
            transparent_pipeline,
            scene_buffer,
            light_buffer,
            scene_bind_group,
            model_layout,
            model_buffer,
            model_bind_group,
            model_stride,
            model_capacity,
            depth_texture,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
            order: Vec::new(),
            transparent_from: 0,
        }
    }

    fn create_model_slots(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Recreate the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_texture.destroy();
            let (texture, view) = Self::create_depth_texture(gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Upload this frame's uniforms and decide the draw order.
    pub fn prepare(
        &mut self,
        gpu: &GpuContext,
        camera: &Camera,
        environment: Environment<'_>,
        draws: &[DrawCall<'_>],
    ) {
        self.write_scene(gpu, camera, environment);

        if draws.len() > self.model_capacity {
            let capacity = draws.len().next_power_of_two();
            self.model_buffer.destroy();
            let (buffer, bind_group) =
                Self::create_model_slots(gpu, &self.model_layout, self.model_stride, capacity);
            self.model_buffer = buffer;
            self.model_bind_group = bind_group;
            self.model_capacity = capacity;
            log::debug!("model uniform buffer grown to {capacity} slots");
        }

        let stride = self.model_stride as usize;
        let mut bytes = vec![0u8; stride * draws.len()];
        for (slot, call) in draws.iter().enumerate() {
            let uniforms = ModelUniforms::new(call.model, &call.material);
            let start = slot * stride;
            bytes[start..start + std::mem::size_of::<ModelUniforms>()]
                .copy_from_slice(bytemuck::bytes_of(&uniforms));
        }
        if !bytes.is_empty() {
            gpu.queue.write_buffer(&self.model_buffer, 0, &bytes);
        }

        let (mut opaque, mut transparent): (Vec<_>, Vec<_>) = (0..draws.len())
            .map(|i| (i, i as u32))
            .partition(|&(i, _)| !draws[i].material.is_transparent());

        let eye = camera.position;
        let distance = |i: usize| draws[i].model.transform_point3(Vec3::ZERO).distance_squared(eye);
        transparent.sort_by(|a, b| distance(b.0).total_cmp(&distance(a.0)));

        self.transparent_from = opaque.len();
        opaque.append(&mut transparent);
        self.order = opaque;
    }

    fn write_scene(&self, gpu: &GpuContext, camera: &Camera, environment: Environment<'_>) {
        let mut ambient = Vec3::ZERO;
        let mut sky = Vec3::ZERO;
        let mut ground = Vec3::ZERO;
        let mut lights = LightArray {
            items: [GpuLight::default(); MAX_LIGHTS],
        };
        let mut count = 0usize;

        for light in environment.lights {
            let slot = match *light {
                Light::Ambient { color, intensity } => {
                    ambient += rgb(color) * intensity;
                    None
                }
                Light::Hemisphere {
                    sky: s,
                    ground: g,
                    intensity,
                } => {
                    sky += rgb(s) * intensity;
                    ground += rgb(g) * intensity;
                    None
                }
                Light::Point {
                    position,
                    color,
                    intensity,
                    range,
                } => Some(GpuLight {
                    position: position.extend(range).to_array(),
                    color: (rgb(color) * intensity).extend(0.0).to_array(),
                    ..Default::default()
                }),
                Light::Spot {
                    position,
                    target,
                    color,
                    intensity,
                    angle,
                    penumbra,
                    range,
                } => {
                    let axis = (target - position).normalize_or(Vec3::NEG_Y);
                    let inner = angle * (1.0 - penumbra.clamp(0.0, 1.0));
                    Some(GpuLight {
                        position: position.extend(range).to_array(),
                        color: (rgb(color) * intensity).extend(1.0).to_array(),
                        direction: axis.extend(angle.cos()).to_array(),
                        cone: [inner.cos(), 0.0, 0.0, 0.0],
                    })
                }
            };

            if let Some(gpu_light) = slot {
                if count < MAX_LIGHTS {
                    lights.items[count] = gpu_light;
                    count += 1;
                } else {
                    log::warn!("more than {MAX_LIGHTS} lights; dropping {light:?}");
                }
            }
        }

        let uniforms = SceneUniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position.extend(environment.fog.density).to_array(),
            fog_color: environment.fog.color.to_array(),
            ambient: ambient.extend(0.0).to_array(),
            sky: sky.extend(0.0).to_array(),
            ground: ground.extend(0.0).to_array(),
            counts: [count as u32, 0, 0, 0],
        };

        gpu.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&uniforms));
        gpu.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(&lights));
    }

    /// Issue the draws uploaded by the last [`prepare`](Self::prepare).
    ///
    /// `draws` must be the same slice that was prepared.
    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>, draws: &[DrawCall<'_>]) {
        if draws.is_empty() {
            return;
        }
        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);

        for (position, &(index, slot)) in self.order.iter().enumerate() {
            if position == 0 {
                render_pass.set_pipeline(&self.opaque_pipeline);
            }
            if position == self.transparent_from {
                render_pass.set_pipeline(&self.transparent_pipeline);
            }
            let Some(call) = draws.get(index) else {
                continue;
            };
            let offset = (u64::from(slot) * self.model_stride) as u32;
            render_pass.set_bind_group(1, &self.model_bind_group, &[offset]);
            render_pass.set_vertex_buffer(0, call.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(call.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..call.mesh.index_count, 0, 0..1);
        }
    }

    /// Free the GPU buffers and the depth texture eagerly.
    pub fn destroy(&self) {
        self.scene_buffer.destroy();
        self.light_buffer.destroy();
        self.model_buffer.destroy();
        self.depth_texture.destroy();
    }
}

fn rgb(color: Color) -> Vec3 {
    Vec3::new(color.r, color.g, color.b)
}
