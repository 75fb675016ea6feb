//! The seam between the viewer and whatever draws the scene.
//!
//! [`RenderBackend`] is what the render loop draws through and what teardown
//! releases. [`GpuRenderer`] is the wgpu implementation: it uploads one mesh per
//! drawable node when the viewer activates and frees them all on release.

use std::collections::HashMap;
use std::sync::Arc;

use hecs::Entity;
use winit::window::Window;

use crate::camera::Camera;
use crate::error::{TeardownError, ViewerError};
use crate::gpu::GpuContext;
use crate::mesh::Mesh;
use crate::mesh_pass::{DrawCall, Environment, MeshPass};
use crate::scene::GalleryScene;

/// Draws a [`GalleryScene`] and owns the display resources for it.
pub trait RenderBackend {
    /// The render surface changed size.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame of `scene` as seen by `camera`.
    fn draw(&mut self, scene: &GalleryScene, camera: &Camera) -> Result<(), ViewerError>;

    /// Free every resource. Called exactly once, on teardown.
    fn release(self: Box<Self>) -> Result<(), TeardownError>;
}

/// wgpu-backed [`RenderBackend`].
pub struct GpuRenderer {
    gpu: GpuContext,
    pass: MeshPass,
    meshes: HashMap<Entity, Mesh>,
}

impl GpuRenderer {
    /// Create a GPU context for `window` and upload every drawable node of `scene`.
    pub fn new(window: Arc<Window>, scene: &GalleryScene) -> Result<Self, ViewerError> {
        let gpu = GpuContext::new(window)?;
        let pass = MeshPass::new(&gpu);

        let mut meshes = HashMap::new();
        let mut triangles = 0;
        scene.graph.for_each_visual(|entity, visual, _| {
            let geometry = visual.shape.tessellate();
            if geometry.indices.is_empty() {
                return;
            }
            triangles += geometry.triangle_count();
            meshes.insert(entity, geometry.upload(&gpu));
        });
        log::info!("uploaded {} meshes ({triangles} triangles)", meshes.len());

        Ok(Self { gpu, pass, meshes })
    }
}

impl RenderBackend for GpuRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    fn draw(&mut self, scene: &GalleryScene, camera: &Camera) -> Result<(), ViewerError> {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timed out; skipping frame");
                return Ok(());
            }
            Err(e) => return Err(ViewerError::Backend(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut draws = Vec::with_capacity(self.meshes.len());
        scene.graph.for_each_visual(|entity, visual, model| {
            if let Some(mesh) = self.meshes.get(&entity) {
                draws.push(DrawCall {
                    mesh,
                    model: *model,
                    material: visual.material,
                });
            }
        });

        let environment = Environment {
            lights: &scene.lights,
            fog: scene.fog,
            background: scene.background,
        };
        self.pass.ensure_depth_size(&self.gpu);
        self.pass.prepare(&self.gpu, camera, environment, &draws);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Gallery Encoder"),
            });

        {
            let background = environment.background;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Gallery Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(background.r),
                            g: f64::from(background.g),
                            b: f64::from(background.b),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.pass.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.pass.render(&mut render_pass, &draws);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(self: Box<Self>) -> Result<(), TeardownError> {
        let count = self.meshes.len();
        for mesh in self.meshes.values() {
            mesh.destroy();
        }
        self.pass.destroy();
        log::debug!("released {count} meshes");
        Ok(())
    }
}
