//! # Vitrine
//!
//! **A walk-through 3D gallery engine.**
//!
//! Vitrine builds a lit exhibition hall with framed exhibits, flies the camera in
//! through the entrance, then hands over to first-person navigation: drag to look,
//! WASD or the arrow keys to walk, click a frame to select it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vitrine::ViewerConfig;
//!
//! fn main() {
//!     env_logger::init();
//!     vitrine::run(ViewerConfig::new().title("Relics")).unwrap();
//! }
//! ```
//!
//! ## Embedding
//!
//! Hosts that own their own event loop drive a [`Viewer`] directly through a
//! [`Platform`] implementation: `enter_viewer` / `poll` / `exit_viewer` for the
//! lifecycle, `handle_input` for pointer and keyboard events, `on_frame` for each
//! scheduled frame. The viewer owns every per-activation resource and releases
//! them all when it leaves the gallery.

mod app;
mod camera;
mod camera_controller;
mod color;
mod config;
mod easing;
mod error;
mod exhibits;
mod geometry;
mod gpu;
mod input;
mod material;
mod mesh;
mod mesh_pass;
mod picking;
mod render_loop;
mod renderer;
pub mod scene;
#[cfg(test)]
mod testing;
mod viewer;

pub use app::run;
pub use camera::Camera;
pub use camera_controller::{CameraBounds, CameraController, CameraPhase, clamp_pitch};
pub use color::Color;
pub use config::{CameraSettings, ViewerConfig, WallClearance};
pub use easing::Easing;
pub use error::{ConstructionError, TeardownError, ViewerError};
pub use exhibits::{ExhibitId, ExhibitRecord, ExhibitRegistry, NotFound};
pub use geometry::{Aabb, RawGeometry, Shape};
pub use gpu::GpuContext;
pub use input::{
    InputEvent, InputOutcome, InputRouter, InputState, MovementRole, WindowEventTranslator,
};
pub use material::Material;
pub use mesh::{Mesh, Transform, Vertex3d};
pub use mesh_pass::{DrawCall, Environment, MeshPass};
pub use picking::{Ray, RayHit, pick, raycast};
pub use render_loop::{FrameRequest, FrameScheduler, RenderLoop, tick};
pub use renderer::{GpuRenderer, RenderBackend};
pub use viewer::{
    ActiveViewer, InputSubscription, Platform, SelectionCallback, Viewer, ViewerLifecycle,
};

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3};

// Re-export commonly used winit types for convenience
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

pub use hecs::Entity;
