//! The two-phase gallery camera: a scripted entry flythrough, then free
//! first-person navigation inside the hall.
//!
//! Yaw 0 looks toward -Z and grows to the right; pitch 0 is level and grows
//! upward. Look direction and walking direction share that convention, so
//! "forward" on the keyboard is always where the camera faces (ignoring pitch).
//!
//! Drags subtract from both angles. On the horizontal axis that reads as
//! "grab the scene": dragging right turns the view left. On the vertical axis
//! dragging down lowers the view. Hosts that want the view to follow the
//! pointer horizontally can pass a negative `dx` to
//! [`CameraController::look_by`].

use glam::Vec3;

use crate::camera::Camera;
use crate::config::{CameraSettings, WallClearance};
use crate::input::{InputState, MovementRole};
use crate::scene::GalleryDimensions;

/// Keeps pitch strictly inside the configured open interval.
const PITCH_MARGIN: f32 = 1e-4;

/// Camera sub-phase. The only transition is `Entering -> Free`, exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraPhase {
    /// Scripted flythrough; input is ignored.
    Entering,
    /// User-controlled navigation.
    Free,
}

/// The rectangle the FREE-phase camera may occupy on the floor plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl CameraBounds {
    /// Hall interior shrunk by the wall clearances.
    ///
    /// The default 18 x 50 hall gives x in [-7.5, 7.5] and z in [-23, 22].
    pub fn from_dimensions(dimensions: &GalleryDimensions, clearance: &WallClearance) -> Self {
        let half_w = dimensions.half_width();
        let half_l = dimensions.half_length();
        Self {
            min_x: -half_w + clearance.side,
            max_x: half_w - clearance.side,
            min_z: -half_l + clearance.back,
            max_z: half_l - clearance.front,
        }
    }

    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            position.x.clamp(self.min_x, self.max_x),
            position.y,
            position.z.clamp(self.min_z, self.max_z),
        )
    }
}

/// Owns the camera pose and advances it one tick at a time.
#[derive(Clone, Debug)]
pub struct CameraController {
    settings: CameraSettings,
    bounds: CameraBounds,
    position: Vec3,
    yaw: f32,
    pitch: f32,
    phase: CameraPhase,
    progress: f32,
    aspect: f32,
}

impl CameraController {
    /// A controller at the start of the entry flythrough.
    pub fn new(settings: CameraSettings, bounds: CameraBounds) -> Self {
        let mut controller = Self {
            position: settings.entry_start,
            settings,
            bounds,
            yaw: 0.0,
            pitch: 0.0,
            phase: CameraPhase::Entering,
            progress: 0.0,
            aspect: 16.0 / 9.0,
        };
        controller.face(controller.settings.entry_focus);
        controller
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn bounds(&self) -> CameraBounds {
        self.bounds
    }

    pub fn phase(&self) -> CameraPhase {
        self.phase
    }

    pub fn is_free(&self) -> bool {
        self.phase == CameraPhase::Free
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Entry flythrough progress in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Advance one tick. Returns true on the single tick that completes the entry.
    pub fn update(&mut self, input: &InputState) -> bool {
        match self.phase {
            CameraPhase::Entering => self.advance_entry(),
            CameraPhase::Free => {
                self.walk(input);
                false
            }
        }
    }

    /// Jump to the end of the flythrough.
    pub fn skip_entry(&mut self) {
        if self.phase == CameraPhase::Entering {
            self.progress = 1.0;
            self.position = self.settings.entry_target;
            self.face(self.settings.entry_focus);
            self.enter_free();
        }
    }

    /// Apply a drag of `(dx, dy)` pixels. Ignored until the camera is free.
    pub fn look_by(&mut self, dx: f32, dy: f32) {
        if !self.is_free() {
            return;
        }
        let k = self.settings.look_sensitivity;
        self.yaw -= dx * k;
        self.pitch = clamp_pitch(self.pitch - dy * k, self.settings.pitch_limit);
    }

    /// Unit view direction.
    pub fn look_direction(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
        .normalize_or(Vec3::NEG_Z)
    }

    /// The pose for this tick.
    pub fn camera(&self) -> Camera {
        Camera {
            position: self.position,
            forward: self.look_direction(),
            up: Vec3::Y,
            fov: self.settings.fov_degrees.to_radians(),
            near: self.settings.near,
            far: self.settings.far,
            aspect: self.aspect,
        }
    }

    fn advance_entry(&mut self) -> bool {
        self.progress = (self.progress + self.settings.entry_step).min(1.0);
        let eased = self.settings.entry_easing.apply(self.progress);
        self.position = self
            .settings
            .entry_start
            .lerp(self.settings.entry_target, eased);
        self.face(self.settings.entry_focus);

        if self.progress >= 1.0 {
            self.enter_free();
            true
        } else {
            false
        }
    }

    fn enter_free(&mut self) {
        self.phase = CameraPhase::Free;
        log::debug!("camera free at {:?}", self.position);
        log::info!("drag to look around, WASD or arrow keys to walk, click a frame for details");
    }

    fn walk(&mut self, input: &InputState) {
        let forward = Vec3::new(self.yaw.sin(), 0.0, -self.yaw.cos());
        let right = Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin());

        let direction: Vec3 = input
            .held_roles()
            .map(|role| match role {
                MovementRole::Forward => forward,
                MovementRole::Back => -forward,
                MovementRole::StrafeLeft => -right,
                MovementRole::StrafeRight => right,
            })
            .sum();

        if direction.length_squared() > 0.0 {
            self.position += direction.normalize() * self.settings.move_speed;
        }
        self.position = self.bounds.clamp(self.position);
    }

    /// Orient toward `target` (yaw/pitch derived from the direction).
    fn face(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or(Vec3::NEG_Z);
        self.yaw = dir.x.atan2(-dir.z);
        self.pitch = clamp_pitch(dir.y.asin(), self.settings.pitch_limit);
    }
}

/// Clamp into `(-limit, limit)`. Clamping an already clamped value is a no-op.
pub fn clamp_pitch(pitch: f32, limit: f32) -> f32 {
    let bound = (limit - PITCH_MARGIN).max(0.0);
    pitch.clamp(-bound, bound)
}
