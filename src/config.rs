//! Viewer and navigation settings.
//!
//! ```
//! use vitrine::{CameraSettings, ViewerConfig};
//!
//! let config = ViewerConfig::new()
//!     .title("Chapel")
//!     .size(1600, 900)
//!     .camera(CameraSettings::default().move_speed(0.15));
//! assert_eq!(config.camera.move_speed, 0.15);
//! ```

use glam::Vec3;
use std::f32::consts::PI;

use crate::easing::Easing;
use std::time::Duration;

/// Host-facing configuration of a [`Viewer`](crate::Viewer).
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// How long the intro fade runs before the gallery is built.
    pub entry_delay: Duration,
    pub camera: CameraSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Vitrine".to_string(),
            width: 1280,
            height: 720,
            entry_delay: Duration::from_millis(100),
            camera: CameraSettings::default(),
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn entry_delay(mut self, delay: Duration) -> Self {
        self.entry_delay = delay;
        self
    }

    pub fn camera(mut self, camera: CameraSettings) -> Self {
        self.camera = camera;
        self
    }
}

/// Minimum distance the FREE-phase camera keeps from each wall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallClearance {
    /// Left and right walls.
    pub side: f32,
    /// The wall at -Z.
    pub back: f32,
    /// The entrance wall at +Z.
    pub front: f32,
}

impl Default for WallClearance {
    fn default() -> Self {
        Self {
            side: 1.5,
            back: 2.0,
            front: 3.0,
        }
    }
}

/// Every constant of the two-phase camera.
///
/// Speeds and steps are per tick, not per second: one tick runs per display refresh.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub entry_start: Vec3,
    pub entry_target: Vec3,
    /// Point the camera keeps facing during the entry flythrough.
    pub entry_focus: Vec3,
    /// Progress added per tick while entering.
    pub entry_step: f32,
    /// Curve mapping entry progress onto the flight path.
    pub entry_easing: Easing,
    pub move_speed: f32,
    /// Radians of yaw/pitch per pixel of drag.
    pub look_sensitivity: f32,
    /// A release closer than this (on both axes) to its press is a click.
    pub click_threshold: f32,
    /// Pitch stays strictly inside `(-pitch_limit, pitch_limit)`.
    pub pitch_limit: f32,
    pub clearance: WallClearance,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 72.0,
            near: 0.1,
            far: 150.0,
            entry_start: Vec3::new(0.0, 1.7, 28.0),
            entry_target: Vec3::new(0.0, 1.7, 10.0),
            entry_focus: Vec3::new(0.0, 1.8, 0.0),
            entry_step: 0.005,
            entry_easing: Easing::EaseOutCubic,
            move_speed: 0.1,
            look_sensitivity: 0.003,
            click_threshold: 5.0,
            pitch_limit: PI / 2.2,
            clearance: WallClearance::default(),
        }
    }
}

impl CameraSettings {
    pub fn fov(mut self, degrees: f32) -> Self {
        self.fov_degrees = degrees;
        self
    }

    pub fn clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Flythrough from `start` to `target` while facing `focus`.
    pub fn entry_path(mut self, start: Vec3, target: Vec3, focus: Vec3) -> Self {
        self.entry_start = start;
        self.entry_target = target;
        self.entry_focus = focus;
        self
    }

    pub fn entry_step(mut self, step: f32) -> Self {
        self.entry_step = step;
        self
    }

    pub fn entry_easing(mut self, easing: Easing) -> Self {
        self.entry_easing = easing;
        self
    }

    pub fn move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    pub fn look_sensitivity(mut self, sensitivity: f32) -> Self {
        self.look_sensitivity = sensitivity;
        self
    }

    pub fn click_threshold(mut self, pixels: f32) -> Self {
        self.click_threshold = pixels;
        self
    }

    pub fn clearance(mut self, clearance: WallClearance) -> Self {
        self.clearance = clearance;
        self
    }
}
