use glam::{Mat4, Vec3};

/// A perspective camera pose.
///
/// Produced every tick by [`CameraController::camera`](crate::CameraController::camera)
/// and consumed by the renderer and the picking service.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport width / height.
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 72f32.to_radians(),
            near: 0.1,
            far: 150.0,
            aspect: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn looking_at(mut self, target: Vec3) -> Self {
        self.forward = (target - self.position).normalize_or(Vec3::NEG_Z);
        self
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Right vector from forward and up.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_at_points_forward_at_target() {
        let cam = Camera::new()
            .at(Vec3::new(0.0, 1.7, 10.0))
            .looking_at(Vec3::new(0.0, 1.7, 0.0));
        assert!((cam.forward - Vec3::NEG_Z).length() < 1e-6);
        assert!((cam.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn view_projection_centers_the_look_target() {
        let target = Vec3::new(0.0, 1.8, 0.0);
        let cam = Camera::new()
            .at(Vec3::new(0.0, 1.7, 28.0))
            .looking_at(target)
            .with_aspect(16.0 / 9.0);
        let clip = cam.view_projection().project_point3(target);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
    }
}
