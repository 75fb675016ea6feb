//! Screen-space picking against the scene hierarchy.
//!
//! - [`Ray`] — A 3D ray with origin and direction for raycasting
//! - [`RayHit`] — The nearest node a ray hits
//! - [`pick`] — Maps a pointer position to the exhibit under it
//!
//! Rays are tested in each node's local space, so rotated and scaled nodes are
//! handled without world-space bounding volumes. Flat shapes and spheres are
//! tested exactly; other volumes use their local bounding box.

use glam::{Mat4, Vec2, Vec3};
use hecs::Entity;

use crate::camera::Camera;
use crate::exhibits::ExhibitId;
use crate::geometry::Shape;
use crate::scene::SceneGraph;

/// A ray in 3D space, used for raycasting and picking.
///
/// ```
/// use vitrine::{Ray, Vec3};
///
/// let ray = Ray::new(Vec3::new(0.0, 1.7, 10.0), Vec3::new(0.0, 0.0, -4.0));
/// assert_eq!(ray.point_at(2.0), Vec3::new(0.0, 1.7, 8.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length for rays built with [`Ray::new`]; local-space rays keep
    /// the world parameterisation instead.
    pub direction: Vec3,
}

impl Ray {
    /// The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from the eye through a pixel.
    ///
    /// `screen` is in pixels with the origin at the top-left corner.
    pub fn from_screen(screen: Vec2, viewport: Vec2, view_projection: Mat4) -> Self {
        let ndc_x = (2.0 * screen.x / viewport.x) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen.y / viewport.y);

        let inv_view_proj = view_projection.inverse();
        let near_point = inv_view_proj.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far_point = inv_view_proj.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));

        Self::new(near_point, far_point - near_point)
    }

    /// Ray through a pixel of `camera`'s image.
    pub fn from_camera(screen: Vec2, viewport: Vec2, camera: &Camera) -> Self {
        Self::from_screen(screen, viewport, camera.view_projection())
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The same ray expressed in the space `world_to_local` maps into.
    ///
    /// The direction is not renormalized, so `t` values stay comparable with the
    /// original ray.
    pub fn transformed(&self, world_to_local: &Mat4) -> Self {
        Self {
            origin: world_to_local.transform_point3(self.origin),
            direction: world_to_local.transform_vector3(self.direction),
        }
    }

    /// Slab test. Returns the nearest non-negative `t`, if any.
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for i in 0..3 {
            let origin = self.origin[i];
            let dir = self.direction[i];

            if dir.abs() < f32::EPSILON {
                if origin < min[i] || origin > max[i] {
                    return None;
                }
            } else {
                let inv_dir = 1.0 / dir;
                let mut t1 = (min[i] - origin) * inv_dir;
                let mut t2 = (max[i] - origin) * inv_dir;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max {
                    return None;
                }
            }
        }

        if t_min > 0.0 {
            Some(t_min)
        } else if t_max > 0.0 {
            Some(t_max)
        } else {
            None
        }
    }

    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let a = self.direction.dot(self.direction);
        let b = 2.0 * oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 || a <= 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = (-b - sqrt_disc) / (2.0 * a);
        let t2 = (-b + sqrt_disc) / (2.0 * a);

        if t1 > 0.0 {
            Some(t1)
        } else if t2 > 0.0 {
            Some(t2)
        } else {
            None
        }
    }

    /// Crossing of the `z = 0` plane in front of the origin.
    pub fn intersect_xy_plane(&self) -> Option<f32> {
        if self.direction.z.abs() < f32::EPSILON {
            return None;
        }
        let t = -self.origin.z / self.direction.z;
        (t > 0.0).then_some(t)
    }

    /// Test a node-space shape against this (node-space) ray.
    pub fn intersect_shape(&self, shape: &Shape) -> Option<f32> {
        if shape.is_flat() {
            let t = self.intersect_xy_plane()?;
            let p = self.point_at(t);
            return shape.contains_planar(Vec2::new(p.x, p.y)).then_some(t);
        }
        match shape {
            Shape::Sphere { radius, .. } => self.intersect_sphere(Vec3::ZERO, *radius),
            _ => {
                let bounds = shape.local_bounds();
                self.intersect_aabb(bounds.min, bounds.max)
            }
        }
    }
}

/// The nearest node a ray hits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub point: Vec3,
}

/// Cast `ray` (world space, unit direction) against every drawable node in the
/// subtrees under `roots` and return the nearest hit.
pub fn raycast(graph: &SceneGraph, roots: &[Entity], ray: &Ray) -> Option<RayHit> {
    let mut nearest: Option<RayHit> = None;

    for &root in roots {
        for entity in graph.subtree(root) {
            let Some(visual) = graph.visual(entity) else {
                continue;
            };
            let Some(global) = graph.global_transform(entity) else {
                continue;
            };
            if global.determinant().abs() < f32::EPSILON {
                continue;
            }

            let local_ray = ray.transformed(&global.inverse());
            let Some(distance) = local_ray.intersect_shape(&visual.shape) else {
                continue;
            };

            if nearest.is_none_or(|hit| distance < hit.distance) {
                nearest = Some(RayHit {
                    entity,
                    distance,
                    point: ray.point_at(distance),
                });
            }
        }
    }

    nearest
}

/// Resolve the pixel `screen` to the exhibit visibly under it.
///
/// Pure query: casts a ray from `camera`, takes the nearest hit among the
/// subtrees of `pickable_roots` and walks up to the tagged exhibit root.
/// Returns `None` for empty space.
pub fn pick(
    graph: &SceneGraph,
    pickable_roots: &[Entity],
    camera: &Camera,
    screen: Vec2,
    viewport: Vec2,
) -> Option<ExhibitId> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    let ray = Ray::from_camera(screen, viewport, camera);
    let hit = raycast(graph, pickable_roots, &ray)?;
    let id = graph.exhibit_of(hit.entity);
    log::debug!(
        "pick at {screen:?} hit {:?} ({}) at {:.2} -> {id:?}",
        hit.entity,
        graph.name(hit.entity).unwrap_or_default(),
        hit.distance
    );
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::material::Material;
    use crate::mesh::Transform;
    use crate::scene::{GalleryLayout, Node, build_gallery};

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);
    const CENTER: Vec2 = Vec2::new(400.0, 300.0);

    fn camera(from: Vec3, to: Vec3) -> Camera {
        Camera::new()
            .at(from)
            .looking_at(to)
            .with_aspect(VIEWPORT.x / VIEWPORT.y)
    }

    #[test]
    fn center_pixel_ray_follows_the_view_direction() {
        let cam = camera(Vec3::new(0.0, 1.7, 10.0), Vec3::new(0.0, 1.7, 0.0));
        let ray = Ray::from_camera(CENTER, VIEWPORT, &cam);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
        assert!((ray.origin - cam.position).length() < 0.2);
    }

    #[test]
    fn aabb_and_sphere_report_nearest_entry() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(ray.intersect_aabb(Vec3::splat(-1.0), Vec3::splat(1.0)), Some(4.0));
        assert_eq!(ray.intersect_sphere(Vec3::ZERO, 1.0), Some(4.0));
        assert_eq!(ray.intersect_sphere(Vec3::new(3.0, 0.0, 0.0), 1.0), None);
    }

    #[test]
    fn ring_hole_lets_the_ray_through() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z);
        assert_eq!(ray.intersect_shape(&Shape::ring(0.2, 0.4, 24)), None);
        let offset = Ray::new(Vec3::new(0.3, 0.0, 1.0), Vec3::NEG_Z);
        assert_eq!(offset.intersect_shape(&Shape::ring(0.2, 0.4, 24)), Some(1.0));
    }

    #[test]
    fn any_descendant_resolves_to_its_exhibit() {
        let mut graph = SceneGraph::new();
        let white = Material::new(Color::WHITE);
        let frame = graph.spawn(Node::group("frame").at(0.0, 0.0, -5.0).exhibit("relic1".into()));
        let inner = graph.add_child(frame, Node::group("garment").at(0.0, 0.0, 0.5));
        graph.add_child(
            inner,
            Node::mesh("emblem", Shape::plane(0.2, 0.2), white).transform(Transform::new()),
        );
        let wall = graph.spawn(Node::mesh("wall", Shape::plane(20.0, 20.0), white).at(0.0, 0.0, -6.0));
        graph.propagate_transforms();

        let cam = camera(Vec3::ZERO, Vec3::NEG_Z);
        let roots = [frame];
        assert_eq!(pick(&graph, &roots, &cam, CENTER, VIEWPORT), Some("relic1".into()));

        // The wall is hit by the off-center ray but is not pickable.
        let edge = Vec2::new(50.0, 300.0);
        assert_eq!(pick(&graph, &roots, &cam, edge, VIEWPORT), None);
        assert!(raycast(&graph, &[wall], &Ray::from_camera(edge, VIEWPORT, &cam)).is_some());
    }

    #[test]
    fn nearest_hit_wins() {
        let mut graph = SceneGraph::new();
        let white = Material::new(Color::WHITE);
        let far = graph.spawn(
            Node::mesh("far", Shape::cuboid(1.0, 1.0, 1.0), white)
                .at(0.0, 0.0, -8.0)
                .exhibit("far".into()),
        );
        let near = graph.spawn(
            Node::mesh("near", Shape::sphere(0.5, 8, 8), white)
                .at(0.0, 0.0, -3.0)
                .exhibit("near".into()),
        );
        graph.propagate_transforms();

        let cam = camera(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(
            pick(&graph, &[far, near], &cam, CENTER, VIEWPORT),
            Some("near".into())
        );
    }

    #[test]
    fn gallery_frames_are_pickable_and_walls_are_not() {
        let scene = build_gallery(&GalleryLayout::default()).unwrap();
        let roots = scene.pickable_roots();

        // Facing relic2 on the left wall.
        let cam = camera(Vec3::new(0.0, 2.6, 2.0), Vec3::new(-9.0, 2.6, 2.0));
        assert_eq!(
            pick(&scene.graph, &roots, &cam, CENTER, VIEWPORT),
            Some("relic2".into())
        );

        // Facing bare wall between relic1 and relic2.
        let cam = camera(Vec3::new(0.0, 2.6, -5.0), Vec3::new(-9.0, 2.6, -5.0));
        assert_eq!(pick(&scene.graph, &roots, &cam, CENTER, VIEWPORT), None);

        // Straight down the hall at the back wall.
        let cam = camera(Vec3::new(0.0, 1.7, 10.0), Vec3::new(0.0, 1.7, -25.0));
        assert_eq!(pick(&scene.graph, &roots, &cam, CENTER, VIEWPORT), None);
    }
}
