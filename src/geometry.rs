//! Primitive shapes, their node-space bounds, and CPU tessellation.
//!
//! A [`Shape`] is the geometry reference carried by a scene node. It is plain
//! data: the picking service reads its bounds, and the GPU backend tessellates
//! it into [`RawGeometry`] once when the scene is uploaded.
//!
//! Orientation conventions follow the usual right-handed, Y-up layout:
//! flat shapes ([`Shape::Plane`], [`Shape::Ring`], flat [`Shape::Prism`]s and
//! [`Shape::Outline`]s) lie in the XY plane facing +Z, cylinders stand along
//! +Y, and the torus lies in the XY plane.

use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Geometry of a single scene node, in node space.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Box centered at the origin.
    Cuboid { size: Vec3 },
    /// Rectangle in the XY plane, centered at the origin.
    Plane { width: f32, height: f32 },
    /// Convex polygon in the XY plane, extruded from `z = 0` to `z = depth`.
    /// A zero depth yields a flat polygon.
    Prism { points: Vec<Vec2>, depth: f32 },
    /// Flat annulus in the XY plane.
    Ring { inner: f32, outer: f32, segments: u32 },
    /// Rectangle with a rectangular hole, extruded from `z = 0` to `z = depth`.
    Outline {
        width: f32,
        height: f32,
        border: f32,
        depth: f32,
    },
    /// Truncated cone along Y, centered at the origin.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    },
    Sphere { radius: f32, segments: u32, rings: u32 },
    /// Upper half of a sphere (the flat side faces -Y).
    Dome { radius: f32, segments: u32, rings: u32 },
    /// Torus in the XY plane.
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

impl Shape {
    pub fn cuboid(x: f32, y: f32, z: f32) -> Self {
        Self::Cuboid {
            size: Vec3::new(x, y, z),
        }
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Self::Plane { width, height }
    }

    /// Flat regular polygon with `sides` corners on a circle of `radius`.
    ///
    /// The first corner sits on +X, like a circle tessellated with few segments.
    pub fn regular_polygon(radius: f32, sides: u32) -> Self {
        let sides = sides.max(3);
        let points = (0..sides)
            .map(|i| {
                let theta = TAU * i as f32 / sides as f32;
                Vec2::new(radius * theta.cos(), radius * theta.sin())
            })
            .collect();
        Self::Prism { points, depth: 0.0 }
    }

    /// Convex polygon extruded along +Z.
    pub fn prism(points: Vec<Vec2>, depth: f32) -> Self {
        Self::Prism { points, depth }
    }

    pub fn ring(inner: f32, outer: f32, segments: u32) -> Self {
        Self::Ring {
            inner,
            outer,
            segments,
        }
    }

    /// Square of side `outer` with a centered square hole of side `inner`.
    pub fn square_outline(outer: f32, inner: f32, depth: f32) -> Self {
        Self::Outline {
            width: outer,
            height: outer,
            border: (outer - inner) * 0.5,
            depth,
        }
    }

    pub fn outline(width: f32, height: f32, border: f32, depth: f32) -> Self {
        Self::Outline {
            width,
            height,
            border,
            depth,
        }
    }

    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Self {
        Self::Cylinder {
            radius_top,
            radius_bottom,
            height,
            segments,
        }
    }

    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        Self::Sphere {
            radius,
            segments,
            rings,
        }
    }

    pub fn dome(radius: f32, segments: u32, rings: u32) -> Self {
        Self::Dome {
            radius,
            segments,
            rings,
        }
    }

    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        Self::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        }
    }

    /// True for shapes with no thickness along their local Z axis.
    pub fn is_flat(&self) -> bool {
        match self {
            Shape::Plane { .. } | Shape::Ring { .. } => true,
            Shape::Prism { depth, .. } | Shape::Outline { depth, .. } => *depth <= 0.0,
            _ => false,
        }
    }

    /// Node-space bounding box.
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Shape::Cuboid { size } => Aabb::centered(*size * 0.5),
            Shape::Plane { width, height } => {
                Aabb::centered(Vec3::new(width * 0.5, height * 0.5, 0.0))
            }
            Shape::Prism { points, depth } => {
                let mut min = Vec3::new(f32::INFINITY, f32::INFINITY, 0.0);
                let mut max = Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, depth.max(0.0));
                for p in points {
                    min = min.min(p.extend(0.0));
                    max = max.max(p.extend(0.0));
                }
                Aabb::new(min, max)
            }
            Shape::Ring { outer, .. } => Aabb::centered(Vec3::new(*outer, *outer, 0.0)),
            Shape::Outline {
                width,
                height,
                depth,
                ..
            } => Aabb::new(
                Vec3::new(-width * 0.5, -height * 0.5, 0.0),
                Vec3::new(width * 0.5, height * 0.5, depth.max(0.0)),
            ),
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
                ..
            } => {
                let r = radius_top.max(*radius_bottom);
                Aabb::centered(Vec3::new(r, height * 0.5, r))
            }
            Shape::Sphere { radius, .. } => Aabb::centered(Vec3::splat(*radius)),
            Shape::Dome { radius, .. } => Aabb::new(
                Vec3::new(-radius, 0.0, -radius),
                Vec3::new(*radius, *radius, *radius),
            ),
            Shape::Torus { radius, tube, .. } => {
                let reach = radius + tube;
                Aabb::centered(Vec3::new(reach, reach, *tube))
            }
        }
    }

    /// True if a point on the `z = 0` plane lies inside this flat shape's outline.
    ///
    /// Only meaningful for shapes where [`Shape::is_flat`] holds; volumetric
    /// shapes answer with their bounding rectangle.
    pub fn contains_planar(&self, p: Vec2) -> bool {
        match self {
            Shape::Plane { width, height } => {
                p.x.abs() <= width * 0.5 && p.y.abs() <= height * 0.5
            }
            Shape::Ring { inner, outer, .. } => {
                let d = p.length();
                d >= *inner && d <= *outer
            }
            Shape::Prism { points, .. } => convex_contains(points, p),
            Shape::Outline {
                width,
                height,
                border,
                ..
            } => {
                let (hw, hh) = (width * 0.5, height * 0.5);
                let inside_outer = p.x.abs() <= hw && p.y.abs() <= hh;
                let inside_hole = p.x.abs() < hw - border && p.y.abs() < hh - border;
                inside_outer && !inside_hole
            }
            _ => {
                let b = self.local_bounds();
                p.x >= b.min.x && p.x <= b.max.x && p.y >= b.min.y && p.y <= b.max.y
            }
        }
    }

    /// Tessellate into triangles.
    pub fn tessellate(&self) -> RawGeometry {
        match self {
            Shape::Cuboid { size } => cuboid(*size),
            Shape::Plane { width, height } => plane(*width, *height),
            Shape::Prism { points, depth } => prism(points, *depth),
            Shape::Ring {
                inner,
                outer,
                segments,
            } => ring(*inner, *outer, *segments),
            Shape::Outline {
                width,
                height,
                border,
                depth,
            } => outline(*width, *height, *border, *depth),
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments,
            } => cylinder(*radius_top, *radius_bottom, *height, *segments),
            Shape::Sphere {
                radius,
                segments,
                rings,
            } => sphere(*radius, *segments, *rings, PI),
            Shape::Dome {
                radius,
                segments,
                rings,
            } => sphere(*radius, *segments, *rings, PI * 0.5),
            Shape::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => torus(*radius, *tube, *radial_segments, *tubular_segments),
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box spanning `-half_extents..half_extents`.
    pub fn centered(half_extents: Vec3) -> Self {
        Self {
            min: -half_extents,
            max: half_extents,
        }
    }
}

/// Raw geometry data before GPU upload.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    pub vertices: Vec<Vertex3d>,
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Returns `(min, max)` corners of the vertex bounding box.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a quad (two CCW triangles) with a shared flat normal.
    fn quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let base = self.vertices.len() as u32;
        let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        for (corner, uv) in corners.iter().zip(uvs) {
            self.vertices
                .push(Vertex3d::new(corner.to_array(), normal.to_array(), uv));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    /// Append a triangle fan over a convex outline at height `z`.
    fn fan(&mut self, points: &[Vec2], z: f32, normal: Vec3) {
        let base = self.vertices.len() as u32;
        for p in points {
            self.vertices.push(Vertex3d::new(
                [p.x, p.y, z],
                normal.to_array(),
                [p.x * 0.5 + 0.5, p.y * 0.5 + 0.5],
            ));
        }
        let flip = normal.z < 0.0;
        for i in 1..points.len().saturating_sub(1) as u32 {
            if flip {
                self.indices.extend_from_slice(&[base, base + i + 1, base + i]);
            } else {
                self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
            }
        }
    }

    /// Uploads this geometry to the GPU as a [`Mesh`].
    pub fn upload(&self, gpu: &GpuContext) -> Mesh {
        Mesh::new(gpu, &self.vertices, &self.indices)
    }
}

fn convex_contains(points: &[Vec2], p: Vec2) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        let cross = (b - *a).perp_dot(p - *a);
        if cross.abs() <= f32::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

fn cuboid(size: Vec3) -> RawGeometry {
    let h = size * 0.5;
    let mut g = RawGeometry::default();
    // +Z, -Z, +Y, -Y, +X, -X
    g.quad(
        [
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ],
        Vec3::Z,
    );
    g.quad(
        [
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
        ],
        Vec3::NEG_Z,
    );
    g.quad(
        [
            Vec3::new(-h.x, h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
        ],
        Vec3::Y,
    );
    g.quad(
        [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(-h.x, -h.y, h.z),
        ],
        Vec3::NEG_Y,
    );
    g.quad(
        [
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(h.x, h.y, h.z),
        ],
        Vec3::X,
    );
    g.quad(
        [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, -h.z),
        ],
        Vec3::NEG_X,
    );
    g
}

fn plane(width: f32, height: f32) -> RawGeometry {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let mut g = RawGeometry::default();
    g.quad(
        [
            Vec3::new(-hw, -hh, 0.0),
            Vec3::new(hw, -hh, 0.0),
            Vec3::new(hw, hh, 0.0),
            Vec3::new(-hw, hh, 0.0),
        ],
        Vec3::Z,
    );
    g
}

fn prism(points: &[Vec2], depth: f32) -> RawGeometry {
    let mut g = RawGeometry::default();
    if points.len() < 3 {
        return g;
    }
    // Keep the outline counter-clockwise so fans face +Z.
    let mut outline = points.to_vec();
    let area: f32 = outline
        .iter()
        .enumerate()
        .map(|(i, a)| a.perp_dot(outline[(i + 1) % outline.len()]))
        .sum();
    if area < 0.0 {
        outline.reverse();
    }

    if depth <= 0.0 {
        g.fan(&outline, 0.0, Vec3::Z);
        return g;
    }

    g.fan(&outline, depth, Vec3::Z);
    g.fan(&outline, 0.0, Vec3::NEG_Z);
    for (i, a) in outline.iter().enumerate() {
        let b = outline[(i + 1) % outline.len()];
        let edge = b - *a;
        let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero();
        g.quad(
            [
                a.extend(0.0),
                b.extend(0.0),
                b.extend(depth),
                a.extend(depth),
            ],
            normal,
        );
    }
    g
}

fn ring(inner: f32, outer: f32, segments: u32) -> RawGeometry {
    let segments = segments.max(3);
    let mut g = RawGeometry::default();
    for i in 0..segments {
        let t0 = TAU * i as f32 / segments as f32;
        let t1 = TAU * (i + 1) as f32 / segments as f32;
        let (d0, d1) = (Vec3::new(t0.cos(), t0.sin(), 0.0), Vec3::new(t1.cos(), t1.sin(), 0.0));
        g.quad([d0 * inner, d0 * outer, d1 * outer, d1 * inner], Vec3::Z);
    }
    g
}

fn outline(width: f32, height: f32, border: f32, depth: f32) -> RawGeometry {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let (iw, ih) = ((hw - border).max(0.0), (hh - border).max(0.0));
    let mut g = RawGeometry::default();

    // Four border strips as rectangles (x0, y0, x1, y1).
    let strips = [
        (-hw, ih, hw, hh),
        (-hw, -hh, hw, -ih),
        (-hw, -ih, -iw, ih),
        (iw, -ih, hw, ih),
    ];
    let faces: &[(f32, Vec3)] = if depth > 0.0 {
        &[(0.0, Vec3::NEG_Z), (1.0, Vec3::Z)]
    } else {
        &[(1.0, Vec3::Z)]
    };
    for &(x0, y0, x1, y1) in &strips {
        for &(side, normal) in faces {
            let z = depth.max(0.0) * side;
            let corners = [
                Vec3::new(x0, y0, z),
                Vec3::new(x1, y0, z),
                Vec3::new(x1, y1, z),
                Vec3::new(x0, y1, z),
            ];
            if normal.z < 0.0 {
                g.quad([corners[1], corners[0], corners[3], corners[2]], normal);
            } else {
                g.quad(corners, normal);
            }
        }
    }

    if depth > 0.0 {
        // Outer walls face outwards, hole walls face inwards.
        for (half_w, half_h, sign) in [(hw, hh, 1.0f32), (iw, ih, -1.0f32)] {
            let c = [
                Vec2::new(-half_w, -half_h),
                Vec2::new(half_w, -half_h),
                Vec2::new(half_w, half_h),
                Vec2::new(-half_w, half_h),
            ];
            for i in 0..4 {
                let (a, b) = (c[i], c[(i + 1) % 4]);
                let edge = b - a;
                let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero() * sign;
                g.quad(
                    [a.extend(0.0), b.extend(0.0), b.extend(depth), a.extend(depth)],
                    normal,
                );
            }
        }
    }
    g
}

fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> RawGeometry {
    let segments = segments.max(3);
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height.max(f32::EPSILON);
    let mut g = RawGeometry::default();

    for i in 0..segments {
        let t0 = TAU * i as f32 / segments as f32;
        let t1 = TAU * (i + 1) as f32 / segments as f32;
        let (s0, c0, s1, c1) = (t0.sin(), t0.cos(), t1.sin(), t1.cos());
        let mid = (t0 + t1) * 0.5;
        let normal = Vec3::new(mid.sin(), slope, mid.cos()).normalize_or_zero();
        g.quad(
            [
                Vec3::new(radius_bottom * s0, -half, radius_bottom * c0),
                Vec3::new(radius_bottom * s1, -half, radius_bottom * c1),
                Vec3::new(radius_top * s1, half, radius_top * c1),
                Vec3::new(radius_top * s0, half, radius_top * c0),
            ],
            normal,
        );
    }

    // Caps: fans in the XZ plane, built in XY then rotated into place.
    for (radius, y, normal) in [(radius_top, half, Vec3::Y), (radius_bottom, -half, Vec3::NEG_Y)] {
        if radius <= 0.0 {
            continue;
        }
        let base = g.vertices.len() as u32;
        g.vertices
            .push(Vertex3d::new([0.0, y, 0.0], normal.to_array(), [0.5, 0.5]));
        for i in 0..segments {
            let t = TAU * i as f32 / segments as f32;
            g.vertices.push(Vertex3d::new(
                [radius * t.sin(), y, radius * t.cos()],
                normal.to_array(),
                [t.sin() * 0.5 + 0.5, t.cos() * 0.5 + 0.5],
            ));
        }
        for i in 0..segments {
            let a = base + 1 + i;
            let b = base + 1 + (i + 1) % segments;
            if normal.y > 0.0 {
                g.indices.extend_from_slice(&[base, a, b]);
            } else {
                g.indices.extend_from_slice(&[base, b, a]);
            }
        }
    }
    g
}

/// UV sphere down to polar angle `theta_max` (PI for a full sphere, PI/2 for a dome).
fn sphere(radius: f32, segments: u32, rings: u32, theta_max: f32) -> RawGeometry {
    let (segments, rings) = (segments.max(3), rings.max(2));
    let mut g = RawGeometry::default();

    for ring in 0..=rings {
        let phi = theta_max * ring as f32 / rings as f32;
        let y = phi.cos();
        let ring_radius = phi.sin();

        for seg in 0..=segments {
            let theta = TAU * seg as f32 / segments as f32;
            let x = ring_radius * theta.cos();
            let z = ring_radius * theta.sin();

            g.vertices.push(Vertex3d::new(
                [x * radius, y * radius, z * radius],
                [x, y, z],
                [seg as f32 / segments as f32, ring as f32 / rings as f32],
            ));
        }
    }

    for ring in 0..rings {
        for seg in 0..segments {
            let current = ring * (segments + 1) + seg;
            let next = current + segments + 1;

            g.indices.extend_from_slice(&[current, current + 1, next]);
            g.indices.extend_from_slice(&[current + 1, next + 1, next]);
        }
    }
    g
}

fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> RawGeometry {
    let (radial, tubular) = (radial_segments.max(3), tubular_segments.max(3));
    let mut g = RawGeometry::default();

    for j in 0..=radial {
        let v = TAU * j as f32 / radial as f32;
        for i in 0..=tubular {
            let u = TAU * i as f32 / tubular as f32;
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let normal = (position - center).normalize_or_zero();
            g.vertices.push(Vertex3d::new(
                position.to_array(),
                normal.to_array(),
                [i as f32 / tubular as f32, j as f32 / radial as f32],
            ));
        }
    }

    for j in 1..=radial {
        for i in 1..=tubular {
            let a = (tubular + 1) * j + i - 1;
            let b = (tubular + 1) * (j - 1) + i - 1;
            let c = (tubular + 1) * (j - 1) + i;
            let d = (tubular + 1) * j + i;
            g.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_within(geom: &RawGeometry, bounds: Aabb) {
        let (min, max) = geom.bounds();
        let slack = Vec3::splat(1e-4);
        assert!(
            min.cmpge(bounds.min - slack).all() && max.cmple(bounds.max + slack).all(),
            "tessellation {min:?}..{max:?} escapes bounds {bounds:?}"
        );
    }

    #[test]
    fn tessellation_stays_inside_local_bounds() {
        let shapes = [
            Shape::cuboid(1.0, 2.0, 3.0),
            Shape::plane(4.0, 2.0),
            Shape::regular_polygon(0.5, 3),
            Shape::ring(0.2, 0.4, 16),
            Shape::square_outline(0.68, 0.4, 0.03),
            Shape::cylinder(0.1, 0.12, 0.2, 16),
            Shape::sphere(0.25, 12, 8),
            Shape::dome(0.26, 20, 10),
            Shape::torus(0.55, 0.06, 16, 48),
        ];
        for shape in &shapes {
            let geom = shape.tessellate();
            assert!(geom.triangle_count() > 0, "{shape:?} produced no triangles");
            assert_within(&geom, shape.local_bounds());
        }
    }

    #[test]
    fn indices_reference_existing_vertices() {
        let geom = Shape::torus(0.28, 0.06, 14, 32).tessellate();
        let count = geom.vertices.len() as u32;
        assert!(geom.indices.iter().all(|&i| i < count));
        assert_eq!(geom.indices.len() % 3, 0);
    }

    #[test]
    fn flat_shapes_report_zero_depth_bounds() {
        for shape in [
            Shape::plane(1.0, 1.0),
            Shape::ring(0.1, 0.2, 8),
            Shape::regular_polygon(0.04, 3),
        ] {
            assert!(shape.is_flat());
            let b = shape.local_bounds();
            assert_eq!(b.min.z, 0.0);
            assert_eq!(b.max.z, 0.0);
        }
        assert!(!Shape::cuboid(1.0, 1.0, 1.0).is_flat());
    }

    #[test]
    fn ring_contains_only_the_band() {
        let ring = Shape::ring(0.2, 0.4, 24);
        assert!(!ring.contains_planar(Vec2::ZERO));
        assert!(ring.contains_planar(Vec2::new(0.3, 0.0)));
        assert!(!ring.contains_planar(Vec2::new(0.5, 0.0)));
    }

    #[test]
    fn outline_excludes_the_hole() {
        let frame = Shape::outline(1.5, 2.0, 0.08, 0.0);
        assert!(!frame.contains_planar(Vec2::ZERO));
        assert!(frame.contains_planar(Vec2::new(0.72, 0.0)));
        assert!(!frame.contains_planar(Vec2::new(0.8, 0.0)));
    }

    #[test]
    fn triangle_contains_its_centroid() {
        let tri = Shape::regular_polygon(0.5, 3);
        assert!(tri.contains_planar(Vec2::ZERO));
        assert!(!tri.contains_planar(Vec2::new(-0.4, 0.4)));
    }

    #[test]
    fn prism_winding_is_normalized() {
        let clockwise = vec![Vec2::new(0.0, 0.45), Vec2::new(0.35, -0.25), Vec2::new(-0.35, -0.25)];
        let geom = Shape::prism(clockwise, 0.0).tessellate();
        let [a, b, c] = [0, 1, 2].map(|i| Vec3::from(geom.vertices[geom.indices[i] as usize].position));
        assert!((b - a).cross(c - a).z > 0.0);
    }
}
