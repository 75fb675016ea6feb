//! Construction of the gallery hall.
//!
//! [`build_gallery`] turns a validated [`GalleryLayout`] into a [`GalleryScene`]:
//! the node hierarchy, one pickable root per exhibit, the idle-motion table,
//! the light list and the atmosphere. Every dimension of the room furniture is
//! derived from [`GalleryDimensions`]; everything exhibit-specific comes from
//! the placement and its [`DesignVariant`].

use super::graph::{Node, SceneGraph};
use super::idle::{self, IdleKind, IdleMotion};
use super::layout::{DesignVariant, ExhibitPlacement, GalleryDimensions, GalleryLayout};
use super::lighting::{Fog, Light};
use crate::color::Color;
use crate::error::ConstructionError;
use crate::exhibits::ExhibitId;
use crate::geometry::Shape;
use crate::material::Material;
use crate::mesh::Transform;
use glam::{Vec2, Vec3};
use hecs::Entity;
use std::borrow::Cow;
use std::f32::consts::{FRAC_PI_2, PI};

const BACKGROUND: u32 = 0x080808;
const FOG_DENSITY: f32 = 0.015;
const GOLD: u32 = 0xc9a962;
const WARM_WHITE: u32 = 0xfff8f0;
const SOFT_WHITE: u32 = 0xfff5e6;

/// The constructed gallery, ready to be drawn and picked against.
pub struct GalleryScene {
    pub graph: SceneGraph,
    pub dimensions: GalleryDimensions,
    /// One entry per exhibit, in placement order. The entity carries the exhibit tag.
    pub exhibits: Vec<(ExhibitId, Entity)>,
    pub idle: Vec<IdleMotion>,
    pub lights: Vec<Light>,
    pub background: Color,
    pub fog: Fog,
}

impl GalleryScene {
    /// Roots of the exhibit subtrees, for the picking service.
    pub fn pickable_roots(&self) -> Vec<Entity> {
        self.exhibits.iter().map(|(_, root)| *root).collect()
    }

    pub fn exhibit_root(&self, id: &ExhibitId) -> Option<Entity> {
        self.exhibits
            .iter()
            .find(|(exhibit, _)| exhibit == id)
            .map(|(_, root)| *root)
    }

    /// Pose idle-animated nodes for `elapsed` seconds and refresh world matrices.
    pub fn animate(&mut self, elapsed: f32) {
        idle::apply(&mut self.graph, &self.idle, elapsed);
        self.graph.propagate_transforms();
    }
}

/// Validate `layout` and build the hall it describes.
pub fn build_gallery(layout: &GalleryLayout) -> Result<GalleryScene, ConstructionError> {
    layout.validate()?;

    let dims = layout.dimensions;
    let mut b = Builder::default();

    b.lights.push(Light::ambient(Color::WHITE, 0.1));
    b.lights.push(Light::Hemisphere {
        sky: Color::WHITE,
        ground: Color::hex(0x444444),
        intensity: 0.08,
    });

    b.structure(&dims);
    b.wall_lettering(Vec3::new(0.0, 5.5, -dims.half_length() + 0.1));

    let mut exhibits = Vec::with_capacity(layout.placements.len());
    for (index, placement) in layout.placements.iter().enumerate() {
        let root = b.framed_exhibit(placement);
        b.idle.push(IdleMotion {
            entity: root,
            kind: IdleKind::Frame,
            index,
            rest: placement.position,
        });

        let inward = if placement.position.x > 0.0 { -2.5 } else { 2.5 };
        b.lights.push(
            Light::spot(
                Vec3::new(placement.position.x + inward, 5.5, placement.position.z),
                placement.position,
                Color::hex(WARM_WHITE),
                3.0,
                PI / 7.0,
            )
            .penumbra(0.6),
        );
        exhibits.push((placement.id.clone(), root));
    }

    b.sculpture(Vec3::new(0.0, 0.0, 5.0));
    b.wall_logo(Vec3::new(0.0, 4.2, -dims.half_length() + 0.12));
    b.bench(Vec3::new(-3.5, 0.0, -8.0));
    b.bench(Vec3::new(3.5, 0.0, -8.0));
    b.entrance(&dims);

    b.graph.propagate_transforms();
    log::info!(
        "gallery built: {} nodes, {} exhibits, {} lights",
        b.graph.len(),
        exhibits.len(),
        b.lights.len()
    );

    Ok(GalleryScene {
        graph: b.graph,
        dimensions: dims,
        exhibits,
        idle: b.idle,
        lights: b.lights,
        background: Color::hex(BACKGROUND),
        fog: Fog {
            color: Color::hex(BACKGROUND),
            density: FOG_DENSITY,
        },
    })
}

fn gold(roughness: f32, metalness: f32, glow: f32) -> Material {
    Material::hex(GOLD)
        .roughness(roughness)
        .metalness(metalness)
        .emissive(Color::hex(0x4a3d28), glow)
}

fn glow(rgb: u32, intensity: f32) -> Material {
    Material::hex(rgb)
        .roughness(0.05)
        .emissive(Color::hex(rgb), intensity)
}

#[derive(Default)]
struct Builder {
    graph: SceneGraph,
    idle: Vec<IdleMotion>,
    lights: Vec<Light>,
}

impl Builder {
    fn root(&mut self, name: &'static str, position: Vec3) -> Entity {
        self.graph
            .spawn(Node::group(name).transform(Transform::from_position(position)))
    }

    fn group(&mut self, parent: Entity, name: &'static str, transform: Transform) -> Entity {
        self.graph
            .add_child(parent, Node::group(name).transform(transform))
    }

    fn mesh(
        &mut self,
        parent: Entity,
        name: impl Into<Cow<'static, str>>,
        shape: Shape,
        material: Material,
        transform: Transform,
    ) -> Entity {
        self.graph
            .add_child(parent, Node::mesh(name, shape, material).transform(transform))
    }

    /// Floor, ceiling grid, track lighting, walls and baseboards.
    fn structure(&mut self, dims: &GalleryDimensions) {
        let (length, width, height) = (dims.length, dims.width, dims.height);
        let (half_l, half_w) = (dims.half_length(), dims.half_width());
        let hall = self.root("hall", Vec3::ZERO);

        self.mesh(
            hall,
            "floor",
            Shape::plane(width + 4.0, length + 12.0),
            Material::hex(0x1a1a1a).roughness(0.2).metalness(0.05),
            Transform::new().rotation_x(-FRAC_PI_2),
        );
        self.mesh(
            hall,
            "ceiling",
            Shape::plane(width, length),
            Material::hex(0x0a0a0a).roughness(0.95),
            Transform::at(0.0, height, 0.0).rotation_x(FRAC_PI_2),
        );

        let grid = Material::hex(0x0f0f0f).roughness(0.7).metalness(0.3);
        let mut x = -half_w + 3.0;
        while x <= half_w - 3.0 {
            self.mesh(
                hall,
                format!("beam {x}"),
                Shape::cuboid(0.15, 0.2, length - 4.0),
                grid,
                Transform::at(x, height - 0.1, 0.0),
            );
            x += 6.0;
        }
        let mut z = -half_l + 5.0;
        while z < half_l - 3.0 {
            self.mesh(
                hall,
                format!("cross beam {z}"),
                Shape::cuboid(width - 2.0, 0.1, 0.15),
                grid,
                Transform::at(0.0, height - 0.15, z),
            );
            z += 8.0;
        }

        let track = Material::hex(0x1a1a1a).roughness(0.4).metalness(0.5);
        for side in [-1.0f32, 1.0] {
            let track_x = side * (half_w - 3.0);
            self.mesh(
                hall,
                "track",
                Shape::cuboid(0.1, 0.08, length - 8.0),
                track,
                Transform::at(track_x, height - 0.35, 0.0),
            );
            let mut z = -half_l + 8.0;
            while z < half_l - 5.0 {
                self.track_light(Vec3::new(track_x, height - 0.4, z), side);
                z += 6.0;
            }
        }
        self.mesh(
            hall,
            "center track",
            Shape::cuboid(0.1, 0.08, 12.0),
            track,
            Transform::at(0.0, height - 0.35, 5.0),
        );

        self.ceiling_spotlights(height);

        let wall = Material::hex(0xf8f8f6).roughness(0.92);
        self.mesh(
            hall,
            "back wall",
            Shape::plane(width, height),
            wall,
            Transform::at(0.0, height * 0.5, -half_l),
        );
        for side in [-1.0f32, 1.0] {
            self.mesh(
                hall,
                "front wall",
                Shape::plane(half_w - 2.5, height),
                wall,
                Transform::at(side * (width / 4.0 + 1.25), height * 0.5, half_l).rotation_y(PI),
            );
            self.mesh(
                hall,
                "side wall",
                Shape::plane(length, height),
                wall,
                Transform::at(side * half_w, height * 0.5, 0.0).rotation_y(-side * FRAC_PI_2),
            );
        }

        let baseboard = Material::hex(0x1a1a1a).roughness(0.6);
        for side in [-1.0f32, 1.0] {
            self.mesh(
                hall,
                "baseboard",
                Shape::cuboid(0.06, 0.18, length),
                baseboard,
                Transform::at(side * (half_w - 0.03), 0.09, 0.0),
            );
        }
        self.mesh(
            hall,
            "back baseboard",
            Shape::cuboid(width, 0.18, 0.06),
            baseboard,
            Transform::at(0.0, 0.09, -half_l + 0.03),
        );
    }

    /// A rail-mounted fixture angled towards the wall on `side` (-1 left, +1 right).
    fn track_light(&mut self, position: Vec3, side: f32) {
        let fixture = self.root("track light", position);
        let black = Material::hex(0x1a1a1a).roughness(0.4).metalness(0.5);
        let lens = glow(WARM_WHITE, 1.5);
        let tilt = side * 0.4;

        self.mesh(
            fixture,
            "mount",
            Shape::cuboid(0.15, 0.03, 0.15),
            black,
            Transform::new(),
        );
        self.mesh(
            fixture,
            "arm",
            Shape::cylinder(0.025, 0.025, 0.3, 8),
            black,
            Transform::at(0.0, -0.15, 0.0),
        );
        self.mesh(
            fixture,
            "housing",
            Shape::cylinder(0.1, 0.12, 0.2, 16),
            black,
            Transform::at(0.0, -0.4, 0.0).rotation_x(tilt),
        );
        self.mesh(
            fixture,
            "lens",
            Shape::cylinder(0.07, 0.09, 0.05, 16),
            lens,
            Transform::at(0.0, -0.52, 0.0).rotation_x(tilt),
        );
        self.mesh(
            fixture,
            "glow ring",
            Shape::torus(0.08, 0.02, 8, 24),
            lens,
            Transform::at(0.0, -0.53, 0.0).rotation_x(FRAC_PI_2 + tilt),
        );

        let source = position + Vec3::new(0.0, -0.55, 0.0);
        self.lights.push(
            Light::spot(
                source,
                position + Vec3::new(side * 5.0, -3.0, 0.0),
                Color::hex(WARM_WHITE),
                3.0,
                PI / 5.0,
            )
            .penumbra(0.6),
        );
    }

    fn ceiling_spotlights(&mut self, height: f32) {
        const SPOTS: [(f32, f32); 8] = [
            (0.0, -15.0),
            (0.0, -5.0),
            (0.0, 5.0),
            (0.0, 15.0),
            (-4.0, -10.0),
            (4.0, -10.0),
            (-4.0, 10.0),
            (4.0, 10.0),
        ];
        let housing = Material::hex(0x0f0f0f).roughness(0.5).metalness(0.4);
        let reflector = Material::hex(0x333333).roughness(0.2).metalness(0.8);
        let bulb = glow(SOFT_WHITE, 1.5);
        let halo = Material::hex(SOFT_WHITE)
            .emissive(Color::hex(SOFT_WHITE), 0.8)
            .opacity(0.7);

        for (x, z) in SPOTS {
            let fixture = self.root("ceiling spot", Vec3::new(x, height, z));
            self.mesh(
                fixture,
                "housing",
                Shape::cylinder(0.2, 0.25, 0.15, 16),
                housing,
                Transform::at(0.0, -0.08, 0.0),
            );
            self.mesh(
                fixture,
                "reflector",
                Shape::cylinder(0.12, 0.18, 0.12, 16),
                reflector,
                Transform::at(0.0, -0.12, 0.0),
            );
            self.mesh(
                fixture,
                "bulb",
                Shape::sphere(0.1, 16, 16),
                bulb,
                Transform::at(0.0, -0.15, 0.0),
            );
            self.mesh(
                fixture,
                "halo",
                Shape::ring(0.12, 0.22, 24),
                halo,
                Transform::at(0.0, -0.18, 0.0).rotation_x(FRAC_PI_2),
            );
            self.lights.push(Light::point(
                Vec3::new(x, height - 0.3, z),
                Color::hex(SOFT_WHITE),
                1.5,
                12.0,
            ));
        }
        self.lights.push(Light::point(
            Vec3::new(0.0, height - 1.0, 0.0),
            Color::hex(WARM_WHITE),
            0.4,
            30.0,
        ));
    }

    /// Gold bars standing in for the lettering on the back wall.
    fn wall_lettering(&mut self, position: Vec3) {
        let text = self.root("wall lettering", position);
        let material = gold(0.2, 0.65, 0.15);
        let bars = [
            ("inspired", Vec3::new(2.2, 0.12, 0.025), 0.15),
            ("by", Vec3::new(0.5, 0.08, 0.02), -0.05),
            ("god", Vec3::new(1.0, 0.1, 0.022), -0.25),
            ("rule above", Vec3::new(3.0, 0.008, 0.01), 0.4),
            ("rule below", Vec3::new(3.0, 0.008, 0.01), -0.45),
        ];
        for (name, size, y) in bars {
            self.mesh(
                text,
                name,
                Shape::Cuboid { size },
                material,
                Transform::at(0.0, y, 0.0),
            );
        }
        self.lights.push(Light::spot(
            position + Vec3::new(0.0, 1.5, 3.0),
            position,
            Color::hex(SOFT_WHITE),
            2.0,
            PI / 8.0,
        ));
    }

    /// A shadow-box frame holding a garment; returns the exhibit root.
    fn framed_exhibit(&mut self, placement: &ExhibitPlacement) -> Entity {
        let scale = placement.scale;
        let frame_w = 1.5 * scale;
        let frame_h = 2.0 * scale;
        let depth = 0.1;
        let thickness = 0.08;
        let inner_w = frame_w - thickness * 2.0;
        let inner_h = frame_h - thickness * 2.0;

        let root = self.graph.spawn(
            Node::group(Cow::Owned(format!("exhibit {}", placement.id)))
                .transform(
                    Transform::from_position(placement.position).rotation_y(placement.rotation_y),
                )
                .exhibit(placement.id.clone()),
        );

        // The shadow box sits behind the frame plane so it never covers the garment.
        self.mesh(
            root,
            "shadow box",
            Shape::cuboid(frame_w + 0.04, frame_h + 0.04, depth + 0.04),
            Material::hex(0x0a0a0a).roughness(0.15).metalness(0.4),
            Transform::at(0.0, 0.0, -(depth + 0.04) * 0.5),
        );
        self.mesh(
            root,
            "frame",
            Shape::outline(frame_w, frame_h, thickness, depth),
            Material::hex(0x1a1a1a).roughness(0.2).metalness(0.35),
            Transform::at(0.0, 0.0, 0.02),
        );
        self.mesh(
            root,
            "mat",
            Shape::cuboid(inner_w - 0.02, inner_h - 0.02, 0.03),
            Material::hex(0x141414).roughness(0.95),
            Transform::at(0.0, 0.0, 0.04),
        );
        self.mesh(
            root,
            "glass",
            Shape::plane(inner_w + 0.01, inner_h + 0.01),
            Material::new(Color::WHITE)
                .roughness(0.05)
                .metalness(0.1)
                .opacity(0.06),
            Transform::at(0.0, 0.0, depth + 0.02),
        );

        let garment = self.group(root, "garment", Transform::at(0.0, 0.0, 0.06));
        self.garment(garment, scale, placement.design);

        let tag = self.group(
            root,
            "tag",
            Transform::at(inner_w * 0.5 - 0.08, -inner_h * 0.5 + 0.06, depth + 0.025),
        );
        self.tag(tag, scale * 0.8);

        root
    }

    fn garment(&mut self, parent: Entity, s: f32, design: DesignVariant) {
        let cloth = Material::new(design.garment_color()).roughness(0.85);

        self.mesh(
            parent,
            "hood",
            Shape::dome(0.26 * s, 20, 10),
            cloth,
            Transform::at(0.0, 0.38 * s, 0.0).rotation_x(PI / 7.0),
        );
        self.mesh(
            parent,
            "hood opening",
            Shape::regular_polygon(0.18 * s, 20),
            Material::hex(0x0a0a0a),
            Transform::at(0.0, 0.32 * s, 0.12 * s).rotation_x(-PI / 5.0),
        );
        self.mesh(
            parent,
            "body",
            Shape::plane(0.65 * s, 0.95 * s),
            cloth,
            Transform::at(0.0, -0.15 * s, 0.0),
        );
        self.mesh(
            parent,
            "pocket",
            Shape::plane(0.4 * s, 0.18 * s),
            Material::hex(0x0f0f0f).roughness(0.9),
            Transform::at(0.0, -0.42 * s, 0.004),
        );
        for x in [-0.06 * s, 0.06 * s] {
            self.mesh(
                parent,
                "drawstring",
                Shape::cylinder(0.005 * s, 0.005 * s, 0.22 * s, 8),
                Material::hex(0x3a3a3a),
                Transform::at(x, 0.1 * s, 0.008),
            );
        }
        self.mesh(
            parent,
            "ribbing",
            Shape::plane(0.65 * s, 0.04 * s),
            Material::hex(0x151515),
            Transform::at(0.0, -0.6 * s, 0.003),
        );

        self.emblem(parent, s, design);
    }

    /// The printed mark; the only part of the garment whose shape depends on the design.
    fn emblem(&mut self, parent: Entity, s: f32, design: DesignVariant) {
        const Z: f32 = 0.006;
        let ink = match design {
            DesignVariant::Future => Material::new(design.accent_color())
                .roughness(0.25)
                .metalness(0.7),
            _ => Material::new(design.accent_color())
                .roughness(0.3)
                .metalness(0.5)
                .emissive(Color::hex(0x3d2f1a), 0.1),
        };

        match design {
            DesignVariant::Geometry | DesignVariant::LargeGeo => {
                let (logo_scale, y) = if design == DesignVariant::LargeGeo {
                    (0.12, 0.05)
                } else {
                    (0.08, 0.1)
                };
                let f = s * logo_scale * 10.0;
                let triangle = vec![
                    Vec2::new(0.0, 0.08 * f),
                    Vec2::new(-0.06 * f, -0.04 * f),
                    Vec2::new(0.06 * f, -0.04 * f),
                ];
                self.mesh(
                    parent,
                    "emblem triangle",
                    Shape::prism(triangle, 0.0),
                    ink,
                    Transform::at(-0.12 * s, y * s, Z),
                );
                self.mesh(
                    parent,
                    "emblem circle",
                    Shape::ring(0.03 * f, 0.045 * f, 24),
                    ink,
                    Transform::at(0.0, y * s, Z),
                );
                self.mesh(
                    parent,
                    "emblem square",
                    Shape::square_outline(0.08 * f, 0.05 * f, 0.0),
                    ink,
                    Transform::at(0.12 * s, y * s, Z),
                );
            }
            DesignVariant::Inspired => {
                self.mesh(
                    parent,
                    "emblem headline",
                    Shape::plane(0.4 * s, 0.025 * s),
                    ink,
                    Transform::at(0.0, 0.12 * s, Z),
                );
                self.mesh(
                    parent,
                    "emblem subline",
                    Shape::plane(0.25 * s, 0.015 * s),
                    ink,
                    Transform::at(0.0, 0.08 * s, Z),
                );
            }
            DesignVariant::IbgMark => {
                for i in [-1.0f32, 0.0, 1.0] {
                    self.mesh(
                        parent,
                        "emblem stroke",
                        Shape::plane(0.025 * s, 0.08 * s),
                        ink,
                        Transform::at(i * 0.05 * s, 0.1 * s, Z),
                    );
                }
                self.mesh(
                    parent,
                    "emblem bar",
                    Shape::plane(0.12 * s, 0.012 * s),
                    ink,
                    Transform::at(0.0, 0.14 * s, Z),
                );
            }
            DesignVariant::Collection => {
                self.mesh(
                    parent,
                    "emblem triangle",
                    Shape::regular_polygon(0.02 * s, 3),
                    ink,
                    Transform::at(-0.1 * s, 0.14 * s, Z).rotation_z(PI),
                );
                self.mesh(
                    parent,
                    "emblem circle",
                    Shape::ring(0.012 * s, 0.02 * s, 16),
                    ink,
                    Transform::at(0.0, 0.14 * s, Z),
                );
                self.mesh(
                    parent,
                    "emblem square",
                    Shape::plane(0.035 * s, 0.035 * s),
                    ink,
                    Transform::at(0.1 * s, 0.14 * s, Z),
                );
                self.mesh(
                    parent,
                    "emblem wordmark",
                    Shape::plane(0.32 * s, 0.018 * s),
                    ink,
                    Transform::at(0.0, 0.06 * s, Z),
                );
            }
            DesignVariant::Future => {
                self.mesh(
                    parent,
                    "emblem triangle",
                    Shape::regular_polygon(0.04 * s, 3),
                    ink,
                    Transform::at(-0.1 * s, 0.1 * s, Z).rotation_z(PI),
                );
                self.mesh(
                    parent,
                    "emblem circle",
                    Shape::ring(0.025 * s, 0.04 * s, 24),
                    ink,
                    Transform::at(0.0, 0.1 * s, Z),
                );
                self.mesh(
                    parent,
                    "emblem square",
                    Shape::square_outline(0.07 * s, 0.04 * s, 0.0),
                    ink,
                    Transform::at(0.1 * s, 0.1 * s, Z),
                );
            }
        }
    }

    /// Small triangle/circle/square maker's mark in a frame corner.
    fn tag(&mut self, parent: Entity, size: f32) {
        let material = Material::hex(GOLD).roughness(0.28).metalness(0.55);
        self.mesh(
            parent,
            "tag triangle",
            Shape::regular_polygon(0.04, 3),
            material,
            Transform::at(-0.12, 0.0, 0.0)
                .rotation_z(PI)
                .uniform_scale(size),
        );
        self.mesh(
            parent,
            "tag circle",
            Shape::ring(0.025, 0.04, 16),
            material,
            Transform::new().uniform_scale(size),
        );
        self.mesh(
            parent,
            "tag square",
            Shape::square_outline(0.07, 0.04, 0.0),
            material,
            Transform::at(0.12, 0.0, 0.0).uniform_scale(size),
        );
    }

    /// Three hollow shapes on pedestals; the shape groups bob while idle.
    fn sculpture(&mut self, position: Vec3) {
        let root = self.root("sculpture", position);
        let metal = gold(0.2, 0.7, 0.08);
        let black = Material::hex(0x0a0a0a).roughness(0.3).metalness(0.4);
        let tube = 0.07;
        let pedestal = Shape::cylinder(0.45, 0.5, 0.18, 24);

        self.mesh(
            root,
            "base",
            Shape::cuboid(6.0, 0.12, 1.8),
            black,
            Transform::at(0.0, 0.06, 0.0),
        );
        self.mesh(
            root,
            "base accent",
            Shape::cuboid(5.8, 0.02, 0.04),
            metal,
            Transform::at(0.0, 0.13, 0.85),
        );

        // Triangle: three tube edges with ball joints.
        let (tri_h, tri_w) = (1.4f32, 0.8f32);
        let triangle = self.group(root, "triangle", Transform::at(-2.0, tri_h * 0.5 + 0.35, 0.0));
        let slant = (tri_w * 0.5).hypot(tri_h);
        let lean = tri_h.atan2(tri_w * 0.5) - FRAC_PI_2;
        for (x, angle) in [(-tri_w / 4.0, lean), (tri_w / 4.0, -lean)] {
            self.mesh(
                triangle,
                "edge",
                Shape::cylinder(tube, tube, slant, 12),
                metal,
                Transform::at(x, 0.0, 0.0).rotation_z(angle),
            );
        }
        self.mesh(
            triangle,
            "edge",
            Shape::cylinder(tube, tube, tri_w, 12),
            metal,
            Transform::at(0.0, -tri_h * 0.5, 0.0).rotation_z(FRAC_PI_2),
        );
        for (x, y) in [
            (0.0, tri_h * 0.5),
            (-tri_w * 0.5, -tri_h * 0.5),
            (tri_w * 0.5, -tri_h * 0.5),
        ] {
            self.mesh(
                triangle,
                "joint",
                Shape::sphere(tube, 12, 12),
                metal,
                Transform::at(x, y, 0.0),
            );
        }
        self.mesh(
            triangle,
            "pedestal",
            pedestal.clone(),
            black,
            Transform::at(0.0, -tri_h * 0.5 - 0.15, 0.0),
        );

        let radius = 0.5;
        let circle = self.group(root, "circle", Transform::at(0.0, radius + 0.35, 0.0));
        self.mesh(
            circle,
            "ring",
            Shape::torus(radius, tube, 16, 48),
            metal,
            Transform::new(),
        );
        self.mesh(
            circle,
            "pedestal",
            pedestal.clone(),
            black,
            Transform::at(0.0, -radius - 0.15, 0.0),
        );

        let side = 1.0;
        let half = side * 0.5;
        let square = self.group(root, "square", Transform::at(2.0, half + 0.35, 0.0));
        let edge = Shape::cylinder(tube, tube, side, 12);
        for y in [half, -half] {
            self.mesh(
                square,
                "edge",
                edge.clone(),
                metal,
                Transform::at(0.0, y, 0.0).rotation_z(FRAC_PI_2),
            );
        }
        for x in [-half, half] {
            self.mesh(square, "edge", edge.clone(), metal, Transform::at(x, 0.0, 0.0));
        }
        for (x, y) in [(-half, half), (half, half), (-half, -half), (half, -half)] {
            self.mesh(
                square,
                "joint",
                Shape::sphere(tube, 12, 12),
                metal,
                Transform::at(x, y, 0.0),
            );
        }
        self.mesh(
            square,
            "pedestal",
            pedestal,
            black,
            Transform::at(0.0, -half - 0.15, 0.0),
        );

        // Raised children bob, phased by their sibling position.
        for (index, child) in self.graph.children(root).into_iter().enumerate() {
            let Some(rest) = self.graph.local_transform(child).map(|t| t.position) else {
                continue;
            };
            if rest.y > 0.5 {
                self.idle.push(IdleMotion {
                    entity: child,
                    kind: IdleKind::Sculpture,
                    index,
                    rest,
                });
            }
        }

        for x in [-2.0, 0.0, 2.0] {
            self.lights.push(Light::spot(
                position + Vec3::new(x, 5.0, 0.0),
                position + Vec3::new(x, 1.0, 0.0),
                Color::hex(WARM_WHITE),
                3.0,
                PI / 8.0,
            ));
        }
    }

    /// Triangle, torus and square outline on a dark backing, lit from above.
    fn wall_logo(&mut self, position: Vec3) {
        let logo = self.root("wall logo", position);
        let metal = gold(0.22, 0.6, 0.1);

        self.mesh(
            logo,
            "backing",
            Shape::plane(3.5, 1.4),
            Material::hex(0x0a0a0a).roughness(0.8),
            Transform::at(0.0, 0.0, -0.02),
        );
        let triangle = vec![
            Vec2::new(0.0, 0.45),
            Vec2::new(-0.35, -0.25),
            Vec2::new(0.35, -0.25),
        ];
        self.mesh(
            logo,
            "triangle",
            Shape::prism(triangle, 0.03),
            metal,
            Transform::at(-1.1, 0.0, 0.0),
        );
        self.mesh(
            logo,
            "circle",
            Shape::torus(0.28, 0.06, 14, 32),
            metal,
            Transform::at(0.0, 0.0, 0.015),
        );
        self.mesh(
            logo,
            "square",
            Shape::square_outline(0.68, 0.4, 0.03),
            metal,
            Transform::at(1.1, 0.0, 0.0),
        );

        self.lights.push(Light::spot(
            position + Vec3::new(0.0, 2.0, 3.0),
            position,
            Color::hex(SOFT_WHITE),
            2.0,
            PI / 6.0,
        ));
    }

    fn bench(&mut self, position: Vec3) {
        let bench = self.root("bench", position);
        self.mesh(
            bench,
            "seat",
            Shape::cuboid(2.4, 0.08, 0.55),
            Material::hex(0x1a1a1a).roughness(0.35).metalness(0.1),
            Transform::at(0.0, 0.44, 0.0),
        );
        let leg = Material::hex(0x2a2a2a).roughness(0.4).metalness(0.6);
        for x in [-1.0, 1.0] {
            self.mesh(
                bench,
                "leg",
                Shape::cuboid(0.04, 0.44, 0.45),
                leg,
                Transform::at(x, 0.22, 0.0),
            );
        }
    }

    /// The dark corridor the entry flythrough starts in.
    fn entrance(&mut self, dims: &GalleryDimensions) {
        let (hall_l, hall_w, hall_h) = (10.0f32, 5.0f32, 4.5f32);
        let z = dims.half_length() + hall_l * 0.5;
        let corridor = self.root("entrance", Vec3::new(0.0, 0.0, z));
        let surface = Material::hex(0x080808).roughness(0.9);
        let wall = Material::hex(0x121212).roughness(0.85);

        self.mesh(
            corridor,
            "floor",
            Shape::plane(hall_w, hall_l),
            surface,
            Transform::at(0.0, 0.01, 0.0).rotation_x(-FRAC_PI_2),
        );
        self.mesh(
            corridor,
            "ceiling",
            Shape::plane(hall_w, hall_l),
            surface,
            Transform::at(0.0, hall_h, 0.0).rotation_x(FRAC_PI_2),
        );
        for side in [-1.0f32, 1.0] {
            self.mesh(
                corridor,
                "wall",
                Shape::plane(hall_l, hall_h),
                wall,
                Transform::at(side * hall_w * 0.5, hall_h * 0.5, 0.0)
                    .rotation_y(-side * FRAC_PI_2),
            );
        }

        self.lights.push(Light::point(
            Vec3::new(0.0, 3.0, dims.half_length() + 4.0),
            Color::hex(SOFT_WHITE),
            0.3,
            6.0,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> GalleryScene {
        build_gallery(&GalleryLayout::default()).expect("default layout builds")
    }

    #[test]
    fn one_pickable_root_per_exhibit() {
        let scene = scene();
        let ids: Vec<&str> = scene.exhibits.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["relic1", "relic2", "relic3", "relic4", "relic5", "relic6"]);
        for (id, root) in &scene.exhibits {
            assert_eq!(scene.graph.exhibit_tag(*root).as_ref(), Some(id));
        }
    }

    #[test]
    fn only_exhibit_subtrees_resolve_to_an_exhibit() {
        let scene = scene();
        let mut inside = std::collections::HashSet::new();
        for (id, root) in &scene.exhibits {
            for node in scene.graph.subtree(*root) {
                assert_eq!(scene.graph.exhibit_of(node).as_ref(), Some(id));
                inside.insert(node);
            }
        }
        for &root in scene.graph.roots() {
            for node in scene.graph.subtree(root) {
                if !inside.contains(&node) {
                    assert_eq!(scene.graph.exhibit_of(node), None);
                }
            }
        }
    }

    #[test]
    fn construction_is_deterministic() {
        let a = scene();
        let b = scene();
        assert_eq!(a.graph.len(), b.graph.len());
        assert_eq!(a.lights, b.lights);
        let names = |s: &GalleryScene| {
            s.graph
                .roots()
                .iter()
                .flat_map(|&r| s.graph.subtree(r))
                .map(|e| s.graph.name(e))
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn invalid_layouts_never_build() {
        let mut layout = GalleryLayout::default();
        let dup = layout.placements[0].clone();
        layout.placements.push(dup);
        assert!(matches!(
            build_gallery(&layout),
            Err(ConstructionError::DuplicateExhibit(_))
        ));
    }

    #[test]
    fn idle_table_covers_sculpture_shapes_and_frames() {
        let scene = scene();
        let sculpture = scene
            .idle
            .iter()
            .filter(|m| m.kind == IdleKind::Sculpture)
            .map(|m| m.index)
            .collect::<Vec<_>>();
        assert_eq!(sculpture, vec![2, 3, 4]);
        assert_eq!(
            scene.idle.iter().filter(|m| m.kind == IdleKind::Frame).count(),
            6
        );
    }

    #[test]
    fn animate_bobs_frames_around_their_hang_height() {
        let mut scene = scene();
        let root = scene.exhibits[0].1;
        scene.animate(1.25);
        let y = scene
            .graph
            .global_transform(root)
            .unwrap()
            .transform_point3(Vec3::ZERO)
            .y;
        assert!((y - 2.6).abs() <= 0.005 + 1e-6);
    }
}
