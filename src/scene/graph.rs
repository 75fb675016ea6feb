//! The scene node hierarchy.
//!
//! Nodes live in a [`hecs::World`] arena. Ownership flows downwards: a node's
//! [`Children`] list is the authoritative, ordered set of nodes it owns, and
//! the whole arena is cleared at once on teardown. [`Parent`] is a read-only
//! back-link used for upward traversal (picking resolves a hit to its tagged
//! exhibit that way) and is never used to keep a node alive.

use crate::exhibits::ExhibitId;
use crate::geometry::Shape;
use crate::material::Material;
use crate::mesh::Transform;
use glam::{Mat4, Vec3};
use hecs::{Entity, World};
use std::borrow::Cow;

/// Back-link to the owning node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Ordered child list. Present (possibly empty) on every node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Children(pub Vec<Entity>);

/// Node-to-world matrix, refreshed by [`SceneGraph::propagate_transforms`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalTransform(pub Mat4);

impl Default for GlobalTransform {
    fn default() -> Self {
        Self(Mat4::IDENTITY)
    }
}

/// Marks the root of an exhibit's subtree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExhibitTag(pub ExhibitId);

/// Debug label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Name(pub Cow<'static, str>);

/// Drawable content of a node. Group nodes have none.
#[derive(Clone, Debug, PartialEq)]
pub struct Visual {
    pub shape: Shape,
    pub material: Material,
}

/// Everything needed to spawn one node.
#[derive(Clone, Debug)]
pub struct Node {
    pub name: Cow<'static, str>,
    pub transform: Transform,
    pub visual: Option<Visual>,
    pub exhibit: Option<ExhibitId>,
}

impl Node {
    /// An empty grouping node.
    pub fn group(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visual: None,
            exhibit: None,
        }
    }

    pub fn mesh(name: impl Into<Cow<'static, str>>, shape: Shape, material: Material) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visual: Some(Visual { shape, material }),
            exhibit: None,
        }
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Mark this node as the root of an exhibit subtree.
    pub fn exhibit(mut self, id: ExhibitId) -> Self {
        self.exhibit = Some(id);
        self
    }

    /// Set only the translation.
    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = Vec3::new(x, y, z);
        self
    }
}

/// Arena-backed node hierarchy.
#[derive(Default)]
pub struct SceneGraph {
    world: World,
    roots: Vec<Entity>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a top-level node.
    pub fn spawn(&mut self, node: Node) -> Entity {
        let entity = self.spawn_detached(node);
        self.roots.push(entity);
        entity
    }

    /// Spawn `node` as the last child of `parent`.
    ///
    /// If `parent` no longer exists the node becomes a root instead.
    pub fn add_child(&mut self, parent: Entity, node: Node) -> Entity {
        let entity = self.spawn_detached(node);
        let attached = match self.world.get::<&mut Children>(parent) {
            Ok(mut children) => {
                children.0.push(entity);
                true
            }
            Err(_) => false,
        };

        if attached {
            // Cannot fail: `entity` was spawned above.
            let _ = self.world.insert_one(entity, Parent(parent));
        } else {
            log::warn!("parent {parent:?} is gone; spawning {entity:?} as a root");
            self.roots.push(entity);
        }
        entity
    }

    fn spawn_detached(&mut self, node: Node) -> Entity {
        let global = GlobalTransform(node.transform.matrix());
        let entity = self.world.spawn((
            Name(node.name),
            node.transform,
            global,
            Children::default(),
        ));
        if let Some(visual) = node.visual {
            let _ = self.world.insert_one(entity, visual);
        }
        if let Some(id) = node.exhibit {
            let _ = self.world.insert_one(entity, ExhibitTag(id));
        }
        entity
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    pub fn roots(&self) -> &[Entity] {
        &self.roots
    }

    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.world.get::<&Parent>(entity).ok().map(|p| p.0)
    }

    pub fn children(&self, entity: Entity) -> Vec<Entity> {
        self.world
            .get::<&Children>(entity)
            .map(|c| c.0.clone())
            .unwrap_or_default()
    }

    pub fn name(&self, entity: Entity) -> Option<String> {
        self.world
            .get::<&Name>(entity)
            .ok()
            .map(|n| n.0.to_string())
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self, entity: Entity) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self.parent(entity),
        }
    }

    /// `entity` and every node below it, in depth-first pre-order.
    pub fn subtree(&self, entity: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        if !self.contains(entity) {
            return out;
        }
        let mut stack = vec![entity];
        while let Some(current) = stack.pop() {
            out.push(current);
            let children = self.children(current);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Exhibit id carried by `entity` itself.
    pub fn exhibit_tag(&self, entity: Entity) -> Option<ExhibitId> {
        self.world
            .get::<&ExhibitTag>(entity)
            .ok()
            .map(|t| t.0.clone())
    }

    /// Walk upward from `entity` (inclusive) to the nearest tagged node.
    pub fn exhibit_of(&self, entity: Entity) -> Option<ExhibitId> {
        std::iter::once(entity)
            .chain(self.ancestors(entity))
            .find_map(|e| self.exhibit_tag(e))
    }

    pub fn local_transform(&self, entity: Entity) -> Option<Transform> {
        self.world.get::<&Transform>(entity).ok().map(|t| *t)
    }

    /// Move a node relative to its parent. Takes effect on the next propagation.
    pub fn set_translation(&mut self, entity: Entity, position: Vec3) {
        if let Ok(mut transform) = self.world.get::<&mut Transform>(entity) {
            transform.position = position;
        }
    }

    pub fn global_transform(&self, entity: Entity) -> Option<Mat4> {
        self.world.get::<&GlobalTransform>(entity).ok().map(|g| g.0)
    }

    pub fn visual(&self, entity: Entity) -> Option<hecs::Ref<'_, Visual>> {
        self.world.get::<&Visual>(entity).ok()
    }

    /// Visit every drawable node with its world matrix.
    pub fn for_each_visual(&self, mut f: impl FnMut(Entity, &Visual, &Mat4)) {
        for (entity, (visual, global)) in self.world.query::<(&Visual, &GlobalTransform)>().iter() {
            f(entity, visual, &global.0);
        }
    }

    /// Recompute every [`GlobalTransform`] from the roots down.
    pub fn propagate_transforms(&mut self) {
        let mut stack: Vec<(Entity, Mat4)> =
            self.roots.iter().rev().map(|&e| (e, Mat4::IDENTITY)).collect();

        while let Some((entity, parent_matrix)) = stack.pop() {
            let local = match self.world.get::<&Transform>(entity) {
                Ok(t) => t.matrix(),
                Err(_) => continue,
            };
            let global = parent_matrix * local;
            if let Ok(mut g) = self.world.get::<&mut GlobalTransform>(entity) {
                g.0 = global;
            }
            for child in self.children(entity).into_iter().rev() {
                stack.push((child, global));
            }
        }
    }

    /// Despawn everything.
    pub fn clear(&mut self) {
        self.world.clear();
        self.roots.clear();
    }
}

/// Iterator returned by [`SceneGraph::ancestors`].
pub struct Ancestors<'a> {
    graph: &'a SceneGraph,
    next: Option<Entity>,
}

impl Iterator for Ancestors<'_> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let current = self.next?;
        self.next = self.graph.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn cube(name: &'static str) -> Node {
        Node::mesh(name, Shape::cuboid(1.0, 1.0, 1.0), Material::new(Color::WHITE))
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut graph = SceneGraph::new();
        let root = graph.spawn(Node::group("root"));
        let a = graph.add_child(root, cube("a"));
        let b = graph.add_child(root, cube("b"));
        let c = graph.add_child(root, cube("c"));
        assert_eq!(graph.children(root), vec![a, b, c]);
        assert_eq!(graph.parent(b), Some(root));
        assert_eq!(graph.roots(), &[root]);
    }

    #[test]
    fn exhibit_of_walks_up_to_the_tagged_root() {
        let mut graph = SceneGraph::new();
        let hall = graph.spawn(Node::group("hall"));
        let frame = graph.add_child(hall, Node::group("frame").exhibit("relic2".into()));
        let garment = graph.add_child(frame, Node::group("garment"));
        let emblem = graph.add_child(garment, cube("emblem"));

        assert_eq!(graph.exhibit_of(emblem), Some("relic2".into()));
        assert_eq!(graph.exhibit_of(frame), Some("relic2".into()));
        assert_eq!(graph.exhibit_of(hall), None);
        assert_eq!(graph.ancestors(emblem).collect::<Vec<_>>(), vec![garment, frame, hall]);
    }

    #[test]
    fn propagation_composes_parent_then_child() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn(
            Node::group("parent")
                .transform(Transform::at(1.0, 0.0, 0.0).rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        let child = graph.add_child(parent, cube("child").at(0.0, 0.0, 1.0));
        graph.propagate_transforms();

        let world = graph
            .global_transform(child)
            .unwrap()
            .transform_point3(Vec3::ZERO);
        assert!((world - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);

        graph.set_translation(parent, Vec3::new(0.0, 3.0, 0.0));
        graph.propagate_transforms();
        let moved = graph
            .global_transform(child)
            .unwrap()
            .transform_point3(Vec3::ZERO);
        assert!((moved - Vec3::new(1.0, 3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn child_of_a_cleared_parent_becomes_a_root() {
        let mut graph = SceneGraph::new();
        let stale = graph.spawn(Node::group("hall"));
        graph.add_child(stale, cube("wall"));
        graph.clear();
        assert!(graph.is_empty());
        assert!(!graph.contains(stale));

        let orphan = graph.add_child(stale, cube("bench"));
        assert_eq!(graph.roots(), &[orphan]);
        assert_eq!(graph.parent(orphan), None);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn subtree_is_depth_first_preorder() {
        let mut graph = SceneGraph::new();
        let root = graph.spawn(Node::group("root"));
        let a = graph.add_child(root, Node::group("a"));
        let a1 = graph.add_child(a, cube("a1"));
        let b = graph.add_child(root, cube("b"));
        assert_eq!(graph.subtree(root), vec![root, a, a1, b]);
    }
}
