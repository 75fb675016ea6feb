//! Decorative idle motion.
//!
//! Offsets are pure functions of elapsed seconds and a node index. Nothing here
//! reads camera, input or picking state, and applying the motion twice for the
//! same instant yields the same transforms.

use super::graph::SceneGraph;
use glam::Vec3;
use hecs::Entity;

/// Which bobbing curve a node follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleKind {
    /// Centerpiece shape groups: faster, larger.
    Sculpture,
    /// Exhibit frames: slow, barely visible.
    Frame,
}

/// A node that bobs vertically around its rest position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdleMotion {
    pub entity: Entity,
    pub kind: IdleKind,
    /// Phase index; sibling position for sculpture parts, hang order for frames.
    pub index: usize,
    /// Local translation at rest.
    pub rest: Vec3,
}

impl IdleMotion {
    pub fn vertical_offset(&self, elapsed: f32) -> f32 {
        match self.kind {
            IdleKind::Sculpture => sculpture_offset(elapsed, self.index),
            IdleKind::Frame => frame_offset(elapsed, self.index),
        }
    }

    pub fn translation_at(&self, elapsed: f32) -> Vec3 {
        self.rest + Vec3::Y * self.vertical_offset(elapsed)
    }
}

pub fn sculpture_offset(elapsed: f32, index: usize) -> f32 {
    (elapsed + index as f32).sin() * 0.01
}

pub fn frame_offset(elapsed: f32, index: usize) -> f32 {
    (elapsed * 0.5 + index as f32 * 0.8).sin() * 0.005
}

/// Write each node's idle translation for `elapsed` into the graph.
pub fn apply(graph: &mut SceneGraph, motions: &[IdleMotion], elapsed: f32) {
    for motion in motions {
        graph.set_translation(motion.entity, motion.translation_at(elapsed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::graph::Node;

    #[test]
    fn offsets_stay_small() {
        for step in 0..200 {
            let t = step as f32 * 0.37;
            for i in 0..6 {
                assert!(sculpture_offset(t, i).abs() <= 0.01);
                assert!(frame_offset(t, i).abs() <= 0.005);
            }
        }
    }

    #[test]
    fn applying_is_a_function_of_time_only() {
        let mut graph = SceneGraph::new();
        let frame = graph.spawn(Node::group("frame").at(-8.88, 2.6, 2.0));
        let motion = IdleMotion {
            entity: frame,
            kind: IdleKind::Frame,
            index: 1,
            rest: Vec3::new(-8.88, 2.6, 2.0),
        };

        apply(&mut graph, &[motion], 3.0);
        let first = graph.local_transform(frame).unwrap().position;
        apply(&mut graph, &[motion], 7.5);
        apply(&mut graph, &[motion], 3.0);
        let again = graph.local_transform(frame).unwrap().position;

        assert_eq!(first, again);
        assert!((first.y - (2.6 + frame_offset(3.0, 1))).abs() < 1e-6);
        assert_eq!(first.x, -8.88);
    }
}
