//! The gallery scene: node hierarchy, layout, construction and idle motion.
//!
//! - [`SceneGraph`] — hecs-backed node arena with parent/child links
//! - [`GalleryLayout`] — hall dimensions plus exhibit placements, validated up front
//! - [`build_gallery`] — builds a [`GalleryScene`] from a layout
//! - [`IdleMotion`] — stateless bobbing of sculpture shapes and frames
//!
//! # Example
//!
//! ```
//! use vitrine::scene::{GalleryLayout, build_gallery};
//!
//! let scene = build_gallery(&GalleryLayout::default()).unwrap();
//! let relic = scene.exhibit_root(&"relic2".into()).unwrap();
//! assert_eq!(scene.graph.exhibit_of(relic), Some("relic2".into()));
//! ```

mod builder;
mod graph;
mod idle;
mod layout;
mod lighting;

pub use builder::{GalleryScene, build_gallery};
pub use graph::{
    Ancestors, Children, ExhibitTag, GlobalTransform, Name, Node, Parent, SceneGraph, Visual,
};
pub use idle::{IdleKind, IdleMotion, frame_offset, sculpture_offset};
pub use layout::{DesignVariant, ExhibitPlacement, GalleryDimensions, GalleryLayout};
pub use lighting::{Fog, Light};
