//! Error types surfaced by scene construction, teardown and the viewer lifecycle.

use crate::exhibits::ExhibitId;
use glam::Vec3;
use thiserror::Error;

/// A gallery layout that cannot be built.
///
/// Fatal to viewer activation: the viewer stays in (or returns to) intro.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    #[error("exhibit `{0}` is placed more than once")]
    DuplicateExhibit(ExhibitId),

    #[error("exhibit `{id}` at {position} lies outside the gallery bounds")]
    OutOfBounds { id: ExhibitId, position: Vec3 },

    #[error("gallery dimensions must be positive, got {length} x {width} x {height}")]
    InvalidDimensions { length: f32, width: f32, height: f32 },

    #[error("exhibit `{id}` has non-positive scale {scale}")]
    InvalidScale { id: ExhibitId, scale: f32 },
}

/// A per-viewer resource that failed to release.
///
/// Logged and otherwise ignored; the viewer still returns to intro.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeardownError {
    #[error("input listener {0} was not attached")]
    ListenerNotAttached(u64),

    #[error("render backend release failed: {0}")]
    BackendRelease(String),
}

/// Errors the host sees from [`Viewer`](crate::Viewer) operations.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("gallery construction failed: {0}")]
    Construction(#[from] ConstructionError),

    #[error("render backend unavailable: {0}")]
    Backend(String),

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_error_converts_into_viewer_error() {
        let err: ViewerError = ConstructionError::DuplicateExhibit(ExhibitId::new("relic1")).into();
        assert!(matches!(err, ViewerError::Construction(_)));
        assert_eq!(
            err.to_string(),
            "gallery construction failed: exhibit `relic1` is placed more than once"
        );
    }
}
