//! Light sources and atmosphere recorded by the scene builder.

use crate::color::Color;
use glam::Vec3;

/// One light in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    /// Sky/ground gradient by surface normal.
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
    Point {
        position: Vec3,
        color: Color,
        intensity: f32,
        /// Zero means unlimited reach.
        range: f32,
    },
    Spot {
        position: Vec3,
        target: Vec3,
        color: Color,
        intensity: f32,
        /// Half-angle of the cone in radians.
        angle: f32,
        /// Fraction of the cone that fades out, in `0..=1`.
        penumbra: f32,
        range: f32,
    },
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self::Ambient { color, intensity }
    }

    pub fn point(position: Vec3, color: Color, intensity: f32, range: f32) -> Self {
        Self::Point {
            position,
            color,
            intensity,
            range,
        }
    }

    /// Spot light with a default soft edge and a 14 unit reach.
    pub fn spot(position: Vec3, target: Vec3, color: Color, intensity: f32, angle: f32) -> Self {
        Self::Spot {
            position,
            target,
            color,
            intensity,
            angle,
            penumbra: 0.5,
            range: 14.0,
        }
    }

    /// Override the penumbra of a spot light. Other lights are returned unchanged.
    pub fn penumbra(mut self, value: f32) -> Self {
        if let Self::Spot { penumbra, .. } = &mut self {
            *penumbra = value;
        }
        self
    }

    /// Override the reach of a point or spot light.
    pub fn range(mut self, value: f32) -> Self {
        match &mut self {
            Self::Spot { range, .. } | Self::Point { range, .. } => *range = value,
            _ => {}
        }
        self
    }
}

/// Exponential-squared distance fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub density: f32,
}

impl Fog {
    /// Fraction of the surface color that survives at `distance`.
    pub fn visibility(&self, distance: f32) -> f32 {
        let d = self.density * distance;
        (-d * d).exp().clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fog_fades_with_distance() {
        let fog = Fog {
            color: Color::hex(0x080808),
            density: 0.015,
        };
        assert_eq!(fog.visibility(0.0), 1.0);
        assert!(fog.visibility(10.0) > fog.visibility(40.0));
        assert!(fog.visibility(1000.0) < 1e-3);
    }
}
