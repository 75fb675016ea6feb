//! Fixed inputs of the scene builder: room dimensions and exhibit placements.

use crate::color::Color;
use crate::error::ConstructionError;
use crate::exhibits::ExhibitId;
use glam::Vec3;
use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;

/// Interior size of the gallery hall, centered on the origin with the floor at `y = 0`.
///
/// `length` runs along Z, `width` along X.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GalleryDimensions {
    pub length: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for GalleryDimensions {
    fn default() -> Self {
        Self {
            length: 50.0,
            width: 18.0,
            height: 7.0,
        }
    }
}

impl GalleryDimensions {
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    pub fn half_length(&self) -> f32 {
        self.length * 0.5
    }

    /// True if `point` lies inside the hall (walls included).
    pub fn contains(&self, point: Vec3) -> bool {
        point.x.abs() <= self.half_width()
            && point.z.abs() <= self.half_length()
            && (0.0..=self.height).contains(&point.y)
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        let valid = [self.length, self.width, self.height]
            .iter()
            .all(|d| d.is_finite() && *d > 0.0);
        if valid {
            Ok(())
        } else {
            Err(ConstructionError::InvalidDimensions {
                length: self.length,
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Visual treatment of a framed garment.
///
/// Everything variant-specific (garment color, emblem) is a function of this value only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DesignVariant {
    /// Triangle, circle and square in gold.
    Geometry,
    /// Lettering across the chest.
    Inspired,
    /// Oversized geometry mark.
    LargeGeo,
    /// Lettermark alone.
    IbgMark,
    /// Full wordmark.
    Collection,
    /// Geometry in silver.
    Future,
}

impl DesignVariant {
    pub const ALL: [DesignVariant; 6] = [
        DesignVariant::Geometry,
        DesignVariant::Inspired,
        DesignVariant::LargeGeo,
        DesignVariant::IbgMark,
        DesignVariant::Collection,
        DesignVariant::Future,
    ];

    pub fn garment_color(self) -> Color {
        match self {
            DesignVariant::Geometry => Color::hex(0x1a1a1a),
            DesignVariant::Inspired => Color::hex(0x2a2a2a),
            DesignVariant::LargeGeo => Color::hex(0x0f0f0f),
            DesignVariant::IbgMark => Color::hex(0x252525),
            DesignVariant::Collection => Color::hex(0x1f1f1f),
            DesignVariant::Future => Color::hex(0x2d2d2d),
        }
    }

    /// Color of the emblem printed on the garment.
    pub fn accent_color(self) -> Color {
        match self {
            DesignVariant::Future => Color::hex(0xc0c0c0),
            _ => Color::hex(0xc9a962),
        }
    }
}

/// Where and how one exhibit hangs.
#[derive(Clone, Debug, PartialEq)]
pub struct ExhibitPlacement {
    pub id: ExhibitId,
    pub position: Vec3,
    /// Rotation about +Y in radians; the frame front faces local +Z.
    pub rotation_y: f32,
    pub scale: f32,
    pub design: DesignVariant,
}

impl ExhibitPlacement {
    pub fn new(id: impl Into<ExhibitId>, position: Vec3, design: DesignVariant) -> Self {
        Self {
            id: id.into(),
            position,
            rotation_y: 0.0,
            scale: 1.0,
            design,
        }
    }

    pub fn rotation_y(mut self, angle: f32) -> Self {
        self.rotation_y = angle;
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Complete input of [`build_gallery`](crate::scene::build_gallery).
#[derive(Clone, Debug, PartialEq)]
pub struct GalleryLayout {
    pub dimensions: GalleryDimensions,
    pub placements: Vec<ExhibitPlacement>,
}

impl Default for GalleryLayout {
    /// The six-relic hang: three frames on each long wall.
    fn default() -> Self {
        let dimensions = GalleryDimensions::default();
        let left = -dimensions.half_width() + 0.12;
        let right = dimensions.half_width() - 0.12;
        let hang = |id: &'static str, x: f32, z: f32, rot: f32, scale: f32, design| {
            ExhibitPlacement::new(id, Vec3::new(x, 2.6, z), design)
                .rotation_y(rot)
                .scale(scale)
        };

        Self {
            dimensions,
            placements: vec![
                hang("relic1", left, -12.0, FRAC_PI_2, 1.15, DesignVariant::Geometry),
                hang("relic2", left, 2.0, FRAC_PI_2, 1.3, DesignVariant::Inspired),
                hang("relic3", left, 14.0, FRAC_PI_2, 1.1, DesignVariant::LargeGeo),
                hang("relic4", right, -12.0, -FRAC_PI_2, 1.0, DesignVariant::IbgMark),
                hang("relic5", right, 2.0, -FRAC_PI_2, 1.35, DesignVariant::Collection),
                hang("relic6", right, 14.0, -FRAC_PI_2, 1.1, DesignVariant::Future),
            ],
        }
    }
}

impl GalleryLayout {
    pub fn new(dimensions: GalleryDimensions) -> Self {
        Self {
            dimensions,
            placements: Vec::new(),
        }
    }

    pub fn place(mut self, placement: ExhibitPlacement) -> Self {
        self.placements.push(placement);
        self
    }

    /// Fail fast on layouts the builder must not construct.
    pub fn validate(&self) -> Result<(), ConstructionError> {
        self.dimensions.validate()?;

        let mut seen = HashSet::new();
        for placement in &self.placements {
            if !seen.insert(&placement.id) {
                return Err(ConstructionError::DuplicateExhibit(placement.id.clone()));
            }
            if !self.dimensions.contains(placement.position) {
                return Err(ConstructionError::OutOfBounds {
                    id: placement.id.clone(),
                    position: placement.position,
                });
            }
            if !(placement.scale.is_finite() && placement.scale > 0.0) {
                return Err(ConstructionError::InvalidScale {
                    id: placement.id.clone(),
                    scale: placement.scale,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_valid() {
        let layout = GalleryLayout::default();
        assert_eq!(layout.placements.len(), 6);
        assert_eq!(layout.validate(), Ok(()));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let layout = GalleryLayout::new(GalleryDimensions::default())
            .place(ExhibitPlacement::new("a", Vec3::new(0.0, 2.0, 0.0), DesignVariant::Geometry))
            .place(ExhibitPlacement::new("a", Vec3::new(1.0, 2.0, 0.0), DesignVariant::Future));
        assert_eq!(
            layout.validate(),
            Err(ConstructionError::DuplicateExhibit("a".into()))
        );
    }

    #[test]
    fn placements_outside_the_hall_are_rejected() {
        let outside = Vec3::new(9.5, 2.6, 0.0);
        let layout = GalleryLayout::new(GalleryDimensions::default())
            .place(ExhibitPlacement::new("far", outside, DesignVariant::IbgMark));
        assert_eq!(
            layout.validate(),
            Err(ConstructionError::OutOfBounds {
                id: "far".into(),
                position: outside,
            })
        );
    }

    #[test]
    fn zero_scale_and_flat_rooms_are_rejected() {
        let layout = GalleryLayout::new(GalleryDimensions::default()).place(
            ExhibitPlacement::new("tiny", Vec3::new(0.0, 2.0, 0.0), DesignVariant::Inspired)
                .scale(0.0),
        );
        assert!(matches!(
            layout.validate(),
            Err(ConstructionError::InvalidScale { .. })
        ));

        let flat = GalleryLayout::new(GalleryDimensions {
            height: 0.0,
            ..Default::default()
        });
        assert!(matches!(
            flat.validate(),
            Err(ConstructionError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn garment_color_depends_on_variant_only() {
        let colors: HashSet<_> = DesignVariant::ALL
            .iter()
            .map(|d| d.garment_color().to_array().map(f32::to_bits))
            .collect();
        assert_eq!(colors.len(), DesignVariant::ALL.len());
    }
}
