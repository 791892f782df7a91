//! Bounding volume measurement for unknown-scale models
//!
//! Models arrive with arbitrary units, origins and pivots. Everything
//! downstream (ground placement, camera framing) is derived from one
//! axis-aligned box measured over the whole node hierarchy. The measured size
//! is always finite and positive: empty or broken geometry falls back to
//! [`FALLBACK_SIZE`] so framing never divides by zero or produces NaN.

use bevy_math::{Affine3A, Vec3};
use thiserror::Error;

/// Size substituted when the measured extent is unusable
pub const FALLBACK_SIZE: f32 = 2.0;

/// Gap between the model's lowest point and the ground plane
pub const GROUND_CLEARANCE: f32 = 0.05;

/// Internal, non-fatal: the measured extent cannot be used for framing
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DegenerateGeometryError {
    #[error("bounding volume size is not finite ({0})")]
    NonFinite(f32),
    #[error("bounding volume size is not positive ({0})")]
    NonPositive(f32),
}

/// Axis-aligned bounds of a model plus the derived size metric and center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolume {
    pub min: Vec3,
    pub max: Vec3,
    /// Length of the extent vector, or [`FALLBACK_SIZE`]
    pub size: f32,
    /// Midpoint of the box with non-finite components replaced by 0
    pub center: Vec3,
    /// Whether the fallback size was substituted
    pub degenerate: bool,
}

impl BoundingVolume {
    /// Build a volume from raw corners, absorbing degenerate geometry
    pub fn from_corners(min: Vec3, max: Vec3) -> Self {
        let (size, degenerate) = match measure_size(min, max) {
            Ok(size) => (size, false),
            Err(e) => {
                tracing::debug!(error = %e, fallback = FALLBACK_SIZE, "Substituting fallback model size");
                (FALLBACK_SIZE, true)
            }
        };

        let mid = (min + max) * 0.5;
        let center = Vec3::new(
            finite_or_zero(mid.x),
            finite_or_zero(mid.y),
            finite_or_zero(mid.z),
        );

        Self {
            min,
            max,
            size,
            center,
            degenerate,
        }
    }

    /// Translation that centers the footprint on the origin and drops the
    /// lowest point to `y = 0`
    pub fn ground_offset(&self) -> Vec3 {
        Vec3::new(-self.center.x, -finite_or_zero(self.min.y), -self.center.z)
    }

    /// Ground plane height for this model, measured before translation
    pub fn ground_height(&self) -> f32 {
        finite_or_zero(self.min.y) - GROUND_CLEARANCE
    }
}

/// Euclidean length of the extent, rejected when not finite and positive
pub fn measure_size(min: Vec3, max: Vec3) -> Result<f32, DegenerateGeometryError> {
    let size = (max - min).length();
    if !size.is_finite() {
        Err(DegenerateGeometryError::NonFinite(size))
    } else if size <= 0.0 {
        Err(DegenerateGeometryError::NonPositive(size))
    } else {
        Ok(size)
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

/// Accumulates mesh boxes into one volume
#[derive(Debug, Clone, Copy)]
pub struct BoundsAccumulator {
    min: Vec3,
    max: Vec3,
    boxes: usize,
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
            boxes: 0,
        }
    }
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis-aligned box already expressed in the target space
    pub fn extend_box(&mut self, min: Vec3, max: Vec3) {
        self.min = self.min.min(min);
        self.max = self.max.max(max);
        self.boxes += 1;
    }

    /// Add a local-space box placed by `transform`.
    ///
    /// All 8 corners are transformed so rotated children produce a correct
    /// (if conservative) axis-aligned box.
    pub fn extend_transformed_box(&mut self, local_min: Vec3, local_max: Vec3, transform: &Affine3A) {
        let corners = [
            Vec3::new(local_min.x, local_min.y, local_min.z),
            Vec3::new(local_min.x, local_min.y, local_max.z),
            Vec3::new(local_min.x, local_max.y, local_min.z),
            Vec3::new(local_min.x, local_max.y, local_max.z),
            Vec3::new(local_max.x, local_min.y, local_min.z),
            Vec3::new(local_max.x, local_min.y, local_max.z),
            Vec3::new(local_max.x, local_max.y, local_min.z),
            Vec3::new(local_max.x, local_max.y, local_max.z),
        ];

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for corner in corners {
            let p = transform.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        self.extend_box(min, max);
    }

    /// Number of boxes added so far
    pub fn box_count(&self) -> usize {
        self.boxes
    }

    pub fn is_empty(&self) -> bool {
        self.boxes == 0
    }

    pub fn finish(&self) -> BoundingVolume {
        BoundingVolume::from_corners(self.min, self.max)
    }
}

/// Local-space box of a vertex position list, `None` when there are no vertices
pub fn local_box(positions: &[[f32; 3]]) -> Option<(Vec3, Vec3)> {
    if positions.is_empty() {
        return None;
    }

    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for p in positions {
        let v = Vec3::from_array(*p);
        min = min.min(v);
        max = max.max(v);
    }
    Some((min, max))
}
