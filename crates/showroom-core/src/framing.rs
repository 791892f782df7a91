//! Camera framing policy
//!
//! Maps a measured [`BoundingVolume`] to a camera pose and orbit zoom limits.
//! Distances scale with the model size so a motorcycle and a truck fill the
//! view alike; the fixed rise/depth ratios give the same three-quarter angle
//! at any scale.

use bevy_math::Vec3;

use crate::bounds::BoundingVolume;

/// Closest orbit distance as a fraction of model size
pub const MIN_DISTANCE_FACTOR: f32 = 0.5;
/// Closest orbit distance never drops below this
pub const MIN_DISTANCE_FLOOR: f32 = 1.0;
/// Farthest orbit distance as a multiple of model size
pub const MAX_DISTANCE_FACTOR: f32 = 3.5;
/// Camera height above the center, in model sizes
pub const CAMERA_RISE_FACTOR: f32 = 0.8;
/// Camera depth in front of the center, in model sizes
pub const CAMERA_DEPTH_FACTOR: f32 = 2.0;

/// Near plane of the stage camera before any model is framed
pub const NEAR_PLANE: f32 = 0.01;
/// Far plane of the stage camera before any model is framed; also the floor
/// for framed models so the stage stays visible around small ones
pub const FAR_PLANE: f32 = 1000.0;
/// Near plane as a fraction of the closest orbit distance
const NEAR_PLANE_FACTOR: f32 = 0.01;
/// Far plane as a multiple of the farthest orbit distance
const FAR_PLANE_FACTOR: f32 = 2.0;

/// Camera pose and orbit limits for one normalized model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramingParameters {
    pub min_distance: f32,
    pub max_distance: f32,
    pub camera_position: Vec3,
    pub target: Vec3,
}

/// Frame a model. Pure; call once per normalization, not per frame.
pub fn frame(volume: &BoundingVolume) -> FramingParameters {
    let size = volume.size;
    let center = volume.center;

    let min_distance = (size * MIN_DISTANCE_FACTOR).max(MIN_DISTANCE_FLOOR);
    // Tiny models would otherwise get max < min
    let max_distance = (size * MAX_DISTANCE_FACTOR).max(min_distance);

    FramingParameters {
        min_distance,
        max_distance,
        camera_position: Vec3::new(
            center.x,
            center.y + size * CAMERA_RISE_FACTOR,
            center.z + size * CAMERA_DEPTH_FACTOR,
        ),
        target: center,
    }
}

impl FramingParameters {
    /// Distance from the camera position to the target
    pub fn initial_distance(&self) -> f32 {
        self.camera_position.distance(self.target)
    }

    /// Projection `(near, far)` planes for this framing.
    ///
    /// The far plane is twice the farthest orbit distance; since that distance
    /// is at least seven model radii, the whole model stays in front of it at
    /// every zoom level.
    pub fn clip_planes(&self) -> (f32, f32) {
        let near = (self.min_distance * NEAR_PLANE_FACTOR).max(NEAR_PLANE);
        let far = (self.max_distance * FAR_PLANE_FACTOR).max(FAR_PLANE);
        (near, far)
    }
}
