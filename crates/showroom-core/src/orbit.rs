//! Orbit camera state (Y-up)
//!
//! The render loop feeds pointer input into [`OrbitState`] and reads back the
//! eye position every frame. Framing changes reset the pose and limits.

use bevy_math::{Vec2, Vec3};

use crate::framing::FramingParameters;

/// Elevation limit in radians, short of the poles
pub const MAX_ELEVATION: f32 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitState {
    pub target: Vec3,
    pub distance: f32,
    /// Goal distance that `distance` eases toward
    pub target_distance: f32,
    /// Angle around +Y, 0 looks from +Z
    pub azimuth: f32,
    pub elevation: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
}

impl Default for OrbitState {
    fn default() -> Self {
        // Matches the stage camera before any model is framed: (0, 1, 6) looking at the origin
        let eye = Vec3::new(0.0, 1.0, 6.0);
        let distance = eye.length();
        Self {
            target: Vec3::ZERO,
            distance,
            target_distance: distance,
            azimuth: 0.0,
            elevation: (eye.y / distance).asin(),
            min_distance: 1.0,
            max_distance: 50.0,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
        }
    }
}

impl OrbitState {
    pub fn from_framing(framing: &FramingParameters) -> Self {
        let mut state = Self::default();
        state.apply_framing(framing);
        state
    }

    /// Adopt a new framing: limits, target and pose, without easing
    pub fn apply_framing(&mut self, framing: &FramingParameters) {
        self.min_distance = framing.min_distance;
        self.max_distance = framing.max_distance;
        self.target = framing.target;

        let offset = framing.camera_position - framing.target;
        let distance = offset.length();
        if distance.is_finite() && distance > f32::EPSILON {
            self.azimuth = offset.x.atan2(offset.z);
            self.elevation = (offset.y / distance).clamp(-1.0, 1.0).asin().clamp(-MAX_ELEVATION, MAX_ELEVATION);
        }

        let distance = self.clamp_distance(if distance.is_finite() { distance } else { self.min_distance });
        self.distance = distance;
        self.target_distance = distance;
    }

    /// Move the orbit pivot
    pub fn sync_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Drag rotation in screen pixels
    pub fn rotate(&mut self, delta: Vec2) {
        self.azimuth -= delta.x * self.sensitivity;
        self.elevation = (self.elevation + delta.y * self.sensitivity).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// Scroll zoom; positive values move closer
    pub fn zoom(&mut self, scroll: f32) {
        let zoom_factor = 1.0 - scroll * self.zoom_speed;
        self.target_distance = self.clamp_distance(self.target_distance * zoom_factor.max(0.01));
    }

    /// Multiplicative zoom (pinch); factor < 1 moves closer
    pub fn zoom_by(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.target_distance = self.clamp_distance(self.target_distance * factor);
        }
    }

    /// Ease the distance toward its goal
    pub fn advance(&mut self, dt: f32) {
        let lerp_factor = 1.0 - (-self.smooth_factor * 60.0 * dt).exp();
        self.distance += (self.target_distance - self.distance) * lerp_factor;
        self.distance = self.clamp_distance(self.distance);
    }

    /// Camera position for the current pose
    pub fn eye(&self) -> Vec3 {
        let horizontal = self.distance * self.elevation.cos();
        self.target
            + Vec3::new(
                horizontal * self.azimuth.sin(),
                self.distance * self.elevation.sin(),
                horizontal * self.azimuth.cos(),
            )
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance.max(self.min_distance))
    }
}
