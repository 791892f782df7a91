//! Showroom Scene - Bevy plugins for the vehicle viewer
//!
//! This crate turns a [`showroom_core::ViewerSession`] into a rendered scene:
//! glTF loading through the asset server, grounding and framing of the
//! spawned hierarchy, live recoloring, the orbit camera, and the stage.

pub mod camera;
pub mod controller;
pub mod models;
pub mod normalize;
pub mod recolor;
pub mod stage;
pub mod types;

use bevy::prelude::*;

/// Per-frame order of the viewer systems
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowroomSystems {
    /// Navigation, retry, and color requests
    Requests,
    /// Poll pending glTF loads
    Load,
    /// Ground and frame newly spawned models
    Normalize,
    /// Apply session events to the scene
    Dispatch,
    /// Repaint the model
    Recolor,
    /// Move the orbit camera
    Camera,
}

/// Plugin that sets up the viewer scene
pub struct ShowroomScenePlugin;

impl Plugin for ShowroomScenePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                ShowroomSystems::Requests,
                ShowroomSystems::Load,
                ShowroomSystems::Normalize,
                ShowroomSystems::Dispatch,
                ShowroomSystems::Recolor,
                ShowroomSystems::Camera,
            )
                .chain(),
        )
        .add_plugins(models::ModelsPlugin)
        .add_plugins(controller::ControllerPlugin)
        .add_plugins(normalize::NormalizePlugin)
        .add_plugins(recolor::RecolorPlugin)
        .add_plugins(camera::CameraPlugin)
        .add_plugins(stage::StagePlugin);
    }
}

// Re-export commonly used types
pub use camera::{MainCamera, OrbitCamera};
pub use models::ModelCache;
pub use stage::{GroundPlane, StageSettings};
pub use types::*;
