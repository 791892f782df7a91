//! Stage setup - camera, lights, ground plane, and background

use bevy::prelude::*;

use showroom_core::framing::{FAR_PLANE, NEAR_PLANE};
use showroom_core::session::DEFAULT_GROUND_HEIGHT;
use showroom_core::ColorSpec;

use crate::camera::{MainCamera, OrbitCamera};
use crate::types::paint;

/// Side length of the square ground plane
pub const GROUND_SIZE: f32 = 50.0;

/// Stage look, adjustable from configuration
#[derive(Debug, Clone, Resource)]
pub struct StageSettings {
    pub background: ColorSpec,
    pub ground: ColorSpec,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            background: ColorSpec::from_rgb8(0x1a, 0x1a, 0x1a),
            ground: ColorSpec::from_rgb8(0x2d, 0x2d, 0x2d),
            fov_degrees: 50.0,
        }
    }
}

/// Marker component for the ground plane
#[derive(Component)]
pub struct GroundPlane;

/// Marker component for the main directional light
#[derive(Component)]
pub struct MainDirectionalLight;

/// Plugin for stage setup
pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StageSettings>()
            .add_systems(Startup, setup_stage);
    }
}

fn setup_stage(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<StageSettings>,
    orbit: Res<OrbitCamera>,
) {
    commands.insert_resource(ClearColor(paint(settings.background)));

    // Y-up camera, placed by the orbit controller until a model is framed
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: settings.fov_degrees.to_radians(),
            near: NEAR_PLANE,
            far: FAR_PLANE,
            ..default()
        }),
        Transform::from_translation(orbit.eye()).looking_at(orbit.target, Vec3::Y),
        MainCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 250.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(5.0, 5.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainDirectionalLight,
    ));

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: paint(settings.ground),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_xyz(0.0, DEFAULT_GROUND_HEIGHT, 0.0),
        GroundPlane,
    ));
}
