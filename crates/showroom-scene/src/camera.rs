//! Camera controls and orbit navigation

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use showroom_core::OrbitState;

use crate::ShowroomSystems;

/// Orbit controller state for the main camera
#[derive(Debug, Clone, Default, Resource, Deref, DerefMut)]
pub struct OrbitCamera(pub OrbitState);

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Pixel scroll deltas per wheel line
const PIXELS_PER_LINE: f32 = 100.0;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitCamera>()
            .add_systems(Update, update_camera.in_set(ShowroomSystems::Camera));
    }
}

/// Rotate and zoom around the framed model. Panning is disabled.
fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut orbit: ResMut<OrbitCamera>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    time: Res<Time>,
    mut contexts: EguiContexts,
) {
    // Don't steal input from the UI
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);

    if !egui_wants_pointer {
        if mouse_button.pressed(MouseButton::Left) && mouse_motion.delta != Vec2::ZERO {
            orbit.rotate(mouse_motion.delta);
        }

        let scroll = match mouse_scroll.unit {
            MouseScrollUnit::Line => mouse_scroll.delta.y,
            MouseScrollUnit::Pixel => mouse_scroll.delta.y / PIXELS_PER_LINE,
        };
        if scroll != 0.0 {
            orbit.zoom(scroll);
        }

        // Touch: one finger orbits, two fingers pinch
        let touches: Vec<_> = touch_input.iter().collect();
        match touches.as_slice() {
            [touch] => {
                let delta = touch.delta();
                if delta != Vec2::ZERO {
                    orbit.rotate(delta);
                }
            }
            [t1, t2] => {
                let curr_dist = t1.position().distance(t2.position());
                let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
                orbit.zoom_by(prev_dist / curr_dist.max(1.0));
            }
            _ => {}
        }
    }

    orbit.advance(time.delta_secs());

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = orbit.eye();
        transform.look_at(orbit.target, Vec3::Y);
    }
}
