//! Viewer state controller glue
//!
//! Feeds user requests into the [`ActiveSession`] and turns the events it
//! publishes into scene changes: spawning and despawning model roots, moving
//! the ground plane, reframing the orbit camera and its clip planes, and
//! queueing recolors.

use bevy::prelude::*;

use showroom_core::{FramingParameters, ViewerEvent};

use crate::camera::{MainCamera, OrbitCamera};
use crate::models::{spawn_model_root, ModelCache};
use crate::stage::GroundPlane;
use crate::types::{ActiveSession, CatalogStore, PendingRecolor, VehicleModel, ViewerRequests};
use crate::ShowroomSystems;

/// Plugin for session request handling and event dispatch
pub struct ControllerPlugin;

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveSession>()
            .init_resource::<CatalogStore>()
            .init_resource::<ViewerRequests>()
            .add_systems(Update, process_requests.in_set(ShowroomSystems::Requests))
            .add_systems(Update, dispatch_session_events.in_set(ShowroomSystems::Dispatch));
    }
}

/// Apply navigation, retry, and color requests to the session
fn process_requests(
    mut requests: ResMut<ViewerRequests>,
    mut session: ResMut<ActiveSession>,
    mut cache: ResMut<ModelCache>,
    catalog: Res<CatalogStore>,
) {
    if let Some(route) = requests.route.take() {
        if let Err(e) = session.select_route(catalog.repo(), &route) {
            tracing::debug!(route = %route, error = %e, "Route did not select a vehicle");
        }
    }

    if std::mem::take(&mut requests.retry) {
        if let Some(ticket) = session.retry() {
            cache.retry(&ticket.path);
        }
    }

    if let Some(color) = requests.color.take() {
        session.set_color(color);
    }
}

/// Drain session events in emission order
#[allow(clippy::too_many_arguments)]
fn dispatch_session_events(
    mut commands: Commands,
    mut session: ResMut<ActiveSession>,
    mut cache: ResMut<ModelCache>,
    mut orbit: ResMut<OrbitCamera>,
    mut pending_recolor: ResMut<PendingRecolor>,
    asset_server: Res<AssetServer>,
    models: Query<Entity, With<VehicleModel>>,
    mut ground: Query<&mut Transform, With<GroundPlane>>,
    mut cameras: Query<&mut Projection, With<MainCamera>>,
) {
    for event in session.take_events() {
        match event {
            ViewerEvent::LoadRequested(ticket) => {
                despawn_models(&mut commands, &models);
                pending_recolor.0 = None;

                match cache.request(&ticket.path, |path| asset_server.load(path.to_string())) {
                    Ok(Some(gltf)) => {
                        spawn_model_root(&mut commands, ticket.generation, &ticket.path, gltf);
                    }
                    Ok(None) => {}
                    Err(err) => {
                        session.fail(ticket.generation, err);
                    }
                }
            }
            ViewerEvent::ModelCleared => {
                despawn_models(&mut commands, &models);
                pending_recolor.0 = None;
            }
            ViewerEvent::GroundHeightChanged(height) => {
                for mut transform in ground.iter_mut() {
                    transform.translation.y = height;
                }
            }
            ViewerEvent::FramingChanged(framing) => {
                orbit.apply_framing(&framing);
                for mut projection in cameras.iter_mut() {
                    fit_clip_planes(&mut projection, &framing);
                }
            }
            ViewerEvent::OrbitTargetChanged(target) => {
                orbit.sync_target(target);
            }
            ViewerEvent::RecolorRequested(color) => {
                pending_recolor.0 = Some(color);
            }
        }
    }
}

/// Keep the framed model between the camera's clip planes at every zoom level
fn fit_clip_planes(projection: &mut Projection, framing: &FramingParameters) {
    if let Projection::Perspective(perspective) = projection {
        let (near, far) = framing.clip_planes();
        perspective.near = near;
        perspective.far = far;
        tracing::debug!(near, far, "Camera clip planes fitted to model");
    }
}

fn despawn_models(commands: &mut Commands, models: &Query<Entity, With<VehicleModel>>) {
    for entity in models.iter() {
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use bevy::gltf::Gltf;
    use showroom_core::framing::{FAR_PLANE, NEAR_PLANE};
    use showroom_core::{BoundingVolume, Catalog, ColorSpec, VehicleRecord, VehicleSpecs, ViewerPhase};

    fn catalog() -> Catalog {
        Catalog {
            vehicle: vec![VehicleRecord {
                id: 1,
                name: "XL7".to_string(),
                brand: "Suzuki".to_string(),
                image: None,
                brand_logo: None,
                price: None,
                model_path: "/model/XL7.glb".to_string(),
                colors: vec![ColorSpec::WHITE],
                specs: VehicleSpecs::default(),
            }],
            ..Default::default()
        }
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Gltf>()
            .init_resource::<ActiveSession>()
            .init_resource::<ModelCache>()
            .init_resource::<OrbitCamera>()
            .init_resource::<PendingRecolor>()
            .init_resource::<ViewerRequests>()
            .insert_resource(CatalogStore::new(catalog()));
        app
    }

    fn spawned_models(world: &mut World) -> Vec<(u64, Visibility)> {
        let mut models = world.query::<(&VehicleModel, &Visibility)>();
        models.iter(world).map(|(m, v)| (m.generation, *v)).collect()
    }

    #[test]
    fn test_routes_drive_session() {
        let mut app = test_app();
        let world = app.world_mut();

        world.resource_mut::<ViewerRequests>().navigate("/cars/1");
        world.run_system_once(process_requests).unwrap();
        assert_eq!(world.resource::<ActiveSession>().phase(), ViewerPhase::Loading);

        world.resource_mut::<ViewerRequests>().navigate("/cars/9");
        world.run_system_once(process_requests).unwrap();
        assert_eq!(world.resource::<ActiveSession>().phase(), ViewerPhase::NotFound);

        // Site root selects nothing
        world.resource_mut::<ViewerRequests>().navigate("/");
        world.run_system_once(process_requests).unwrap();
        let session = world.resource::<ActiveSession>();
        assert_eq!(session.phase(), ViewerPhase::Idle);
        assert!(session.selection_error().is_none());
    }

    #[test]
    fn test_load_and_normalization_events_reach_scene() {
        let mut app = test_app();
        let world = app.world_mut();

        let ground = world
            .spawn((GroundPlane, Transform::from_xyz(0.0, -1.0, 0.0)))
            .id();
        let camera = world
            .spawn((
                MainCamera,
                Projection::Perspective(PerspectiveProjection {
                    near: NEAR_PLANE,
                    far: FAR_PLANE,
                    ..default()
                }),
            ))
            .id();
        let stale = spawn_model_root(&mut world.commands(), 0, "model/old.glb", Handle::default());
        world.flush();

        let ticket = {
            let catalog = catalog();
            world
                .resource_mut::<ActiveSession>()
                .select(&catalog, 1)
                .unwrap()
                .unwrap()
        };
        // Already requested, so the asset server is not asked again
        world
            .resource_mut::<ModelCache>()
            .request(&ticket.path, |_| Handle::default())
            .unwrap();

        world.run_system_once(dispatch_session_events).unwrap();
        assert!(world.get_entity(stale).is_err());
        assert_eq!(spawned_models(world), vec![(ticket.generation, Visibility::Hidden)]);

        // Car exported in millimetres
        let bounds = BoundingVolume::from_corners(Vec3::new(-2250.0, 0.0, -850.0), Vec3::new(2250.0, 1700.0, 850.0));
        world
            .resource_mut::<ActiveSession>()
            .record_normalization(ticket.generation, bounds)
            .unwrap();
        world.run_system_once(dispatch_session_events).unwrap();

        let framing = *world.resource::<ActiveSession>().framing().unwrap();
        assert!((world.get::<Transform>(ground).unwrap().translation.y - bounds.ground_height()).abs() < 1e-3);

        let orbit = world.resource::<OrbitCamera>();
        assert_eq!(orbit.target, framing.target);
        assert_eq!(orbit.min_distance, framing.min_distance);
        assert_eq!(orbit.max_distance, framing.max_distance);

        match world.get::<Projection>(camera) {
            Some(Projection::Perspective(perspective)) => {
                assert_eq!((perspective.near, perspective.far), framing.clip_planes());
                assert!(framing.initial_distance() + bounds.size * 0.5 < perspective.far);
            }
            _ => panic!("camera lost its perspective projection"),
        }

        assert_eq!(world.resource::<PendingRecolor>().0, Some(ColorSpec::WHITE));
        // The model root itself is untouched by dispatch
        assert_eq!(spawned_models(world).len(), 1);
    }

    #[test]
    fn test_unmount_clears_model() {
        let mut app = test_app();
        let world = app.world_mut();
        spawn_model_root(&mut world.commands(), 1, "model/XL7.glb", Handle::default());
        world.flush();
        world.resource_mut::<PendingRecolor>().0 = Some(ColorSpec::WHITE);

        world.resource_mut::<ActiveSession>().unmount();
        world.run_system_once(dispatch_session_events).unwrap();

        assert!(spawned_models(world).is_empty());
        assert!(world.resource::<PendingRecolor>().0.is_none());
    }
}
