//! Geometry normalizer
//!
//! Once a model's scene instance is fully spawned, its bounds are measured in
//! the root's space, the root is shifted so the model stands centered on the
//! ground, and the session is told to frame it. Runs once per load.

use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy::scene::{SceneInstance, SceneSpawner};

use showroom_core::bounds::local_box;
use showroom_core::{AssetLoadError, BoundsAccumulator};

use crate::models::ModelCache;
use crate::types::{ActiveSession, Normalized, VehicleModel};
use crate::ShowroomSystems;

/// Plugin for model normalization
pub struct NormalizePlugin;

impl Plugin for NormalizePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (mark_scenes_ready, normalize_models)
                .chain()
                .in_set(ShowroomSystems::Normalize),
        );
    }
}

/// Model root whose scene instance has been fully spawned
#[derive(Component)]
pub struct SceneReady;

/// Result of walking a model hierarchy
pub enum HierarchyScan {
    /// Some mesh asset is not available yet
    Pending,
    Measured {
        bounds: BoundsAccumulator,
        /// Number of mesh entities found
        meshes: usize,
    },
}

/// Local-space box of a mesh's vertex positions
pub fn mesh_local_box(mesh: &Mesh) -> Option<(Vec3, Vec3)> {
    mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        .and_then(|positions| positions.as_float3())
        .and_then(local_box)
}

/// Measure every mesh below `root`, composing local transforms down the tree.
///
/// The root's own transform is excluded so the result is in root space.
pub fn measure_hierarchy(
    root: Entity,
    children: &Query<&Children>,
    nodes: &Query<(&Transform, Option<&Mesh3d>), Without<VehicleModel>>,
    meshes: &Assets<Mesh>,
) -> HierarchyScan {
    let mut bounds = BoundsAccumulator::new();
    let mut mesh_count = 0;
    let mut stack = vec![(root, Affine3A::IDENTITY)];

    while let Some((entity, parent)) = stack.pop() {
        let Ok(kids) = children.get(entity) else {
            continue;
        };
        for child in kids.iter() {
            let Ok((transform, mesh3d)) = nodes.get(child) else {
                continue;
            };
            let affine = parent * transform.compute_affine();

            if let Some(mesh3d) = mesh3d {
                let Some(mesh) = meshes.get(&mesh3d.0) else {
                    return HierarchyScan::Pending;
                };
                mesh_count += 1;
                // Meshes without positions count but add no volume
                if let Some((min, max)) = mesh_local_box(mesh) {
                    bounds.extend_transformed_box(min, max, &affine);
                }
            }

            stack.push((child, affine));
        }
    }

    HierarchyScan::Measured {
        bounds,
        meshes: mesh_count,
    }
}

/// Flag model roots whose scene instance has finished spawning
fn mark_scenes_ready(
    mut commands: Commands,
    scene_spawner: Res<SceneSpawner>,
    roots: Query<(Entity, &SceneInstance), (With<VehicleModel>, Without<SceneReady>)>,
) {
    for (entity, instance) in roots.iter() {
        if scene_spawner.instance_is_ready(**instance) {
            commands.entity(entity).insert(SceneReady);
        }
    }
}

/// Ground and frame freshly spawned models
fn normalize_models(
    mut commands: Commands,
    mut session: ResMut<ActiveSession>,
    mut cache: ResMut<ModelCache>,
    meshes: Res<Assets<Mesh>>,
    mut roots: Query<
        (Entity, &VehicleModel, &mut Transform, &mut Visibility),
        (With<SceneReady>, Without<Normalized>),
    >,
    children: Query<&Children>,
    nodes: Query<(&Transform, Option<&Mesh3d>), Without<VehicleModel>>,
) {
    for (entity, model, mut transform, mut visibility) in roots.iter_mut() {
        if !session.needs_normalization(model.generation) {
            continue;
        }

        match measure_hierarchy(entity, &children, &nodes, &meshes) {
            HierarchyScan::Pending => {}
            HierarchyScan::Measured { meshes: 0, .. } => {
                let err = AssetLoadError::NoMeshes {
                    path: model.path.clone(),
                };
                cache.mark_failed(err.clone());
                session.fail(model.generation, err);
                commands.entity(entity).despawn();
            }
            HierarchyScan::Measured { bounds, meshes } => {
                let volume = bounds.finish();
                tracing::debug!(
                    path = %model.path,
                    meshes,
                    min = ?volume.min,
                    max = ?volume.max,
                    "Measured model bounds"
                );
                if let Some(offset) = session.record_normalization(model.generation, volume) {
                    transform.translation += offset;
                    *visibility = Visibility::Inherited;
                    commands.entity(entity).insert(Normalized);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use bevy::gltf::Gltf;
    use showroom_core::{Catalog, ColorSpec, LoadTicket, VehicleRecord, VehicleSpecs, ViewerPhase};

    fn scan(world: &mut World, root: Entity) -> Option<(BoundsAccumulator, usize)> {
        world
            .run_system_once(
                move |children: Query<&Children>,
                      nodes: Query<(&Transform, Option<&Mesh3d>), Without<VehicleModel>>,
                      meshes: Res<Assets<Mesh>>| {
                    match measure_hierarchy(root, &children, &nodes, &meshes) {
                        HierarchyScan::Pending => None,
                        HierarchyScan::Measured { bounds, meshes } => Some((bounds, meshes)),
                    }
                },
            )
            .unwrap()
    }

    #[test]
    fn test_mesh_local_box() {
        let mesh = Mesh::from(Cuboid::new(2.0, 4.0, 6.0));
        let (min, max) = mesh_local_box(&mesh).unwrap();
        assert!((min - Vec3::new(-1.0, -2.0, -3.0)).length() < 1e-5);
        assert!((max - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_nested_hierarchy_is_measured_in_root_space() {
        let mut world = World::new();
        let mut meshes = Assets::<Mesh>::default();
        let cube = meshes.add(Cuboid::new(2.0, 2.0, 2.0));
        world.insert_resource(meshes);

        // The root transform must not leak into the measurement
        let root = world.spawn(Transform::from_xyz(100.0, 100.0, 100.0)).id();
        let node = world
            .spawn((Transform::from_xyz(0.0, 1.0, 0.0).with_scale(Vec3::splat(2.0)), ChildOf(root)))
            .id();
        world.spawn((Mesh3d(cube), Transform::from_xyz(1.0, 0.0, 0.0), ChildOf(node)));

        let (bounds, count) = scan(&mut world, root).unwrap();
        let volume = bounds.finish();
        assert_eq!(count, 1);
        assert!((volume.min - Vec3::new(0.0, -1.0, -2.0)).length() < 1e-5);
        assert!((volume.max - Vec3::new(4.0, 3.0, 2.0)).length() < 1e-5);
        assert!((volume.ground_offset() - Vec3::new(-2.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_hierarchy_without_meshes() {
        let mut world = World::new();
        world.insert_resource(Assets::<Mesh>::default());

        let root = world.spawn(Transform::default()).id();
        world.spawn((Transform::default(), ChildOf(root)));

        let (bounds, count) = scan(&mut world, root).unwrap();
        assert_eq!(count, 0);
        assert!(bounds.is_empty());
    }

    #[test]
    fn test_missing_mesh_asset_is_pending() {
        let mut world = World::new();
        world.insert_resource(Assets::<Mesh>::default());

        let root = world.spawn(Transform::default()).id();
        world.spawn((Mesh3d(Handle::default()), ChildOf(root)));

        assert!(scan(&mut world, root).is_none());
    }

    fn session_world() -> (World, LoadTicket) {
        let catalog = Catalog {
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
        };

        let mut world = World::new();
        let mut session = ActiveSession::default();
        let ticket = session.select(&catalog, 1).unwrap().unwrap();
        session.take_events();
        world.insert_resource(session);
        world.init_resource::<ModelCache>();
        world.insert_resource(Assets::<Mesh>::default());
        (world, ticket)
    }

    fn spawn_root(world: &mut World, ticket: &LoadTicket) -> Entity {
        world
            .spawn((
                VehicleModel {
                    generation: ticket.generation,
                    path: ticket.path.clone(),
                    gltf: Handle::<Gltf>::default(),
                },
                Transform::default(),
                Visibility::Hidden,
                SceneReady,
            ))
            .id()
    }

    #[test]
    fn test_model_is_grounded_once() {
        let (mut world, ticket) = session_world();
        let cube = world
            .resource_mut::<Assets<Mesh>>()
            .add(Cuboid::new(2.0, 4.0, 2.0));
        let root = spawn_root(&mut world, &ticket);
        // Box spans y in [-1, 3]
        world.spawn((Mesh3d(cube), Transform::from_xyz(0.0, 1.0, 0.0), ChildOf(root)));

        world.run_system_once(normalize_models).unwrap();

        let grounded = world.get::<Transform>(root).unwrap().translation;
        assert!((grounded - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        assert_eq!(world.get::<Visibility>(root), Some(&Visibility::Inherited));
        assert!(world.get::<Normalized>(root).is_some());
        assert_eq!(world.resource::<ActiveSession>().phase(), ViewerPhase::Ready);

        // Neither the marker nor the session latch lets it move twice
        world.run_system_once(normalize_models).unwrap();
        world.entity_mut(root).remove::<Normalized>();
        world.run_system_once(normalize_models).unwrap();
        assert_eq!(world.get::<Transform>(root).unwrap().translation, grounded);
    }

    #[test]
    fn test_unready_scene_stays_hidden() {
        let (mut world, ticket) = session_world();
        let cube = world.resource_mut::<Assets<Mesh>>().add(Cuboid::default());
        let root = spawn_root(&mut world, &ticket);
        world.entity_mut(root).remove::<SceneReady>();
        world.spawn((Mesh3d(cube), ChildOf(root)));

        world.run_system_once(normalize_models).unwrap();
        assert_eq!(world.get::<Visibility>(root), Some(&Visibility::Hidden));
        assert_eq!(world.get::<Transform>(root).unwrap().translation, Vec3::ZERO);
        assert_eq!(world.resource::<ActiveSession>().phase(), ViewerPhase::Loading);
    }

    #[test]
    fn test_model_without_meshes_fails() {
        let (mut world, ticket) = session_world();
        let root = spawn_root(&mut world, &ticket);
        world.spawn((Transform::default(), ChildOf(root)));

        world.run_system_once(normalize_models).unwrap();

        assert!(world.get_entity(root).is_err());
        let session = world.resource::<ActiveSession>();
        assert_eq!(session.phase(), ViewerPhase::Failed);
        assert!(matches!(session.error(), Some(AssetLoadError::NoMeshes { .. })));
        assert!(matches!(
            world.resource_mut::<ModelCache>().request(&ticket.path, |_| Handle::default()),
            Err(AssetLoadError::NoMeshes { .. })
        ));
    }

    #[test]
    fn test_stale_model_is_left_alone() {
        let (mut world, ticket) = session_world();
        let cube = world.resource_mut::<Assets<Mesh>>().add(Cuboid::default());
        let stale = LoadTicket {
            generation: ticket.generation - 1,
            path: ticket.path.clone(),
        };
        let root = spawn_root(&mut world, &stale);
        world.spawn((Mesh3d(cube), ChildOf(root)));

        world.run_system_once(normalize_models).unwrap();
        assert!(world.get::<Normalized>(root).is_none());
        assert_eq!(world.resource::<ActiveSession>().phase(), ViewerPhase::Loading);
    }
}
