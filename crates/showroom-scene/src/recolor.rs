//! Material recolor engine
//!
//! Every recolor gives each mesh under the model root its own fresh copy of
//! its current material with the new base color. The glTF template materials
//! are never written to, and the previous copy is dropped with the component
//! that held it.

use bevy::prelude::*;

use crate::types::{paint, Normalized, PendingRecolor, VehicleModel};
use crate::ShowroomSystems;

/// Plugin for live recoloring
pub struct RecolorPlugin;

impl Plugin for RecolorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingRecolor>()
            .add_systems(Update, apply_pending_recolor.in_set(ShowroomSystems::Recolor));
    }
}

/// Clone `source`, set its base color, and add the clone as a new asset
pub fn recolor_material(
    materials: &mut Assets<StandardMaterial>,
    source: &Handle<StandardMaterial>,
    color: Color,
) -> Option<Handle<StandardMaterial>> {
    let mut material = materials.get(source)?.clone();
    material.base_color = color;
    Some(materials.add(material))
}

/// Apply the latest color to the normalized model
pub fn apply_pending_recolor(
    mut commands: Commands,
    mut pending: ResMut<PendingRecolor>,
    models: Query<Entity, (With<VehicleModel>, With<Normalized>)>,
    children: Query<&Children>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(color_spec) = pending.0 else {
        return;
    };
    // Keep the request until a model is ready to take it
    let Some(root) = models.iter().next() else {
        return;
    };
    pending.0 = None;

    let color = paint(color_spec);
    let mut recolored = 0usize;
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if let Ok(material) = mesh_materials.get(entity) {
            if let Some(handle) = recolor_material(&mut materials, &material.0, color) {
                commands.entity(entity).insert(MeshMaterial3d(handle));
                recolored += 1;
            }
        }
        if let Ok(kids) = children.get(entity) {
            stack.extend(kids.iter());
        }
    }

    tracing::debug!(color = %color_spec, meshes = recolored, "Recolored model");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use bevy::gltf::Gltf;
    use showroom_core::ColorSpec;

    #[test]
    fn test_recolor_clones_material() {
        let mut materials = Assets::<StandardMaterial>::default();
        let original = materials.add(StandardMaterial {
            base_color: Color::WHITE,
            metallic: 0.7,
            ..default()
        });
        let red = Color::srgb(1.0, 0.0, 0.0);

        let recolored = recolor_material(&mut materials, &original, red).unwrap();
        assert_ne!(recolored.id(), original.id());

        let material = materials.get(&recolored).unwrap();
        assert_eq!(material.base_color, red);
        assert_eq!(material.metallic, 0.7);
        assert_eq!(materials.get(&original).unwrap().base_color, Color::WHITE);
    }

    #[test]
    fn test_recolor_missing_material() {
        let mut materials = Assets::<StandardMaterial>::default();
        assert!(recolor_material(&mut materials, &Handle::default(), Color::BLACK).is_none());
    }

    #[test]
    fn test_meshes_get_independent_materials() {
        let mut world = World::new();
        let mut materials = Assets::<StandardMaterial>::default();
        let shared = materials.add(StandardMaterial::default());
        world.insert_resource(materials);
        world.init_resource::<PendingRecolor>();

        let root = world
            .spawn((
                VehicleModel {
                    generation: 1,
                    path: "model/XL7.glb".to_string(),
                    gltf: Handle::<Gltf>::default(),
                },
                Normalized,
            ))
            .id();
        let body = world.spawn(ChildOf(root)).id();
        let door = world.spawn((MeshMaterial3d(shared.clone()), ChildOf(body))).id();
        let hood = world.spawn((MeshMaterial3d(shared.clone()), ChildOf(body))).id();

        let first = ColorSpec::parse("#c53030").unwrap();
        let second = ColorSpec::parse("#3182ce").unwrap();
        for color in [first, second] {
            world.resource_mut::<PendingRecolor>().0 = Some(color);
            world.run_system_once(apply_pending_recolor).unwrap();
        }

        assert!(world.resource::<PendingRecolor>().0.is_none());
        let door_material = world.get::<MeshMaterial3d<StandardMaterial>>(door).unwrap().0.clone();
        let hood_material = world.get::<MeshMaterial3d<StandardMaterial>>(hood).unwrap().0.clone();
        assert_ne!(door_material.id(), hood_material.id());
        assert_ne!(door_material.id(), shared.id());

        let materials = world.resource::<Assets<StandardMaterial>>();
        assert_eq!(materials.get(&door_material).unwrap().base_color, paint(second));
        assert_eq!(materials.get(&hood_material).unwrap().base_color, paint(second));
        assert_eq!(materials.get(&shared).unwrap().base_color, StandardMaterial::default().base_color);
    }

    #[test]
    fn test_request_waits_for_normalized_model() {
        let mut world = World::new();
        world.insert_resource(Assets::<StandardMaterial>::default());
        world.insert_resource(PendingRecolor(Some(ColorSpec::WHITE)));

        world.run_system_once(apply_pending_recolor).unwrap();
        assert_eq!(world.resource::<PendingRecolor>().0, Some(ColorSpec::WHITE));
    }
}
