//! glTF model loading and caching

use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use std::collections::HashMap;

use showroom_core::{AssetCache, AssetLoadError, AssetStatus};

use crate::types::{ActiveSession, AwaitingScene, VehicleModel};
use crate::ShowroomSystems;

/// Plugin for model loading
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelCache>()
            .add_systems(Update, poll_model_loads.in_set(ShowroomSystems::Load));
    }
}

/// Cache of loaded model handles, shared by every session showing the same path
#[derive(Resource, Default)]
pub struct ModelCache {
    gltfs: AssetCache<Handle<Gltf>>,
    /// Scene template resolved from each ready glTF
    scenes: HashMap<String, Handle<Scene>>,
}

impl ModelCache {
    /// Handle for `path`, calling `fetch` only the first time the path is seen.
    ///
    /// A path whose load already failed returns the recorded error until
    /// [`ModelCache::retry`] evicts it.
    pub fn request(
        &mut self,
        path: &str,
        fetch: impl FnOnce(&str) -> Handle<Gltf>,
    ) -> Result<Option<Handle<Gltf>>, AssetLoadError> {
        if let Some(AssetStatus::Failed(err)) = self.gltfs.status(path) {
            return Err(err.clone());
        }
        Ok(self.gltfs.checkout(path, fetch))
    }

    /// Scene template for a requested glTF, once it has loaded.
    ///
    /// `Ok(None)` means still loading.
    pub fn resolve(
        &mut self,
        path: &str,
        gltf: &Handle<Gltf>,
        asset_server: &AssetServer,
        gltf_assets: &Assets<Gltf>,
    ) -> Result<Option<Handle<Scene>>, AssetLoadError> {
        if let Some(scene) = self.scenes.get(path) {
            return Ok(Some(scene.clone()));
        }

        match asset_server.get_load_state(gltf.id()) {
            Some(LoadState::Loaded) => {
                let Some(asset) = gltf_assets.get(gltf) else {
                    return Ok(None);
                };
                // Use the default scene, else the first one
                let scene = asset
                    .default_scene
                    .clone()
                    .or_else(|| asset.scenes.first().cloned())
                    .ok_or_else(|| AssetLoadError::NoScene {
                        path: path.to_string(),
                    })?;

                tracing::info!(path, scenes = asset.scenes.len(), "Model loaded");
                self.gltfs.mark_ready(path);
                self.scenes.insert(path.to_string(), scene.clone());
                Ok(Some(scene))
            }
            Some(LoadState::Failed(err)) => Err(AssetLoadError::Failed {
                path: path.to_string(),
                reason: err.to_string(),
            }),
            _ => Ok(None),
        }
    }

    /// Record a failure; the path is not fetched again until retried
    pub fn mark_failed(&mut self, error: AssetLoadError) {
        self.scenes.remove(error.path());
        self.gltfs.mark_failed(error);
    }

    /// Evict a failed path so the next request fetches it again
    pub fn retry(&mut self, path: &str) -> bool {
        self.scenes.remove(path);
        self.gltfs.retry(path)
    }

    pub fn is_ready(&self, path: &str) -> bool {
        self.gltfs.is_ready(path)
    }
}

/// Spawn a hidden model root for a load ticket.
///
/// The root stays hidden until the normalizer has grounded and framed it.
pub fn spawn_model_root(commands: &mut Commands, generation: u64, path: &str, gltf: Handle<Gltf>) -> Entity {
    commands
        .spawn((
            Name::new(format!("vehicle:{path}")),
            VehicleModel {
                generation,
                path: path.to_string(),
                gltf,
            },
            AwaitingScene,
            Transform::default(),
            Visibility::Hidden,
        ))
        .id()
}

/// Check loading state and instantiate scenes from loaded glTFs
fn poll_model_loads(
    mut commands: Commands,
    mut cache: ResMut<ModelCache>,
    mut session: ResMut<ActiveSession>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    pending: Query<(Entity, &VehicleModel), With<AwaitingScene>>,
) {
    for (entity, model) in pending.iter() {
        if !session.is_current(model.generation) {
            commands.entity(entity).despawn();
            continue;
        }

        match cache.resolve(&model.path, &model.gltf, &asset_server, &gltf_assets) {
            Ok(Some(scene)) => {
                tracing::debug!(generation = model.generation, path = %model.path, "Instantiating model scene");
                commands
                    .entity(entity)
                    .remove::<AwaitingScene>()
                    .insert(SceneRoot(scene));
            }
            Ok(None) => {
                // Still loading
            }
            Err(err) => {
                cache.mark_failed(err.clone());
                session.fail(model.generation, err);
                commands.entity(entity).despawn();
            }
        }
    }
}
