//! Resources and components shared by the scene plugins

use bevy::gltf::Gltf;
use bevy::prelude::*;
use std::sync::Arc;

use showroom_core::{Catalog, CatalogRepository, ColorSpec, ViewerSession};

/// The viewer session driving the scene
#[derive(Resource, Default, Deref, DerefMut)]
pub struct ActiveSession(pub ViewerSession);

/// Read-only catalog the session resolves vehicles against
#[derive(Resource, Clone)]
pub struct CatalogStore(pub Arc<dyn CatalogRepository + Send + Sync>);

impl CatalogStore {
    pub fn new(repo: impl CatalogRepository + Send + Sync + 'static) -> Self {
        Self(Arc::new(repo))
    }

    pub fn repo(&self) -> &dyn CatalogRepository {
        self.0.as_ref()
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

/// Requests from the UI or the host page, consumed once per frame
#[derive(Resource, Debug, Default)]
pub struct ViewerRequests {
    /// Route to navigate to (e.g. `/cars/3`)
    pub route: Option<String>,
    /// Paint color chosen by the user
    pub color: Option<ColorSpec>,
    /// Retry the failed load
    pub retry: bool,
}

impl ViewerRequests {
    pub fn navigate(&mut self, route: impl Into<String>) {
        self.route = Some(route.into());
    }

    /// Later picks in the same frame replace earlier ones
    pub fn pick_color(&mut self, color: ColorSpec) {
        self.color = Some(color);
    }
}

/// Root entity of a spawned vehicle model
#[derive(Component, Debug, Clone)]
pub struct VehicleModel {
    /// Load generation this model belongs to
    pub generation: u64,
    pub path: String,
    pub gltf: Handle<Gltf>,
}

/// Model root still waiting for its glTF to resolve to a scene
#[derive(Component)]
pub struct AwaitingScene;

/// Model root grounded and framed
#[derive(Component)]
pub struct Normalized;

/// Engine color for a catalog color
pub fn paint(color: ColorSpec) -> Color {
    let [r, g, b] = color.srgb();
    Color::srgb(r, g, b)
}

/// Latest recolor request not yet applied to the model
#[derive(Resource, Debug, Default)]
pub struct PendingRecolor(pub Option<ColorSpec>);
