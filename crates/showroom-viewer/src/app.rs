//! Bevy application setup

use bevy::prelude::*;
use bevy::winit::WinitSettings;
use bevy_egui::EguiPlugin;

use showroom_core::{Catalog, ViewerSession};
use showroom_scene::{ActiveSession, CatalogStore, ShowroomScenePlugin, StageSettings, ViewerRequests};

use crate::config::ViewerConfig;
use crate::ui::{RouteInput, UiPlugin};

/// Everything the viewer needs to start
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub config: ViewerConfig,
    pub catalog: Catalog,
    /// Route opened at startup (e.g. `/cars/1`)
    pub route: Option<String>,
}

impl ViewerOptions {
    pub fn new(config: ViewerConfig, catalog: Catalog) -> Self {
        let route = config.viewer.initial_route.clone();
        Self {
            config,
            catalog,
            route,
        }
    }

    /// Startup requests: navigate to the initial route, if any
    pub fn initial_requests(&self) -> ViewerRequests {
        let mut requests = ViewerRequests::default();
        if let Some(route) = self.route.as_deref().filter(|r| !r.trim().is_empty()) {
            requests.navigate(route);
        }
        requests
    }

    pub fn stage_settings(&self) -> StageSettings {
        StageSettings {
            background: self.config.viewer.background,
            ground: self.config.viewer.ground,
            fov_degrees: self.config.viewer.fov_degrees,
        }
    }
}

/// Run the Bevy application
pub fn run(options: ViewerOptions) {
    tracing::info!(
        vehicles = options.catalog.len(),
        route = options.route.as_deref().unwrap_or(""),
        "Starting viewer"
    );

    let requests = options.initial_requests();
    let stage = options.stage_settings();
    let route_input = RouteInput(options.route.clone().unwrap_or_default());
    let session = ActiveSession(ViewerSession::new(options.config.viewer.default_color));

    App::new()
        .insert_resource(WinitSettings::default())
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: options.config.viewer.title.clone(),
                        canvas: Some("#viewer-canvas".to_string()),
                        fit_canvas_to_parent: true,
                        prevent_default_event_handling: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    file_path: options.config.assets.root.clone(),
                    // Static hosting has no .meta files
                    meta_check: bevy::asset::AssetMetaCheck::Never,
                    ..default()
                }),
        )
        .add_plugins(EguiPlugin::default())
        .insert_resource(stage)
        .insert_resource(session)
        .insert_resource(CatalogStore::new(options.catalog))
        .insert_resource(requests)
        .insert_resource(route_input)
        .add_plugins(ShowroomScenePlugin)
        .add_plugins(UiPlugin)
        .run();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_route_from_config() {
        let mut config = ViewerConfig::default();
        config.viewer.initial_route = Some("/cars/3".to_string());

        let options = ViewerOptions::new(config, Catalog::default());
        assert_eq!(options.initial_requests().route.as_deref(), Some("/cars/3"));
    }

    #[test]
    fn test_blank_route_requests_nothing() {
        let mut options = ViewerOptions::new(ViewerConfig::default(), Catalog::default());
        assert!(options.initial_requests().route.is_none());

        options.route = Some("  ".to_string());
        assert!(options.initial_requests().route.is_none());
    }

    #[test]
    fn test_stage_settings_follow_config() {
        let mut config = ViewerConfig::default();
        config.viewer.fov_degrees = 35.0;
        let stage = ViewerOptions::new(config, Catalog::default()).stage_settings();

        assert_eq!(stage.fov_degrees, 35.0);
        assert_eq!(stage.background.hex(), "#1a1a1a");
        assert_eq!(stage.ground.hex(), "#2d2d2d");
    }
}
