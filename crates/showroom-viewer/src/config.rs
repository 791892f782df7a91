//! Configuration loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use showroom_core::{Catalog, CatalogError, ColorSpec};

/// Catalog compiled into the binary, used when none is configured
pub const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.toml");

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub viewer: ViewerSection,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub assets: AssetsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerSection {
    /// Window title
    #[serde(default = "default_title")]
    pub title: String,
    /// Paint color before the user picks one
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,
    #[serde(default = "default_background")]
    pub background: ColorSpec,
    #[serde(default = "default_ground")]
    pub ground: ColorSpec,
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    /// Route opened at startup when none is given on the command line
    #[serde(default)]
    pub initial_route: Option<String>,
}

impl Default for ViewerSection {
    fn default() -> Self {
        Self {
            title: default_title(),
            default_color: default_color(),
            background: default_background(),
            ground: default_ground(),
            fov_degrees: default_fov(),
            initial_route: None,
        }
    }
}

fn default_title() -> String {
    "Showroom".to_string()
}

fn default_color() -> ColorSpec {
    ColorSpec::WHITE
}

fn default_background() -> ColorSpec {
    ColorSpec::from_rgb8(0x1a, 0x1a, 0x1a)
}

fn default_ground() -> ColorSpec {
    ColorSpec::from_rgb8(0x2d, 0x2d, 0x2d)
}

fn default_fov() -> f32 {
    50.0
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSection {
    /// Catalog file (TOML, or the site's `data.json`); the built-in catalog when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsSection {
    /// Directory model paths are resolved against
    #[serde(default = "default_assets_root")]
    pub root: String,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            root: default_assets_root(),
        }
    }
}

fn default_assets_root() -> String {
    "assets".to_string()
}

impl ViewerConfig {
    /// Load the configured catalog, or the built-in one
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog.path {
            Some(path) => Catalog::from_file(path)
                .with_context(|| format!("Failed to load catalog {}", path.display())),
            None => {
                let catalog = builtin_catalog()?;
                info!(vehicles = catalog.len(), "Using built-in catalog");
                Ok(catalog)
            }
        }
    }
}

pub fn builtin_catalog() -> Result<Catalog, CatalogError> {
    Catalog::from_toml(BUILTIN_CATALOG)
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<ViewerConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: ViewerConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(ViewerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showroom_core::CatalogRepository;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("showroom.toml")).unwrap();

        assert_eq!(config.viewer.title, "Showroom");
        assert_eq!(config.viewer.default_color, ColorSpec::WHITE);
        assert_eq!(config.viewer.background.hex(), "#1a1a1a");
        assert_eq!(config.assets.root, "assets");
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"
[viewer]
default_color = "#C53030"
initial_route = "/cars/2"

[assets]
root = "public"
"##
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.viewer.default_color.hex(), "#c53030");
        assert_eq!(config.viewer.initial_route.as_deref(), Some("/cars/2"));
        assert_eq!(config.viewer.title, "Showroom");
        assert_eq!(config.viewer.fov_degrees, 50.0);
        assert_eq!(config.assets.root, "public");
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[viewer]\nbackground = \"charcoal\"").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = builtin_catalog().unwrap();
        assert!(!catalog.is_empty());

        for vehicle in &catalog.vehicle {
            assert!(catalog.find(vehicle.id).is_some());
            assert!(!vehicle.colors.is_empty(), "vehicle {} has no colors", vehicle.id);
        }
    }

    #[test]
    fn test_configured_catalog_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r##"{"cars": [{"id": 7, "name": "Jimny", "brand": "Suzuki", "modelPath": "/model/jimny.glb", "colors": ["#ffffff"]}]}"##,
        )
        .unwrap();

        let config = ViewerConfig {
            catalog: CatalogSection { path: Some(path) },
            ..Default::default()
        };
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.find(7).map(|v| v.model_path.as_str()), Some("/model/jimny.glb"));

        let missing = ViewerConfig {
            catalog: CatalogSection {
                path: Some(dir.path().join("nope.toml")),
            },
            ..Default::default()
        };
        assert!(missing.load_catalog().is_err());
    }
}
