//! Vehicle catalog - read-only records keyed by vehicle id
//!
//! The catalog is loaded once (TOML or the site's JSON layout) and handed to the
//! viewer behind the [`CatalogRepository`] trait. The viewer only ever looks a
//! record up by id; it never owns or mutates catalog data.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::color::ColorSpec;

/// Numeric vehicle identifier (the last segment of a `/cars/<id>` route)
pub type VehicleId = u32;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse catalog TOML: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Failed to parse catalog JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Duplicate vehicle id {0} in catalog")]
    DuplicateId(VehicleId),
}

/// Display specs shown next to the viewer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpecs {
    /// Engine power (e.g. "103 hp")
    #[serde(default)]
    pub power: String,
    /// Engine capacity (e.g. "1462 cc")
    #[serde(default)]
    pub capacity: String,
    /// Top speed
    #[serde(default)]
    pub speed: String,
    #[serde(default)]
    pub torque: String,
    /// 0-100 km/h time
    #[serde(default)]
    pub acceleration: String,
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: VehicleId,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    /// Listing thumbnail (unused by the viewer, kept for round-tripping)
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "brandLogo")]
    pub brand_logo: Option<String>,
    /// Display price, already formatted
    #[serde(default)]
    pub price: Option<String>,
    /// Path to the glTF/GLB asset; empty means "no model yet"
    #[serde(default, alias = "modelPath")]
    pub model_path: String,
    /// Selectable paint colors
    #[serde(default)]
    pub colors: Vec<ColorSpec>,
    #[serde(default)]
    pub specs: VehicleSpecs,
}

/// Lookup-by-id access to catalog data
pub trait CatalogRepository {
    fn find(&self, id: VehicleId) -> Option<&VehicleRecord>;
}

/// In-memory catalog loaded from TOML or JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Version of the catalog format
    #[serde(default = "default_version")]
    pub version: String,
    /// Vehicle entries (`[[vehicle]]` in TOML, `cars` in the site JSON)
    #[serde(default, alias = "cars")]
    pub vehicle: Vec<VehicleRecord>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            version: default_version(),
            vehicle: Vec::new(),
        }
    }
}

impl Catalog {
    /// Parse a catalog from TOML
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.validate()
    }

    /// Parse a catalog from the site's `data.json` layout
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(content)?;
        catalog.validate()
    }

    /// Load a catalog file; `.json` files use the JSON layout, anything else TOML
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let catalog = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };
        tracing::info!(path = %path.display(), vehicles = catalog.vehicle.len(), "Loaded catalog");
        Ok(catalog)
    }

    fn validate(self) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for record in &self.vehicle {
            if !seen.insert(record.id) {
                return Err(CatalogError::DuplicateId(record.id));
            }
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.vehicle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicle.is_empty()
    }
}

impl CatalogRepository for Catalog {
    fn find(&self, id: VehicleId) -> Option<&VehicleRecord> {
        self.vehicle.iter().find(|v| v.id == id)
    }
}

/// Resolve a route such as `/cars/12` to a vehicle id.
///
/// The last non-empty path segment must be an unsigned integer; query strings
/// and fragments are ignored.
pub fn resolve_route(route: &str) -> Option<VehicleId> {
    let path = route.split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .and_then(|segment| segment.trim().parse::<VehicleId>().ok())
}

/// Whether a route names no path segment at all (`""`, `/`, `/?car=`)
pub fn is_blank_route(route: &str) -> bool {
    let path = route.split(['?', '#']).next().unwrap_or_default();
    path.split('/').all(|segment| segment.trim().is_empty())
}

/// Normalize a catalog model path into an asset path.
///
/// Absolute URLs are kept as-is; site-root paths lose their leading slash.
pub fn normalize_asset_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    path.trim_start_matches('/').to_string()
}
