//! Viewer-facing error taxonomy

use thiserror::Error;

use crate::catalog::VehicleId;

/// The requested vehicle could not be selected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Route '{0}' does not name a vehicle")]
    UnresolvedRoute(String),
    #[error("Vehicle {0} not found")]
    NotFound(VehicleId),
}

/// A 3D asset could not be turned into a viewable model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetLoadError {
    #[error("Failed to load model {path}: {reason}")]
    Failed { path: String, reason: String },
    #[error("Model {path} has no scene")]
    NoScene { path: String },
    #[error("Model {path} contains no meshes")]
    NoMeshes { path: String },
}

impl AssetLoadError {
    /// Asset path the error refers to
    pub fn path(&self) -> &str {
        match self {
            AssetLoadError::Failed { path, .. }
            | AssetLoadError::NoScene { path }
            | AssetLoadError::NoMeshes { path } => path,
        }
    }
}
