//! Showroom Core - Catalog types, model framing, and viewer session state
//!
//! This crate holds everything about the vehicle viewer that does not need a
//! renderer:
//! - Vehicle catalog records and route resolution
//! - Paint color parsing
//! - Bounding volume measurement and the camera framing policy
//! - Orbit camera state
//! - The path-keyed asset cache and the per-viewer session state machine

pub mod bounds;
pub mod cache;
pub mod catalog;
pub mod color;
pub mod error;
pub mod framing;
pub mod orbit;
pub mod session;

pub use bounds::{BoundingVolume, BoundsAccumulator, DegenerateGeometryError};
pub use cache::{AssetCache, AssetStatus};
pub use catalog::{Catalog, CatalogError, CatalogRepository, VehicleId, VehicleRecord, VehicleSpecs};
pub use color::{ColorError, ColorSpec};
pub use error::{AssetLoadError, SelectionError};
pub use framing::{frame, FramingParameters};
pub use orbit::OrbitState;
pub use session::{LoadTicket, NormalizationRecord, ViewerEvent, ViewerPhase, ViewerSession};
