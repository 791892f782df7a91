//! Viewer session state machine
//!
//! One [`ViewerSession`] drives one mounted viewer:
//!
//! ```text
//!   Idle ──select──▶ Loading ──normalized──▶ Ready
//!     ▲                │  ▲                    │
//!     │              fail retry           select (new path)
//!     │                ▼  │                    │
//!     └──unmount──── Failed ◀──────────────────┘ (via Loading)
//!
//!   any ──select unknown id──▶ NotFound
//! ```
//!
//! Every load is stamped with a generation number. Results carrying an old
//! generation are dropped, so a slow load for a vehicle the user already
//! navigated away from can never touch the current session.
//!
//! Derived values are published as [`ViewerEvent`]s in a fixed order:
//! normalizing a model emits `GroundHeightChanged` and `FramingChanged`, and
//! every framing change is followed by `OrbitTargetChanged`. Consumers drain
//! them with [`ViewerSession::take_events`] once per frame.

use bevy_math::Vec3;
use std::collections::VecDeque;

use crate::bounds::BoundingVolume;
use crate::catalog::{is_blank_route, normalize_asset_path, resolve_route, CatalogRepository, VehicleId, VehicleRecord};
use crate::color::ColorSpec;
use crate::error::{AssetLoadError, SelectionError};
use crate::framing::{frame, FramingParameters};

/// Ground height before any model has been measured
pub const DEFAULT_GROUND_HEIGHT: f32 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerPhase {
    /// Nothing selected, or the selected vehicle has no model
    #[default]
    Idle,
    /// Model requested, not normalized yet
    Loading,
    /// Model normalized and framed
    Ready,
    /// Selected id is not in the catalog
    NotFound,
    /// Load or normalization failed; retry is possible
    Failed,
}

/// Identifies one load request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub generation: u64,
    /// Normalized asset path
    pub path: String,
}

/// Per-load normalization bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizationRecord {
    pub generation: u64,
    /// Set once the ground offset has been applied to this load's model
    pub is_position_set: bool,
    /// Pre-translation bounds
    pub bounds: Option<BoundingVolume>,
    pub offset: Vec3,
}

/// Notifications for the render side, in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// Start loading; drop any model from an older generation
    LoadRequested(LoadTicket),
    /// The current model was discarded (selection cleared or not found)
    ModelCleared,
    GroundHeightChanged(f32),
    FramingChanged(FramingParameters),
    OrbitTargetChanged(Vec3),
    /// Repaint the current model; only the latest request is kept
    RecolorRequested(ColorSpec),
}

#[derive(Debug, Clone)]
pub struct ViewerSession {
    phase: ViewerPhase,
    vehicle: Option<VehicleRecord>,
    ticket: Option<LoadTicket>,
    generation: u64,
    normalization: NormalizationRecord,
    framing: Option<FramingParameters>,
    ground_height: f32,
    color: ColorSpec,
    error: Option<AssetLoadError>,
    selection_error: Option<SelectionError>,
    events: VecDeque<ViewerEvent>,
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new(ColorSpec::default())
    }
}

impl ViewerSession {
    pub fn new(color: ColorSpec) -> Self {
        Self {
            phase: ViewerPhase::Idle,
            vehicle: None,
            ticket: None,
            generation: 0,
            normalization: NormalizationRecord::default(),
            framing: None,
            ground_height: DEFAULT_GROUND_HEIGHT,
            color,
            error: None,
            selection_error: None,
            events: VecDeque::new(),
        }
    }

    /// Resolve a route (e.g. `/cars/3`) and select the vehicle it names.
    ///
    /// A route without any path segment (`""`, `/`) clears the selection.
    pub fn select_route(
        &mut self,
        repo: &dyn CatalogRepository,
        route: &str,
    ) -> Result<Option<LoadTicket>, SelectionError> {
        if is_blank_route(route) {
            self.unmount();
            return Ok(None);
        }
        match resolve_route(route) {
            Some(id) => self.select(repo, id),
            None => {
                let err = SelectionError::UnresolvedRoute(route.to_string());
                self.enter_not_found(err.clone());
                Err(err)
            }
        }
    }

    /// Select a vehicle by id.
    ///
    /// Returns the ticket of the current load, or `None` when the vehicle has
    /// no model path (the viewer stays idle). Selecting the model that is
    /// already loading or shown keeps it as is.
    pub fn select(
        &mut self,
        repo: &dyn CatalogRepository,
        id: VehicleId,
    ) -> Result<Option<LoadTicket>, SelectionError> {
        let Some(record) = repo.find(id) else {
            let err = SelectionError::NotFound(id);
            self.enter_not_found(err.clone());
            return Err(err);
        };

        tracing::info!(vehicle = id, name = %record.name, "Vehicle selected");
        self.vehicle = Some(record.clone());
        self.selection_error = None;

        let path = normalize_asset_path(&record.model_path);
        if path.is_empty() {
            tracing::warn!(vehicle = id, "Vehicle has no model; viewer stays idle");
            self.invalidate();
            self.phase = ViewerPhase::Idle;
            self.events.push_back(ViewerEvent::ModelCleared);
            return Ok(None);
        }

        if matches!(self.phase, ViewerPhase::Loading | ViewerPhase::Ready) {
            if let Some(ticket) = self.ticket.as_ref().filter(|t| t.path == path) {
                tracing::debug!(generation = ticket.generation, path = %path, "Model already selected");
                return Ok(Some(ticket.clone()));
            }
        }

        Ok(Some(self.begin_load(path)))
    }

    /// Whether results for `generation` still belong to this session
    pub fn is_current(&self, generation: u64) -> bool {
        self.ticket
            .as_ref()
            .map(|t| t.generation == generation)
            .unwrap_or(false)
    }

    /// Whether the model for `generation` still has to be grounded
    pub fn needs_normalization(&self, generation: u64) -> bool {
        self.is_current(generation)
            && self.phase == ViewerPhase::Loading
            && !(self.normalization.generation == generation && self.normalization.is_position_set)
    }

    /// Record the measured bounds of the current model.
    ///
    /// Returns the offset to apply to the model root, or `None` when the
    /// generation is stale or the model was already normalized. Accepting the
    /// bounds moves the session to `Ready` and publishes ground height,
    /// framing, orbit target and the current color, in that order.
    pub fn record_normalization(&mut self, generation: u64, bounds: BoundingVolume) -> Option<Vec3> {
        if !self.needs_normalization(generation) {
            tracing::debug!(generation, "Ignoring normalization for stale or settled model");
            return None;
        }

        let offset = bounds.ground_offset();
        self.normalization = NormalizationRecord {
            generation,
            is_position_set: true,
            bounds: Some(bounds),
            offset,
        };

        self.ground_height = bounds.ground_height();
        self.events
            .push_back(ViewerEvent::GroundHeightChanged(self.ground_height));

        let framing = frame(&bounds);
        self.set_framing(framing);

        self.phase = ViewerPhase::Ready;
        self.request_recolor();

        tracing::info!(
            generation,
            size = bounds.size,
            degenerate = bounds.degenerate,
            "Model normalized and framed"
        );
        Some(offset)
    }

    /// Record a load failure for `generation`; stale failures are ignored.
    ///
    /// Returns `true` when the session moved to `Failed`.
    pub fn fail(&mut self, generation: u64, error: AssetLoadError) -> bool {
        if !self.is_current(generation) || self.phase != ViewerPhase::Loading {
            tracing::debug!(generation, error = %error, "Ignoring stale load failure");
            return false;
        }

        tracing::error!(generation, error = %error, "Model failed to load");
        self.phase = ViewerPhase::Failed;
        self.error = Some(error);
        true
    }

    /// Start a fresh load of the failed model
    pub fn retry(&mut self) -> Option<LoadTicket> {
        if self.phase != ViewerPhase::Failed {
            return None;
        }
        let path = self.ticket.as_ref()?.path.clone();
        tracing::info!(path = %path, "Retrying model load");
        Some(self.begin_load(path))
    }

    /// Change the paint color. Last write wins.
    ///
    /// Returns `true` when the color changed.
    pub fn set_color(&mut self, color: ColorSpec) -> bool {
        if self.color == color {
            return false;
        }
        self.color = color;
        if self.phase == ViewerPhase::Ready {
            self.request_recolor();
        }
        true
    }

    /// Tear the viewer down; pending loads become stale
    pub fn unmount(&mut self) {
        self.invalidate();
        self.vehicle = None;
        self.selection_error = None;
        self.phase = ViewerPhase::Idle;
        self.events.clear();
        self.events.push_back(ViewerEvent::ModelCleared);
    }

    /// Drain pending events in emission order
    pub fn take_events(&mut self) -> Vec<ViewerEvent> {
        self.events.drain(..).collect()
    }

    pub fn phase(&self) -> ViewerPhase {
        self.phase
    }

    pub fn vehicle(&self) -> Option<&VehicleRecord> {
        self.vehicle.as_ref()
    }

    pub fn current_ticket(&self) -> Option<&LoadTicket> {
        self.ticket.as_ref()
    }

    pub fn normalization(&self) -> &NormalizationRecord {
        &self.normalization
    }

    pub fn framing(&self) -> Option<&FramingParameters> {
        self.framing.as_ref()
    }

    pub fn ground_height(&self) -> f32 {
        self.ground_height
    }

    pub fn color(&self) -> ColorSpec {
        self.color
    }

    pub fn error(&self) -> Option<&AssetLoadError> {
        self.error.as_ref()
    }

    pub fn selection_error(&self) -> Option<&SelectionError> {
        self.selection_error.as_ref()
    }

    /// The spinner overlay is shown only while a model is loading
    pub fn loading_indicator_visible(&self) -> bool {
        self.phase == ViewerPhase::Loading
    }

    fn begin_load(&mut self, path: String) -> LoadTicket {
        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            path,
        };

        self.ticket = Some(ticket.clone());
        self.normalization = NormalizationRecord {
            generation: ticket.generation,
            ..Default::default()
        };
        self.error = None;
        self.phase = ViewerPhase::Loading;
        // Only the newest load is worth starting
        self.events.retain(|e| {
            !matches!(
                e,
                ViewerEvent::LoadRequested(_) | ViewerEvent::RecolorRequested(_)
            )
        });
        self.events.push_back(ViewerEvent::LoadRequested(ticket.clone()));

        tracing::debug!(generation = ticket.generation, path = %ticket.path, "Load requested");
        ticket
    }

    /// Framing edge: every framing change re-targets the orbit control
    fn set_framing(&mut self, framing: FramingParameters) {
        self.framing = Some(framing);
        self.events.push_back(ViewerEvent::FramingChanged(framing));
        self.events
            .push_back(ViewerEvent::OrbitTargetChanged(framing.target));
    }

    fn request_recolor(&mut self) {
        self.events
            .retain(|e| !matches!(e, ViewerEvent::RecolorRequested(_)));
        self.events
            .push_back(ViewerEvent::RecolorRequested(self.color));
    }

    fn enter_not_found(&mut self, err: SelectionError) {
        tracing::warn!(error = %err, "Vehicle selection failed");
        self.invalidate();
        self.vehicle = None;
        self.selection_error = Some(err);
        self.phase = ViewerPhase::NotFound;
        self.events.push_back(ViewerEvent::ModelCleared);
    }

    /// Make every outstanding load stale
    fn invalidate(&mut self) {
        self.generation += 1;
        self.ticket = None;
        self.normalization = NormalizationRecord::default();
        self.framing = None;
        self.error = None;
        self.events.retain(|e| {
            !matches!(
                e,
                ViewerEvent::LoadRequested(_) | ViewerEvent::RecolorRequested(_)
            )
        });
    }
}
