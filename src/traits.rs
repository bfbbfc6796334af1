//! Capability interfaces at the edges of the planner.
//!
//! These are intentionally minimal. The host application implements them
//! for its map SDK, HTTP stack, session storage and list widgets.

use crate::api::{ApiError, OptimizeRequest, OptimizeResponse, SaveRouteRequest};
use crate::geo::{Bounds, Coordinate};
use crate::map::{InitialView, LayerId, LineLayer, MarkerSpec};

/// A live map instance owned by the [`MapRenderer`](crate::map::MapRenderer).
///
/// Creation is asynchronous: after `create` returns `Ok`, the host reports
/// completion through `MapRenderer::on_loaded`.
pub trait MapHandle {
    type Error: std::error::Error;

    fn create(&mut self, view: &InitialView) -> Result<(), Self::Error>;

    /// Releases the underlying map. Must be safe to call on a handle whose
    /// `create` failed.
    fn destroy(&mut self);

    /// Replaces every marker on the map with `markers`.
    fn upsert_markers(&mut self, markers: &[MarkerSpec]);

    fn upsert_layer(&mut self, layer: &LineLayer);

    /// Removing a layer that is not on the map is a no-op.
    fn remove_layer(&mut self, id: LayerId);

    fn fly_to(&mut self, center: Coordinate, zoom: f64);

    fn fit_bounds(&mut self, bounds: Bounds, padding: f64, max_zoom: Option<f64>);
}

/// Computes a visiting order and the route geometry for a set of places.
pub trait RouteOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, ApiError>;
}

/// Persists planned routes to a user's history.
pub trait RouteHistoryStore {
    fn save_route(&self, entry: &SaveRouteRequest) -> Result<(), ApiError>;
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Session state injected into the planning screen.
pub trait SessionProvider {
    fn current_user(&self) -> Option<User>;

    /// Drops selections that only live until a route is planned.
    fn clear_ephemeral_selections(&mut self);
}

/// List reordering as seen from a drag-and-drop widget.
pub trait ReorderGesture {
    /// Returns false when dragging is not allowed for `index`.
    fn begin_reorder(&mut self, index: usize) -> bool;

    /// Returns true when the order changed.
    fn commit_reorder(&mut self, from: usize, to: usize) -> bool;

    fn cancel_reorder(&mut self);
}

/// Mobile bottom sheet holding the list.
pub trait BottomSheet {
    fn collapse(&mut self);
    fn expand(&mut self);
}
