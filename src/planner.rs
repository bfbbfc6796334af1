//! The route-planning screen.
//!
//! [`RoutePlanner`] owns the place list, the current optimization, the map
//! renderer and the view state. Optimization is single-flight: a ticket is
//! issued by [`RoutePlanner::begin_optimize`] and only the outstanding
//! ticket may complete. Results are applied in one step, failures leave the
//! previous result untouched.

use tracing::{debug, info, warn};

use crate::api::{ApiError, OptimizeRequest, OptimizeResponse, PlacePayload, SaveRouteRequest};
use crate::config::PlannerConfig;
use crate::error::{ConfigError, OptimizeError, ValidationError};
use crate::geo::Coordinate;
use crate::map::{LayerId, MapError, MapRenderer};
use crate::params::PlanningParams;
use crate::polyline::PolylineCodec;
use crate::reorder::{OrderingMode, ReorderController};
use crate::route::{OptimizationResult, PlannedRoute};
use crate::sync::{Layout, SheetState, SnapLevel, ViewSync};
use crate::traits::{
    BottomSheet, MapHandle, ReorderGesture, RouteHistoryStore, RouteOptimizer, SessionProvider, User,
};
use crate::waypoint::{PlaceInput, StartPoint, build_waypoints, missing_coordinates};

const OPTIMIZE_FAILED: &str = "Could not optimize the route.";
const OPTIMIZED: &str = "Route optimized.";
const SAVE_FAILED: &str = "Could not save the route.";
const SAVED: &str = "Route saved.";

/// User-facing message, drained by the host and shown as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    LoginRequired,
    NothingToSave,
    Failed,
}

/// An outstanding optimize request.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeTicket {
    generation: u64,
    starting_point: String,
    request: OptimizeRequest,
}

impl OptimizeTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &OptimizeRequest {
        &self.request
    }
}

pub struct RoutePlanner<H: MapHandle, S: SessionProvider> {
    session: S,
    codec: PolylineCodec,
    starting_point: String,
    places: ReorderController,
    route: Option<PlannedRoute>,
    map: MapRenderer<H>,
    view: ViewSync,
    sheet: SheetState,
    generation: u64,
    in_flight: Option<u64>,
    closed: bool,
    notifications: Vec<Notification>,
}

impl<H: MapHandle, S: SessionProvider> RoutePlanner<H, S> {
    pub fn new(
        config: &PlannerConfig,
        params: PlanningParams,
        handle: H,
        session: S,
        layout: Layout,
    ) -> Result<Self, ConfigError> {
        let mut planner = Self {
            session,
            codec: config.codec()?,
            starting_point: params.starting_point.unwrap_or_default(),
            places: ReorderController::new(params.places),
            route: None,
            map: MapRenderer::new(handle, config.map),
            view: ViewSync::new(layout),
            sheet: SheetState::new(config.snap_threshold),
            generation: 0,
            in_flight: None,
            closed: false,
            notifications: Vec::new(),
        };
        planner.refresh_preview();
        Ok(planner)
    }

    // ------------------------------------------------------------------
    // Map lifecycle
    // ------------------------------------------------------------------

    pub fn mount_map(&mut self) -> Result<(), MapError> {
        self.map.mount()
    }

    pub fn on_map_loaded(&mut self) {
        self.map.on_loaded();
    }

    pub fn on_map_load_failed(&mut self, message: impl Into<String>) -> MapError {
        self.map.on_load_failed(message)
    }

    /// Leaves the screen: releases the map and abandons any request.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        debug!("closing route planner");
        self.closed = true;
        self.in_flight = None;
        self.places.set_locked(false);
        self.map.teardown();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn starting_point(&self) -> &str {
        &self.starting_point
    }

    pub fn places(&self) -> &[PlaceInput] {
        self.places.places()
    }

    pub fn ordering_mode(&self) -> OrderingMode {
        self.places.mode()
    }

    /// Reordering is only offered until a result is shown.
    pub fn can_drag(&self) -> bool {
        self.route.is_none() && self.places.can_drag()
    }

    pub fn route(&self) -> Option<&PlannedRoute> {
        self.route.as_ref()
    }

    pub fn map(&self) -> &MapRenderer<H> {
        &self.map
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn focus(&self) -> Option<Coordinate> {
        self.view.focus()
    }

    pub fn sheet_level(&self) -> SnapLevel {
        self.sheet.level()
    }

    /// True while a request is outstanding; the trigger should be disabled.
    pub fn is_optimizing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn set_starting_point(&mut self, text: impl Into<String>) {
        self.starting_point = text.into();
    }

    /// The starting-point field gained focus.
    pub fn focus_starting_point_input(&mut self) {
        if self.view.layout() == Layout::Mobile {
            self.sheet.collapse();
        }
    }

    pub fn toggle_manual_mode(&mut self, enabled: bool) {
        self.places.toggle_manual_mode(enabled);
    }

    pub fn begin_drag(&mut self, index: usize) -> bool {
        if self.route.is_some() {
            debug!(index, "drag ignored, route already planned");
            return false;
        }
        self.places.begin_reorder(index)
    }

    pub fn commit_drag(&mut self, from: usize, to: usize) -> bool {
        if self.route.is_some() {
            self.places.cancel_reorder();
            debug!(from, to, "drag ignored, route already planned");
            return false;
        }
        let moved = self.places.commit_reorder(from, to);
        if moved {
            self.refresh_preview();
        }
        moved
    }

    pub fn cancel_drag(&mut self) {
        self.places.cancel_reorder();
    }

    pub fn tap_sheet_handle(&mut self) -> SnapLevel {
        self.sheet.tap()
    }

    pub fn release_sheet_drag(&mut self, delta_y: f64, viewport_height: f64) -> SnapLevel {
        self.sheet.release(delta_y, viewport_height)
    }

    // ------------------------------------------------------------------
    // Optimization
    // ------------------------------------------------------------------

    /// Validates the input and issues the ticket for a new request.
    pub fn begin_optimize(&mut self) -> Result<OptimizeTicket, OptimizeError> {
        if self.closed {
            return Err(OptimizeError::Closed);
        }
        if self.in_flight.is_some() {
            return Err(OptimizeError::InFlight);
        }

        let request = match self.build_request() {
            Ok(request) => request,
            Err(err) => {
                self.notify(Notification::Error(err.to_string()));
                return Err(err.into());
            }
        };

        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.places.set_locked(true);
        self.sheet.collapse();

        info!(
            generation = self.generation,
            places = request.places.len(),
            manual = request.use_manual_order,
            "optimizing route"
        );

        Ok(OptimizeTicket {
            generation: self.generation,
            starting_point: request.starting_point.clone(),
            request,
        })
    }

    /// Applies the response for `ticket`. Responses for superseded tickets
    /// or arriving after [`close`](Self::close) are dropped.
    pub fn complete_optimize<R: RouteHistoryStore>(
        &mut self,
        ticket: OptimizeTicket,
        response: Result<OptimizeResponse, ApiError>,
        history: &R,
    ) -> Result<&PlannedRoute, OptimizeError> {
        if self.closed {
            debug!(generation = ticket.generation, "discarding response after close");
            return Err(OptimizeError::Closed);
        }
        if self.in_flight != Some(ticket.generation) {
            debug!(generation = ticket.generation, "discarding stale response");
            return Err(OptimizeError::Stale);
        }
        self.in_flight = None;
        self.places.set_locked(false);

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(generation = ticket.generation, error = %err, "route optimization failed");
                self.notify(Notification::Error(err.user_message(OPTIMIZE_FAILED)));
                return Err(err.into());
            }
        };

        let planned = PlannedRoute::new(
            &ticket.starting_point,
            OptimizationResult::from(response),
            &self.codec,
        );
        info!(
            generation = ticket.generation,
            stops = planned.result().optimized_order.len(),
            distance_km = planned.result().distance_km,
            "route optimized"
        );

        self.view.clear_focus();
        self.map.set_focus(None);
        self.map.show_route(&planned);
        self.notify(Notification::Success(OPTIMIZED.to_string()));
        self.session.clear_ephemeral_selections();
        self.sheet.expand();
        self.record_history(&planned, history);

        Ok(&*self.route.insert(planned))
    }

    /// Runs a full request synchronously.
    pub fn optimize<O, R>(&mut self, optimizer: &O, history: &R) -> Result<&PlannedRoute, OptimizeError>
    where
        O: RouteOptimizer,
        R: RouteHistoryStore,
    {
        let ticket = self.begin_optimize()?;
        let response = optimizer.optimize(ticket.request());
        self.complete_optimize(ticket, response, history)
    }

    // ------------------------------------------------------------------
    // Result list and map focus
    // ------------------------------------------------------------------

    /// A result row was tapped; focuses the map on its waypoint.
    pub fn activate_list_item(&mut self, index: usize) -> Option<Coordinate> {
        let route = self.route.as_ref()?;
        let focus = self
            .view
            .on_list_item_activated(route, index, Some(&mut self.sheet))?;
        self.map.set_focus(Some(focus));
        Some(focus)
    }

    pub fn dismiss_focus(&mut self) {
        self.view.clear_focus();
        self.map.set_focus(None);
    }

    // ------------------------------------------------------------------
    // Route history
    // ------------------------------------------------------------------

    /// Explicit "save route" action.
    pub fn save_route<R: RouteHistoryStore>(&mut self, history: &R) -> SaveOutcome {
        let Some(user) = self.session.current_user() else {
            return SaveOutcome::LoginRequired;
        };
        let Some(route) = self.route.as_ref() else {
            return SaveOutcome::NothingToSave;
        };

        let entry = self.history_entry(&user, route);
        match history.save_route(&entry) {
            Ok(()) => {
                self.notify(Notification::Success(SAVED.to_string()));
                SaveOutcome::Saved
            }
            Err(err) => {
                warn!(error = %err, "saving route failed");
                self.notify(Notification::Error(SAVE_FAILED.to_string()));
                SaveOutcome::Failed
            }
        }
    }

    /// Best-effort history entry after a successful optimization.
    fn record_history<R: RouteHistoryStore>(&self, route: &PlannedRoute, history: &R) {
        let Some(user) = self.session.current_user() else {
            return;
        };
        let entry = self.history_entry(&user, route);
        if let Err(err) = history.save_route(&entry) {
            warn!(user = %user.username, error = %err, "route history not recorded");
        }
    }

    fn history_entry(&self, user: &User, route: &PlannedRoute) -> SaveRouteRequest {
        let result = route.result();
        SaveRouteRequest {
            username: user.username.clone(),
            start_point: route.starting_point().to_string(),
            places: self
                .places
                .places()
                .iter()
                .filter_map(PlacePayload::from_place)
                .collect(),
            distance: result.distance_km,
            duration: result.duration_min,
            polyline_outbound: result.polyline_outbound.clone().unwrap_or_default(),
            polyline_return: result.polyline_return.clone().unwrap_or_default(),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn build_request(&self) -> Result<OptimizeRequest, ValidationError> {
        let starting_point = self.starting_point.trim();
        if starting_point.is_empty() {
            return Err(ValidationError::EmptyStartingPoint);
        }
        if self.places.is_empty() {
            return Err(ValidationError::NoPlaces);
        }
        let missing = missing_coordinates(self.places.places());
        if !missing.is_empty() {
            return Err(ValidationError::MissingCoordinates(missing));
        }

        Ok(OptimizeRequest {
            places: self
                .places
                .places()
                .iter()
                .filter_map(PlacePayload::from_place)
                .collect(),
            starting_point: starting_point.to_string(),
            use_manual_order: self.places.manual_mode_enabled(),
        })
    }

    /// Before the first result the map previews the selected places.
    fn refresh_preview(&mut self) {
        if self.route.is_some() {
            return;
        }
        let start = StartPoint::new(self.starting_point.clone(), None);
        self.map
            .set_waypoints(build_waypoints(&start, self.places.places()));
        for layer in LayerId::ALL {
            self.map.set_geometry(layer, None);
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
