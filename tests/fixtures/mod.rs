//! Test fixtures for route-planner.
//!
//! Provides:
//! - Real Ho Chi Minh City locations
//! - Recording / stub implementations of the capability traits

#![allow(dead_code)]

pub mod saigon_locations;

use std::cell::RefCell;
use std::collections::VecDeque;

use route_planner::api::{
    ApiError, OptimizeRequest, OptimizeResponse, SaveRouteRequest, WireCoords, WireWaypoint,
};
use route_planner::geo::{Bounds, Coordinate};
use route_planner::map::{InitialView, LayerId, LineLayer, MarkerSpec};
use route_planner::traits::{MapHandle, RouteHistoryStore, RouteOptimizer, SessionProvider, User};
use route_planner::waypoint::PlaceInput;

pub use saigon_locations::*;

/// Polyline sample with three points.
pub const SAMPLE_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";
/// First two points of the sample.
pub const SHORT_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC";

// ============================================================================
// Map handle
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    Create,
    Destroy,
    Markers(Vec<MarkerSpec>),
    Layer(LineLayer),
    Remove(LayerId),
    FlyTo(Coordinate, f64),
    Fit(Bounds, f64, Option<f64>),
}

#[derive(Debug, thiserror::Error)]
#[error("WebGL unavailable")]
pub struct MapUnavailable;

#[derive(Debug, Default)]
pub struct RecordingMap {
    pub calls: Vec<MapCall>,
    pub fail_create: bool,
}

impl RecordingMap {
    pub fn last_markers(&self) -> Option<&[MarkerSpec]> {
        self.calls.iter().rev().find_map(|call| match call {
            MapCall::Markers(markers) => Some(markers.as_slice()),
            _ => None,
        })
    }

    pub fn last_layer(&self, id: LayerId) -> Option<&LineLayer> {
        self.calls.iter().rev().find_map(|call| match call {
            MapCall::Layer(layer) if layer.id == id => Some(layer),
            _ => None,
        })
    }

    pub fn last_camera(&self) -> Option<&MapCall> {
        self.calls
            .iter()
            .rev()
            .find(|call| matches!(call, MapCall::FlyTo(..) | MapCall::Fit(..)))
    }

    pub fn count(&self, pred: impl Fn(&MapCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }
}

impl MapHandle for RecordingMap {
    type Error = MapUnavailable;

    fn create(&mut self, _view: &InitialView) -> Result<(), MapUnavailable> {
        self.calls.push(MapCall::Create);
        if self.fail_create {
            Err(MapUnavailable)
        } else {
            Ok(())
        }
    }

    fn destroy(&mut self) {
        self.calls.push(MapCall::Destroy);
    }

    fn upsert_markers(&mut self, markers: &[MarkerSpec]) {
        self.calls.push(MapCall::Markers(markers.to_vec()));
    }

    fn upsert_layer(&mut self, layer: &LineLayer) {
        self.calls.push(MapCall::Layer(layer.clone()));
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.calls.push(MapCall::Remove(id));
    }

    fn fly_to(&mut self, center: Coordinate, zoom: f64) {
        self.calls.push(MapCall::FlyTo(center, zoom));
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: f64, max_zoom: Option<f64>) {
        self.calls.push(MapCall::Fit(bounds, padding, max_zoom));
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Canned optimizer reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(OptimizeResponse),
    Status(u16, Option<&'static str>),
    Malformed,
}

impl Reply {
    fn into_result(self) -> Result<OptimizeResponse, ApiError> {
        match self {
            Reply::Ok(response) => Ok(response),
            Reply::Status(status, message) => Err(ApiError::Status {
                status,
                message: message.map(str::to_string),
            }),
            Reply::Malformed => Err(serde_json::from_str::<OptimizeResponse>("{\"optimized_order\": 3}")
                .expect_err("payload is malformed")
                .into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct StubOptimizer {
    replies: RefCell<VecDeque<Reply>>,
    pub requests: RefCell<Vec<OptimizeRequest>>,
}

impl StubOptimizer {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into_iter().collect()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl RouteOptimizer for StubOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(Reply::Status(503, None))
            .into_result()
    }
}

#[derive(Debug, Default)]
pub struct RecordingHistory {
    pub saved: RefCell<Vec<SaveRouteRequest>>,
    pub fail: bool,
}

impl RecordingHistory {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl RouteHistoryStore for RecordingHistory {
    fn save_route(&self, entry: &SaveRouteRequest) -> Result<(), ApiError> {
        self.saved.borrow_mut().push(entry.clone());
        if self.fail {
            Err(ApiError::Status {
                status: 500,
                message: None,
            })
        } else {
            Ok(())
        }
    }
}

/// Optimizer reply visiting `order`, with coordinates looked up in `places`.
pub fn response_for(order: &[&str], places: &[PlaceInput], outbound: &str, ret: &str) -> OptimizeResponse {
    let waypoints = order
        .iter()
        .filter_map(|name| places.iter().find(|p| p.name == *name))
        .map(|place| WireWaypoint {
            id: place.name.clone(),
            address: Some(place.address.clone()),
            lat: place.coord.map(|c| c.lat),
            lon: place.coord.map(|c| c.lon),
        })
        .collect();

    OptimizeResponse {
        optimized_order: order.iter().map(|s| s.to_string()).collect(),
        distance_km: 12.4,
        duration_min: 37.2,
        polyline_outbound: Some(outbound.to_string()),
        polyline_return: Some(ret.to_string()),
        start_point_coords: WireCoords {
            lat: BEN_THANH_MARKET.lat,
            lon: BEN_THANH_MARKET.lng,
        },
        waypoints,
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Default)]
pub struct FakeSession {
    pub user: Option<User>,
    pub cleared: usize,
}

impl FakeSession {
    pub fn signed_in(username: &str) -> Self {
        Self {
            user: Some(User::new(username)),
            cleared: 0,
        }
    }
}

impl SessionProvider for FakeSession {
    fn current_user(&self) -> Option<User> {
        self.user.clone()
    }

    fn clear_ephemeral_selections(&mut self) {
        self.cleared += 1;
    }
}
