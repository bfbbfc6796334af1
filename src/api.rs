//! HTTP adapter for the planning backend (optimizer and route history).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;
use crate::geo::Coordinate;
use crate::route::OptimizationResult;
use crate::traits::{RouteHistoryStore, RouteOptimizer};
use crate::waypoint::{PlaceInput, Waypoint};

const OPTIMIZE_PATH: &str = "/optimize";
const ROUTES_PATH: &str = "/routes";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ApiError {
    /// Text for the single notification shown to the user.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// A place as the backend expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacePayload {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl PlacePayload {
    /// `None` for places without coordinates.
    pub fn from_place(place: &PlaceInput) -> Option<Self> {
        let coord = place.coord?;
        Some(Self {
            name: place.name.clone(),
            address: place.address.clone(),
            lat: coord.lat,
            lng: coord.lon,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub places: Vec<PlacePayload>,
    pub starting_point: String,
    pub use_manual_order: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireCoords {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireWaypoint {
    pub id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub optimized_order: Vec<String>,
    pub distance_km: f64,
    pub duration_min: f64,
    #[serde(default)]
    pub polyline_outbound: Option<String>,
    #[serde(default)]
    pub polyline_return: Option<String>,
    pub start_point_coords: WireCoords,
    #[serde(default)]
    pub waypoints: Vec<WireWaypoint>,
}

impl From<WireWaypoint> for Waypoint {
    fn from(wire: WireWaypoint) -> Self {
        let coord = match (wire.lat, wire.lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        };
        Waypoint::new(wire.id, wire.address, coord)
    }
}

impl From<OptimizeResponse> for OptimizationResult {
    fn from(response: OptimizeResponse) -> Self {
        Self {
            optimized_order: response.optimized_order,
            distance_km: response.distance_km,
            duration_min: response.duration_min,
            polyline_outbound: response.polyline_outbound.filter(|s| !s.is_empty()),
            polyline_return: response.polyline_return.filter(|s| !s.is_empty()),
            start_point_coords: Coordinate::new(
                response.start_point_coords.lat,
                response.start_point_coords.lon,
            ),
            waypoints: response.waypoints.into_iter().map(Waypoint::from).collect(),
        }
    }
}

/// Route history entry for an authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRouteRequest {
    pub username: String,
    pub start_point: String,
    pub places: Vec<PlacePayload>,
    pub distance: f64,
    pub duration: f64,
    pub polyline_outbound: String,
    pub polyline_return: String,
}

/// Error body shapes the backend uses.
#[derive(Debug, Default, Deserialize)]
struct BackendErrorResponse {
    message: Option<String>,
    detail: Option<String>,
    error: Option<String>,
}

fn server_message(body: &str) -> Option<String> {
    let parsed: BackendErrorResponse = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.detail)
        .or(parsed.error)
        .filter(|message| !message.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Posts `body` as JSON and returns the response text of a 2xx reply.
    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<String, ApiError> {
        let url = self.endpoint(path);
        debug!(%url, "POST");

        let response = self.client.post(&url).json(body).send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: server_message(&text),
            });
        }
        Ok(text)
    }
}

impl RouteOptimizer for ApiClient {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, ApiError> {
        let body = self.post_json(OPTIMIZE_PATH, request)?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl RouteHistoryStore for ApiClient {
    fn save_route(&self, entry: &SaveRouteRequest) -> Result<(), ApiError> {
        self.post_json(ROUTES_PATH, entry).map(|_| ())
    }
}
