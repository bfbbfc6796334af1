//! Optimization results and everything derived from them.

use std::fmt;

use crate::geo::Coordinate;
use crate::map::LayerId;
use crate::polyline::{Polyline, PolylineCodec};
use crate::waypoint::{StartPoint, Waypoint, build_waypoints};

/// One successful optimizer reply. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// Place names in visiting order.
    pub optimized_order: Vec<String>,
    pub distance_km: f64,
    pub duration_min: f64,
    pub polyline_outbound: Option<String>,
    pub polyline_return: Option<String>,
    pub start_point_coords: Coordinate,
    /// Stops in visiting order, start excluded.
    pub waypoints: Vec<Waypoint>,
}

/// A row of the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEntry {
    Start(String),
    Stop { number: usize, name: String },
    End(String),
}

impl DisplayEntry {
    /// Start and end rows are the two synthetic boundary entries.
    pub fn is_boundary(&self) -> bool {
        !matches!(self, DisplayEntry::Stop { .. })
    }
}

impl fmt::Display for DisplayEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayEntry::Start(label) => write!(f, "Start: {label}"),
            DisplayEntry::Stop { number, name } => write!(f, "{number}. {name}"),
            DisplayEntry::End(label) => write!(f, "End: {label}"),
        }
    }
}

/// Start row, numbered stops, end row.
pub fn display_entries(starting_point: &str, order: &[String]) -> Vec<DisplayEntry> {
    let mut entries = Vec::with_capacity(order.len() + 2);
    entries.push(DisplayEntry::Start(starting_point.to_string()));
    entries.extend(order.iter().enumerate().map(|(i, name)| DisplayEntry::Stop {
        number: i + 1,
        name: name.clone(),
    }));
    entries.push(DisplayEntry::End(starting_point.to_string()));
    entries
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_min: f64,
}

impl RouteSummary {
    pub fn distance_label(&self) -> String {
        format!("{:.1} km", self.distance_km)
    }

    pub fn duration_label(&self) -> String {
        format!("{} min", self.duration_min.round() as i64)
    }
}

impl fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} · {}", self.distance_label(), self.duration_label())
    }
}

/// The current optimization plus the state derived from it.
///
/// Built in one step so the list, the markers and both geometries always
/// come from the same result.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    starting_point: String,
    result: OptimizationResult,
    entries: Vec<DisplayEntry>,
    waypoints: Vec<Waypoint>,
    outbound: Polyline,
    return_geometry: Polyline,
}

impl PlannedRoute {
    pub fn new(starting_point: &str, result: OptimizationResult, codec: &PolylineCodec) -> Self {
        let entries = display_entries(starting_point, &result.optimized_order);
        let start = StartPoint::new(starting_point, Some(result.start_point_coords));
        let waypoints = build_waypoints(&start, &result.waypoints);
        let decode = |layer: LayerId, encoded: Option<&str>| {
            encoded
                .map(|encoded| codec.decode_or_empty(layer.name(), encoded))
                .unwrap_or_default()
        };
        let outbound = decode(LayerId::Outbound, result.polyline_outbound.as_deref());
        let return_geometry = decode(LayerId::Return, result.polyline_return.as_deref());

        Self {
            starting_point: starting_point.to_string(),
            result,
            entries,
            waypoints,
            outbound,
            return_geometry,
        }
    }

    pub fn starting_point(&self) -> &str {
        &self.starting_point
    }

    pub fn result(&self) -> &OptimizationResult {
        &self.result
    }

    pub fn entries(&self) -> &[DisplayEntry] {
        &self.entries
    }

    pub fn display_lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Start at index 0, then the stops in visiting order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn geometry(&self, layer: LayerId) -> &Polyline {
        match layer {
            LayerId::Outbound => &self.outbound,
            LayerId::Return => &self.return_geometry,
        }
    }

    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            distance_km: self.result.distance_km,
            duration_min: self.result.duration_min,
        }
    }

    /// Maps a result-list row to its waypoint. Both boundary rows map to the
    /// start; stop row `p` maps to waypoint `p`.
    pub fn waypoint_index_for_entry(&self, display_index: usize) -> Option<usize> {
        let entry = self.entries.get(display_index)?;
        if entry.is_boundary() {
            return Some(0);
        }
        (display_index < self.waypoints.len()).then_some(display_index)
    }

    pub fn waypoint_for_entry(&self, display_index: usize) -> Option<&Waypoint> {
        self.waypoint_index_for_entry(display_index)
            .and_then(|index| self.waypoints.get(index))
    }
}
