//! Waypoint model shared by the list UI and the map.
//!
//! Place records arrive in several shapes (parsed input parameters,
//! optimizer waypoints). [`build_waypoints`] folds them into one ordered
//! sequence with the start always at index 0.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Identifier given to the synthetic start waypoint.
pub const START_ID: &str = "start";

/// A place selected for the trip, before optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceInput {
    pub name: String,
    pub address: String,
    /// `None` when the input carried no usable coordinate.
    pub coord: Option<Coordinate>,
}

impl PlaceInput {
    pub fn new(name: impl Into<String>, address: impl Into<String>, coord: Option<Coordinate>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            coord,
        }
    }
}

/// A single stop in visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: String,
    pub address: Option<String>,
    pub coord: Option<Coordinate>,
}

impl Waypoint {
    pub fn new(id: impl Into<String>, address: Option<String>, coord: Option<Coordinate>) -> Self {
        Self {
            id: id.into(),
            address,
            coord,
        }
    }

    pub fn is_start(&self) -> bool {
        self.id == START_ID
    }

    /// Text shown under the marker title: the address when known, else the id.
    pub fn description(&self) -> &str {
        match self.address.as_deref() {
            Some(address) if !address.is_empty() => address,
            _ => self.id.as_str(),
        }
    }
}

/// Where the trip starts and ends.
#[derive(Debug, Clone, PartialEq)]
pub struct StartPoint {
    pub label: String,
    pub coord: Option<Coordinate>,
}

impl StartPoint {
    pub fn new(label: impl Into<String>, coord: Option<Coordinate>) -> Self {
        Self {
            label: label.into(),
            coord,
        }
    }
}

/// Anything that can be placed on the route as a stop.
pub trait PlaceLike {
    fn label(&self) -> &str;
    fn address(&self) -> Option<&str>;
    fn coordinate(&self) -> Option<Coordinate>;
}

impl PlaceLike for PlaceInput {
    fn label(&self) -> &str {
        &self.name
    }

    fn address(&self) -> Option<&str> {
        Some(&self.address)
    }

    fn coordinate(&self) -> Option<Coordinate> {
        self.coord
    }
}

impl PlaceLike for Waypoint {
    fn label(&self) -> &str {
        &self.id
    }

    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn coordinate(&self) -> Option<Coordinate> {
        self.coord
    }
}

/// Builds the rendered sequence: the start at index 0, then the stops in
/// the given order.
pub fn build_waypoints<P: PlaceLike>(start: &StartPoint, stops: &[P]) -> Vec<Waypoint> {
    let mut waypoints = Vec::with_capacity(stops.len() + 1);
    waypoints.push(Waypoint::new(START_ID, Some(start.label.clone()), start.coord));
    waypoints.extend(stops.iter().map(|stop| {
        Waypoint::new(
            stop.label(),
            stop.address().map(str::to_string),
            stop.coordinate(),
        )
    }));
    waypoints
}

/// Names of stops that cannot be placed on the map.
pub fn missing_coordinates<P: PlaceLike>(places: &[P]) -> Vec<String> {
    places
        .iter()
        .filter(|place| place.coordinate().is_none())
        .map(|place| place.label().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn places() -> Vec<PlaceInput> {
        vec![
            PlaceInput::new("A", "addrA", Some(Coordinate::new(10.1, 106.1))),
            PlaceInput::new("B", "addrB", None),
        ]
    }

    #[test]
    fn test_start_is_first() {
        let start = StartPoint::new("Home", Some(Coordinate::new(10.0, 106.0)));
        let waypoints = build_waypoints(&start, &places());

        assert_eq!(waypoints.len(), 3);
        assert!(waypoints[0].is_start());
        assert_eq!(waypoints[0].address.as_deref(), Some("Home"));
        assert_eq!(waypoints[1].id, "A");
        assert_eq!(waypoints[2].id, "B");
    }

    #[test]
    fn test_missing_coordinate_is_kept_as_none() {
        let start = StartPoint::new("Home", None);
        let waypoints = build_waypoints(&start, &places());
        assert_eq!(waypoints[0].coord, None);
        assert_eq!(waypoints[2].coord, None);
        assert_eq!(missing_coordinates(&places()), vec!["B".to_string()]);
    }

    #[test]
    fn test_no_stops() {
        let start = StartPoint::new("Home", None);
        let waypoints = build_waypoints::<PlaceInput>(&start, &[]);
        assert_eq!(waypoints.len(), 1);
    }

    #[test]
    fn test_description_falls_back_to_id() {
        let waypoint = Waypoint::new("Pho 24", None, None);
        assert_eq!(waypoint.description(), "Pho 24");
        let waypoint = Waypoint::new("Pho 24", Some("5 Nguyen Hue".into()), None);
        assert_eq!(waypoint.description(), "5 Nguyen Hue");
    }
}
