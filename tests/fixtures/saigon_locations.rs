//! Real Ho Chi Minh City eateries for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

use route_planner::geo::Coordinate;
use route_planner::waypoint::PlaceInput;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            name,
            address,
            lat,
            lng,
        }
    }

    pub fn coord(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    pub fn place(&self) -> PlaceInput {
        PlaceInput::new(self.name, self.address, Some(self.coord()))
    }
}

// ============================================================================
// Starting points
// ============================================================================

pub const BEN_THANH_MARKET: Location =
    Location::new("Ben Thanh Market", "Le Loi, District 1", 10.7725, 106.6980);

// ============================================================================
// District 1 / District 3 restaurants
// ============================================================================

pub const RESTAURANTS: &[Location] = &[
    Location::new("Pho Hoa Pasteur", "260C Pasteur, District 3", 10.7893, 106.6893),
    Location::new("Banh Mi Huynh Hoa", "26 Le Thi Rieng, District 1", 10.7718, 106.6925),
    Location::new("Com Tam Ba Ghien", "84 Dang Van Ngu, Phu Nhuan", 10.7925, 106.6707),
    Location::new("Oc Dao", "212B Nguyen Trai, District 1", 10.7665, 106.6887),
    Location::new("Bun Cha 145", "145 Bui Vien, District 1", 10.7672, 106.6934),
];

pub fn restaurant_places(count: usize) -> Vec<PlaceInput> {
    RESTAURANTS.iter().take(count).map(Location::place).collect()
}
