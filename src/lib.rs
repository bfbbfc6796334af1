//! route-planner core
//!
//! Client-side route planning for a restaurant discovery app: decode the
//! optimizer's route geometry, keep an editable visiting order, and keep the
//! result list, map and bottom sheet in sync.

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod map;
pub mod params;
pub mod planner;
pub mod polyline;
pub mod reorder;
pub mod route;
pub mod sync;
pub mod traits;
pub mod waypoint;
