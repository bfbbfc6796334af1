//! Map renderer: owns the map handle and keeps markers, route layers and
//! the camera in step with the planner state.
//!
//! Lifecycle is `Uninitialized -> Loading -> Ready`, with `Failed` as a
//! persistent error state when the map cannot be created or loaded. Scene
//! changes made before `Ready` are stored and rendered once the map loads.

use thiserror::Error;
use tracing::{debug, error};

use crate::geo::{Bounds, Coordinate};
use crate::polyline::Polyline;
use crate::route::PlannedRoute;
use crate::traits::MapHandle;
use crate::waypoint::Waypoint;

const LINE_WIDTH: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    Outbound,
    Return,
}

impl LayerId {
    pub const ALL: [LayerId; 2] = [LayerId::Outbound, LayerId::Return];

    pub fn name(&self) -> &'static str {
        match self {
            LayerId::Outbound => "route-outbound",
            LayerId::Return => "route-return",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            LayerId::Outbound => "#16a34a",
            LayerId::Return => "#f97316",
        }
    }

    fn slot(&self) -> usize {
        match self {
            LayerId::Outbound => 0,
            LayerId::Return => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Bottom,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Pin glyph for the trip start.
    Start,
    /// Numbered circle, 1-based.
    Stop(usize),
}

impl MarkerKind {
    pub fn anchor(&self) -> Anchor {
        match self {
            MarkerKind::Start => Anchor::Bottom,
            MarkerKind::Stop(_) => Anchor::Center,
        }
    }

    pub fn title(&self) -> String {
        match self {
            MarkerKind::Start => "Start".to_string(),
            MarkerKind::Stop(number) => format!("Stop {number}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub kind: MarkerKind,
    pub anchor: Anchor,
    pub position: Coordinate,
    /// Popup heading.
    pub title: String,
    /// Popup body (address or identifier).
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayer {
    pub id: LayerId,
    /// `(longitude, latitude)` pairs.
    pub coordinates: Vec<(f64, f64)>,
    pub color: &'static str,
    pub width: f64,
}

impl LineLayer {
    fn from_polyline(id: LayerId, polyline: &Polyline) -> Self {
        Self {
            id,
            coordinates: polyline.lon_lat(),
            color: id.color(),
            width: LINE_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialView {
    pub center: Coordinate,
    pub zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSettings {
    pub initial_center: Coordinate,
    pub initial_zoom: f64,
    /// Zoom used when flying to a focus point.
    pub focus_zoom: f64,
    /// Padding in pixels around fitted bounds.
    pub fit_padding: f64,
    /// Cap when fitting to markers alone.
    pub marker_max_zoom: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            initial_center: Coordinate::new(10.7769, 106.7009),
            initial_zoom: 12.0,
            focus_zoom: 16.0,
            fit_padding: 60.0,
            marker_max_zoom: 14.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapState {
    Uninitialized,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map is already mounted")]
    AlreadyMounted,
    #[error("map could not be created: {0}")]
    Create(String),
    #[error("map failed to load: {0}")]
    Load(String),
}

/// Marker list for a waypoint sequence. Index 0 is the start; waypoints
/// without a coordinate get no marker but keep their number.
pub fn marker_specs(waypoints: &[Waypoint]) -> Vec<MarkerSpec> {
    waypoints
        .iter()
        .enumerate()
        .filter_map(|(index, waypoint)| {
            let position = waypoint.coord?;
            let kind = if index == 0 {
                MarkerKind::Start
            } else {
                MarkerKind::Stop(index)
            };
            Some(MarkerSpec {
                kind,
                anchor: kind.anchor(),
                position,
                title: kind.title(),
                body: waypoint.description().to_string(),
            })
        })
        .collect()
}

pub struct MapRenderer<H: MapHandle> {
    handle: H,
    settings: MapSettings,
    state: MapState,
    waypoints: Vec<Waypoint>,
    markers_dirty: bool,
    layers: [Option<Polyline>; 2],
    rendered_layers: [Option<Polyline>; 2],
    focus: Option<Coordinate>,
}

impl<H: MapHandle> MapRenderer<H> {
    pub fn new(handle: H, settings: MapSettings) -> Self {
        Self {
            handle,
            settings,
            state: MapState::Uninitialized,
            waypoints: Vec::new(),
            markers_dirty: false,
            layers: [None, None],
            rendered_layers: [None, None],
            focus: None,
        }
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == MapState::Ready
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn focus(&self) -> Option<Coordinate> {
        self.focus
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Starts creating the map. A failed map may be mounted again.
    pub fn mount(&mut self) -> Result<(), MapError> {
        match self.state {
            MapState::Uninitialized | MapState::Failed(_) => {}
            MapState::Loading | MapState::Ready => return Err(MapError::AlreadyMounted),
        }

        let view = InitialView {
            center: self.settings.initial_center,
            zoom: self.settings.initial_zoom,
        };
        match self.handle.create(&view) {
            Ok(()) => {
                debug!("map loading");
                self.state = MapState::Loading;
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                error!(error = %message, "map creation failed");
                self.handle.destroy();
                self.state = MapState::Failed(message.clone());
                Err(MapError::Create(message))
            }
        }
    }

    /// The map finished loading its style; render everything pending.
    pub fn on_loaded(&mut self) {
        if self.state != MapState::Loading {
            debug!(state = ?self.state, "ignoring load event");
            return;
        }
        debug!("map ready");
        self.state = MapState::Ready;
        self.markers_dirty = true;
        self.rendered_layers = [None, None];
        self.render();
    }

    pub fn on_load_failed(&mut self, message: impl Into<String>) -> MapError {
        let message = message.into();
        error!(error = %message, "map failed to load");
        if matches!(self.state, MapState::Loading | MapState::Ready) {
            self.handle.destroy();
        }
        self.state = MapState::Failed(message.clone());
        MapError::Load(message)
    }

    /// Replaces the marker set.
    pub fn set_waypoints(&mut self, waypoints: Vec<Waypoint>) {
        self.waypoints = waypoints;
        self.markers_dirty = true;
        self.render();
    }

    /// Replaces one route layer; `None` or an empty polyline removes it.
    pub fn set_geometry(&mut self, layer: LayerId, polyline: Option<Polyline>) {
        self.layers[layer.slot()] = polyline.filter(|p| !p.is_empty());
        self.render();
    }

    /// Markers and both layers from one result, rendered in a single pass.
    pub fn show_route(&mut self, route: &PlannedRoute) {
        self.waypoints = route.waypoints().to_vec();
        self.markers_dirty = true;
        for layer in LayerId::ALL {
            let polyline = route.geometry(layer);
            self.layers[layer.slot()] = (!polyline.is_empty()).then(|| polyline.clone());
        }
        self.render();
    }

    pub fn set_focus(&mut self, focus: Option<Coordinate>) {
        self.focus = focus;
        if let (Some(center), true) = (focus, self.is_ready()) {
            self.handle.fly_to(center, self.settings.focus_zoom);
        }
    }

    /// Releases the map. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if matches!(self.state, MapState::Loading | MapState::Ready) {
            debug!("destroying map");
            self.handle.destroy();
        }
        self.state = MapState::Uninitialized;
        self.rendered_layers = [None, None];
    }

    fn render(&mut self) {
        if !self.is_ready() {
            return;
        }

        let mut changed = false;
        if self.markers_dirty {
            self.handle.upsert_markers(&marker_specs(&self.waypoints));
            self.markers_dirty = false;
            changed = true;
        }

        for layer in LayerId::ALL {
            let slot = layer.slot();
            if self.layers[slot] == self.rendered_layers[slot] {
                continue;
            }
            match &self.layers[slot] {
                Some(polyline) => self
                    .handle
                    .upsert_layer(&LineLayer::from_polyline(layer, polyline)),
                None => self.handle.remove_layer(layer),
            }
            self.rendered_layers[slot] = self.layers[slot].clone();
            changed = true;
        }

        if changed {
            self.update_camera();
        }
    }

    fn update_camera(&mut self) {
        if let Some(center) = self.focus {
            self.handle.fly_to(center, self.settings.focus_zoom);
            return;
        }

        let route_bounds = self
            .layers
            .iter()
            .flatten()
            .filter_map(Polyline::bounds)
            .reduce(Bounds::union);
        if let Some(bounds) = route_bounds {
            self.handle.fit_bounds(bounds, self.settings.fit_padding, None);
            return;
        }

        if let Some(bounds) = Bounds::from_points(self.waypoints.iter().filter_map(|w| w.coord)) {
            self.handle.fit_bounds(
                bounds,
                self.settings.fit_padding,
                Some(self.settings.marker_max_zoom),
            );
        }
    }
}

impl<H: MapHandle> Drop for MapRenderer<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
