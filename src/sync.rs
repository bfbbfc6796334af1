//! Keeps the result list, the map focus and the mobile bottom sheet in step.

use tracing::debug;

use crate::geo::Coordinate;
use crate::route::PlannedRoute;
use crate::traits::BottomSheet;

/// Fraction of the viewport a drag must travel to change snap level.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Desktop,
    Mobile,
}

/// Resting positions of the bottom sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum SnapLevel {
    Mini,
    #[default]
    Medium,
    Max,
}

impl SnapLevel {
    pub fn raised(self) -> Self {
        match self {
            SnapLevel::Mini => SnapLevel::Medium,
            SnapLevel::Medium | SnapLevel::Max => SnapLevel::Max,
        }
    }

    pub fn lowered(self) -> Self {
        match self {
            SnapLevel::Max => SnapLevel::Medium,
            SnapLevel::Medium | SnapLevel::Mini => SnapLevel::Mini,
        }
    }
}

/// Snap model of the mobile bottom sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetState {
    level: SnapLevel,
    threshold: f64,
}

impl Default for SheetState {
    fn default() -> Self {
        Self::new(DEFAULT_SNAP_THRESHOLD)
    }
}

impl SheetState {
    pub fn new(threshold: f64) -> Self {
        Self {
            level: SnapLevel::default(),
            threshold,
        }
    }

    pub fn level(&self) -> SnapLevel {
        self.level
    }

    /// Finger released after a drag. `delta_y` is positive when the sheet
    /// was pulled up. Moves at most one level.
    pub fn release(&mut self, delta_y: f64, viewport_height: f64) -> SnapLevel {
        let threshold = viewport_height * self.threshold;
        if delta_y > threshold {
            self.level = self.level.raised();
        } else if delta_y < -threshold {
            self.level = self.level.lowered();
        }
        self.level
    }

    /// Tap on the handle: Mini -> Medium -> Max -> Medium.
    pub fn tap(&mut self) -> SnapLevel {
        self.level = match self.level {
            SnapLevel::Mini => SnapLevel::Medium,
            SnapLevel::Medium => SnapLevel::Max,
            SnapLevel::Max => SnapLevel::Medium,
        };
        self.level
    }
}

impl BottomSheet for SheetState {
    fn collapse(&mut self) {
        self.level = SnapLevel::Mini;
    }

    fn expand(&mut self) {
        self.level = SnapLevel::Medium;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewSync {
    layout: Layout,
    focus: Option<Coordinate>,
}

impl ViewSync {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            focus: None,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn focus(&self) -> Option<Coordinate> {
        self.focus
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// A result row was tapped. Returns the new focus point, or `None` when
    /// the row is out of range or its waypoint has no coordinate. On mobile
    /// the sheet collapses so the map is visible.
    pub fn on_list_item_activated(
        &mut self,
        route: &PlannedRoute,
        index: usize,
        sheet: Option<&mut dyn BottomSheet>,
    ) -> Option<Coordinate> {
        let waypoint = route.waypoint_for_entry(index)?;

        if self.layout == Layout::Mobile {
            if let Some(sheet) = sheet {
                sheet.collapse();
            }
        }

        let coord = waypoint.coord?;
        debug!(index, waypoint = %waypoint.id, "focusing list item");
        self.focus = Some(coord);
        Some(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polyline::PolylineCodec;
    use crate::route::OptimizationResult;
    use crate::waypoint::Waypoint;

    fn route() -> PlannedRoute {
        let result = OptimizationResult {
            optimized_order: vec!["B".into(), "A".into()],
            distance_km: 3.0,
            duration_min: 9.0,
            polyline_outbound: None,
            polyline_return: None,
            start_point_coords: Coordinate::new(10.0, 106.0),
            waypoints: vec![
                Waypoint::new("B", None, Some(Coordinate::new(10.2, 106.2))),
                Waypoint::new("A", None, None),
            ],
        };
        PlannedRoute::new("Home", result, &PolylineCodec::default())
    }

    #[test]
    fn test_release_snaps_one_level() {
        let mut sheet = SheetState::default();
        assert_eq!(sheet.release(200.0, 800.0), SnapLevel::Max);
        assert_eq!(sheet.release(500.0, 800.0), SnapLevel::Max);
        assert_eq!(sheet.release(-500.0, 800.0), SnapLevel::Medium);
        assert_eq!(sheet.release(-81.0, 800.0), SnapLevel::Mini);
        assert_eq!(sheet.release(-500.0, 800.0), SnapLevel::Mini);
    }

    #[test]
    fn test_small_drag_stays() {
        let mut sheet = SheetState::default();
        assert_eq!(sheet.release(79.0, 800.0), SnapLevel::Medium);
        assert_eq!(sheet.release(-80.0, 800.0), SnapLevel::Medium);
    }

    #[test]
    fn test_tap_cycle() {
        let mut sheet = SheetState::default();
        sheet.collapse();
        assert_eq!(sheet.tap(), SnapLevel::Medium);
        assert_eq!(sheet.tap(), SnapLevel::Max);
        assert_eq!(sheet.tap(), SnapLevel::Medium);
    }

    #[test]
    fn test_boundary_rows_focus_start() {
        let route = route();
        let mut view = ViewSync::new(Layout::Desktop);
        assert_eq!(view.on_list_item_activated(&route, 0, None), Some(Coordinate::new(10.0, 106.0)));
        assert_eq!(view.on_list_item_activated(&route, 3, None), Some(Coordinate::new(10.0, 106.0)));
        assert_eq!(view.on_list_item_activated(&route, 1, None), Some(Coordinate::new(10.2, 106.2)));
    }

    #[test]
    fn test_mobile_collapses_sheet() {
        let route = route();
        let mut sheet = SheetState::default();
        let mut view = ViewSync::new(Layout::Mobile);
        view.on_list_item_activated(&route, 1, Some(&mut sheet));
        assert_eq!(sheet.level(), SnapLevel::Mini);
    }

    #[test]
    fn test_desktop_leaves_sheet_alone() {
        let route = route();
        let mut sheet = SheetState::default();
        let mut view = ViewSync::new(Layout::Desktop);
        view.on_list_item_activated(&route, 1, Some(&mut sheet));
        assert_eq!(sheet.level(), SnapLevel::Medium);
    }

    #[test]
    fn test_missing_coordinate_keeps_previous_focus() {
        let route = route();
        let mut view = ViewSync::new(Layout::Desktop);
        view.on_list_item_activated(&route, 1, None);
        assert_eq!(view.on_list_item_activated(&route, 2, None), None);
        assert_eq!(view.focus(), Some(Coordinate::new(10.2, 106.2)));
        assert_eq!(view.on_list_item_activated(&route, 9, None), None);
    }
}
