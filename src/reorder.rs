//! User-editable ordering of the selected places.
//!
//! In automatic mode the order is whatever the input or the optimizer
//! produced and dragging is disabled. Manual mode unlocks dragging and asks
//! the optimizer to keep the given order. Switching modes never reorders.

use tracing::debug;

use crate::traits::ReorderGesture;
use crate::waypoint::PlaceInput;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderingMode {
    #[default]
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReorderController {
    places: Vec<PlaceInput>,
    mode: OrderingMode,
    /// Set while an optimize request is outstanding.
    locked: bool,
    dragging: Option<usize>,
}

impl ReorderController {
    pub fn new(places: Vec<PlaceInput>) -> Self {
        Self {
            places,
            ..Self::default()
        }
    }

    pub fn places(&self) -> &[PlaceInput] {
        &self.places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn mode(&self) -> OrderingMode {
        self.mode
    }

    pub fn manual_mode_enabled(&self) -> bool {
        self.mode == OrderingMode::Manual
    }

    pub fn toggle_manual_mode(&mut self, enabled: bool) {
        self.mode = if enabled {
            OrderingMode::Manual
        } else {
            OrderingMode::Automatic
        };
        if !enabled {
            self.dragging = None;
        }
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if locked {
            self.dragging = None;
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn can_drag(&self) -> bool {
        self.manual_mode_enabled() && !self.locked
    }

    /// Index of the row being dragged, if any.
    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    /// Moves the place at `from` to `to`, shifting the ones in between.
    /// Ignored unless dragging is allowed and both indices are in range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if !self.can_drag() {
            debug!(from, to, "reorder ignored, dragging disabled");
            return false;
        }
        let len = self.places.len();
        if from >= len || to >= len || from == to {
            return false;
        }

        let place = self.places.remove(from);
        self.places.insert(to, place);
        true
    }
}

impl ReorderGesture for ReorderController {
    fn begin_reorder(&mut self, index: usize) -> bool {
        if !self.can_drag() || index >= self.places.len() {
            return false;
        }
        self.dragging = Some(index);
        true
    }

    fn commit_reorder(&mut self, from: usize, to: usize) -> bool {
        self.dragging = None;
        self.reorder(from, to)
    }

    fn cancel_reorder(&mut self) {
        self.dragging = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(controller: &ReorderController) -> Vec<&str> {
        controller.places().iter().map(|p| p.name.as_str()).collect()
    }

    fn controller() -> ReorderController {
        ReorderController::new(
            ["A", "B", "C", "D"]
                .into_iter()
                .map(|name| PlaceInput::new(name, "", None))
                .collect(),
        )
    }

    #[test]
    fn test_automatic_mode_rejects_reorder() {
        let mut c = controller();
        assert!(!c.reorder(0, 2));
        assert!(!c.begin_reorder(0));
        assert_eq!(names(&c), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_manual_reorder_moves_forward() {
        let mut c = controller();
        c.toggle_manual_mode(true);
        assert!(c.reorder(0, 2));
        assert_eq!(names(&c), ["B", "C", "A", "D"]);
    }

    #[test]
    fn test_manual_reorder_moves_backward() {
        let mut c = controller();
        c.toggle_manual_mode(true);
        assert!(c.reorder(3, 1));
        assert_eq!(names(&c), ["A", "D", "B", "C"]);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut c = controller();
        c.toggle_manual_mode(true);
        assert!(!c.reorder(0, 4));
        assert!(!c.reorder(7, 0));
        assert_eq!(names(&c), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_toggle_keeps_order() {
        let mut c = controller();
        c.toggle_manual_mode(true);
        c.reorder(0, 2);
        c.toggle_manual_mode(false);
        c.toggle_manual_mode(true);
        assert_eq!(names(&c), ["B", "C", "A", "D"]);
    }

    #[test]
    fn test_locked_rejects_drag() {
        let mut c = controller();
        c.toggle_manual_mode(true);
        c.set_locked(true);
        assert!(!c.can_drag());
        assert!(!c.commit_reorder(0, 1));
        c.set_locked(false);
        assert!(c.commit_reorder(0, 1));
    }

    #[test]
    fn test_gesture_lifecycle() {
        let mut c = controller();
        c.toggle_manual_mode(true);
        assert!(c.begin_reorder(1));
        assert_eq!(c.dragging(), Some(1));
        c.cancel_reorder();
        assert_eq!(c.dragging(), None);
        assert_eq!(names(&c), ["A", "B", "C", "D"]);

        c.begin_reorder(1);
        assert!(c.commit_reorder(1, 3));
        assert_eq!(c.dragging(), None);
        assert_eq!(names(&c), ["A", "C", "D", "B"]);
    }
}
