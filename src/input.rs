#[cfg(target_arch = "wasm32")]
pub mod wasm;

use glam::Vec2;

use crate::page::BoundingBox;

/// Turns raw pointer positions into mouse-enter events on link boxes.
#[derive(Debug, Default)]
pub struct HoverTracker {
    pointer: Option<Vec2>,
    hovered: Option<usize>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Records a pointer move in container coordinates. Returns the index of the
    /// link the pointer just entered, if any.
    pub fn set_mouse_position(&mut self, position: Vec2, links: &[BoundingBox]) -> Option<usize> {
        self.pointer = Some(position);
        let under = links
            .iter()
            .position(|bounds| bounds.contains(position.x, position.y));
        let entered = match (self.hovered, under) {
            (previous, Some(index)) if previous != Some(index) => Some(index),
            _ => None,
        };
        self.hovered = under;
        entered
    }

    /// Pointer left the container.
    pub fn clear(&mut self) {
        self.pointer = None;
        self.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> Vec<BoundingBox> {
        vec![
            BoundingBox::new(0.0, 0.0, 100.0, 20.0),
            BoundingBox::new(0.0, 120.0, 100.0, 20.0),
        ]
    }

    #[test]
    fn reports_enter_once() {
        let mut tracker = HoverTracker::new();
        let links = links();
        assert_eq!(tracker.set_mouse_position(Vec2::new(10.0, 10.0), &links), Some(0));
        assert_eq!(tracker.set_mouse_position(Vec2::new(20.0, 12.0), &links), None);
        assert_eq!(tracker.hovered(), Some(0));
    }

    #[test]
    fn moving_between_links_enters_the_next() {
        let mut tracker = HoverTracker::new();
        let links = links();
        tracker.set_mouse_position(Vec2::new(10.0, 10.0), &links);
        assert_eq!(tracker.set_mouse_position(Vec2::new(150.0, 10.0), &links), Some(1));
    }

    #[test]
    fn leaving_and_returning_fires_again() {
        let mut tracker = HoverTracker::new();
        let links = links();
        tracker.set_mouse_position(Vec2::new(10.0, 10.0), &links);
        assert_eq!(tracker.set_mouse_position(Vec2::new(110.0, 50.0), &links), None);
        assert_eq!(tracker.hovered(), None);
        assert_eq!(tracker.set_mouse_position(Vec2::new(10.0, 10.0), &links), Some(0));

        tracker.clear();
        assert_eq!(tracker.pointer(), None);
        assert_eq!(tracker.set_mouse_position(Vec2::new(10.0, 10.0), &links), Some(0));
    }
}
