//! Integer pixel rectangles in image coordinates

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle with exclusive `right`/`bottom` edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Area in pixels, zero for degenerate rectangles
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width() as i64 * self.height() as i64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn center_x(&self) -> i32 {
        (self.left + self.right) >> 1
    }

    pub fn center_y(&self) -> i32 {
        (self.top + self.bottom) >> 1
    }

    /// Whether the two rectangles share a non-empty area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// Overlapping part of two rectangles, if any
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }

        Some(Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        ))
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Euclidean distance between the two centers
    pub fn center_distance(&self, other: &Rect) -> f64 {
        let dx = (other.center_x() - self.center_x()) as f64;
        let dy = (other.center_y() - self.center_y()) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Tight union of every rectangle, `None` for an empty input
    pub fn bounding<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects.into_iter().fold(None, |acc: Option<Rect>, r| match acc {
            Some(acc) => Some(acc.union(r)),
            None => Some(*r),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_and_center() {
        let r = Rect::new(10, 20, 110, 70);
        assert_eq!(r.width(), 100);
        assert_eq!(r.height(), 50);
        assert_eq!(r.center_x(), 60);
        assert_eq!(r.center_y(), 45);
        assert_eq!(r.area(), 5000);
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 50, 50);
        let b = Rect::new(50, 0, 100, 50);
        assert!(!a.intersects(&b));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_intersection_and_union() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 150, 150);
        assert_eq!(a.intersection(&b), Some(Rect::new(50, 50, 100, 100)));
        assert_eq!(a.union(&b), Rect::new(0, 0, 150, 150));
    }

    #[test]
    fn test_bounding() {
        let rects = [Rect::new(5, 5, 10, 10), Rect::new(0, 8, 7, 30)];
        assert_eq!(Rect::bounding(&rects), Some(Rect::new(0, 5, 10, 30)));
        assert_eq!(Rect::bounding(&[] as &[Rect]), None);
    }

    #[test]
    fn test_center_distance() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(30, 40, 40, 50);
        assert!((a.center_distance(&b) - 50.0).abs() < 1e-9);
    }
}
