use serde::{Deserialize, Serialize};

/// Axis-aligned box in arena coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "rect must have a positive area");
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Shared edges do not count as overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Index of the first rect in `rects` overlapping this one.
    pub fn collide_index<'a, I>(&self, rects: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        rects.into_iter().position(|r| self.overlaps(r))
    }

    pub fn collides_any<'a, I>(&self, rects: I) -> bool
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        self.collide_index(rects).is_some()
    }

    pub fn distance_between_centers(&self, other: &Rect) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt()
    }
}
