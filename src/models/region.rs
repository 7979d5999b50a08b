use super::Point;
use serde::{Deserialize, Serialize};

/// Quadrilateral delimiting a symbol in image space.
///
/// Corners are ordered `[top_left, top_right, bottom_right, bottom_left]` in
/// symbol orientation; `bottom_left` is the vertex of the solid finder L.
/// The quadrilateral need not be axis-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Corner points in symbol orientation
    pub corners: [Point; 4],
}

impl Region {
    /// Create a region from symbol-oriented corners
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            corners: [top_left, top_right, bottom_right, bottom_left],
        }
    }

    /// Axis-aligned square with the finder L on the left and bottom
    pub fn square(x: f32, y: f32, side: f32) -> Self {
        Self::new(
            Point::new(x, y),
            Point::new(x + side, y),
            Point::new(x + side, y + side),
            Point::new(x, y + side),
        )
    }

    /// Top-left corner (start of the top clock track)
    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    /// Top-right corner (where both clock tracks meet)
    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    /// Bottom-right corner
    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    /// Bottom-left corner (vertex of the finder L)
    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }

    /// Mean of the four corners
    pub fn center(&self) -> Point {
        let sx: f32 = self.corners.iter().map(|p| p.x).sum();
        let sy: f32 = self.corners.iter().map(|p| p.y).sum();
        Point::new(sx / 4.0, sy / 4.0)
    }

    /// Edge lengths: top, right, bottom, left
    pub fn edge_lengths(&self) -> [f32; 4] {
        let c = &self.corners;
        [
            c[0].distance(&c[1]),
            c[1].distance(&c[2]),
            c[2].distance(&c[3]),
            c[3].distance(&c[0]),
        ]
    }

    /// Average edge length
    pub fn mean_side(&self) -> f32 {
        self.edge_lengths().iter().sum::<f32>() / 4.0
    }

    /// Shoelace area (positive for the canonical clockwise-on-screen order)
    pub fn area(&self) -> f32 {
        let c = &self.corners;
        let mut twice = 0.0f32;
        for i in 0..4 {
            twice += c[i].cross(&c[(i + 1) % 4]);
        }
        twice * 0.5
    }
}
