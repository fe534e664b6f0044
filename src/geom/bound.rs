use super::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its south-west and north-east corners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    sw: Point,
    ne: Point,
}

impl Default for Bound {
    fn default() -> Self {
        Self {
            sw: Point::new(0.0, 0.0),
            ne: Point::new(0.0, 0.0),
        }
    }
}

impl Bound {
    /// Construct from two opposite corners, in any order.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            sw: Point::new(a.x.min(b.x), a.y.min(b.y)),
            ne: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn south_west(&self) -> Point {
        self.sw
    }

    pub fn north_east(&self) -> Point {
        self.ne
    }

    pub fn width(&self) -> f64 {
        self.ne.x - self.sw.x
    }

    pub fn height(&self) -> f64 {
        self.ne.y - self.sw.y
    }

    pub fn center(&self) -> Point {
        (self.sw + self.ne) / 2.0
    }

    /// A bound is empty when it has no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Inclusive containment check.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.sw.x && p.x <= self.ne.x && p.y >= self.sw.y && p.y <= self.ne.y
    }

    /// Grow the bound by `amount` on every side.
    pub fn pad(&self, amount: f64) -> Self {
        let d = Point::new(amount, amount);
        Self {
            sw: self.sw - d,
            ne: self.ne + d,
        }
    }
}
