use super::{haversine_distance, Bound, Point};
use serde::{Deserialize, Serialize};

/// Ordered polyline of 2-D points, mutable in place during refinement.
///
/// Serializes as a plain sequence of `[x, y]` pairs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    points: Vec<Point>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Point {
        self.points[index]
    }

    #[inline]
    pub fn set(&mut self, index: usize, point: Point) {
        self.points[index] = point;
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn remove(&mut self, index: usize) -> Point {
        self.points.remove(index)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Planar length: the sum of Euclidean segment lengths.
    pub fn distance(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }

    /// Great-circle length in meters, for paths in lon/lat coordinates.
    pub fn geo_distance(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| haversine_distance(w[0], w[1]))
            .sum()
    }

    /// Smallest axis-aligned rectangle containing every vertex.
    pub fn bound(&self) -> Bound {
        let mut points = self.points.iter();
        let Some(&first) = points.next() else {
            return Bound::default();
        };
        let (mut sw, mut ne) = (first, first);
        for p in points {
            sw = Point::new(sw.x.min(p.x), sw.y.min(p.y));
            ne = Point::new(ne.x.max(p.x), ne.y.max(p.y));
        }
        Bound::from_points(sw, ne)
    }

    /// Apply `f` to every vertex, e.g. a projection.
    pub fn map_in_place(&mut self, f: impl Fn(Point) -> Point) {
        for p in &mut self.points {
            *p = f(*p);
        }
    }

    /// Resample the path to exactly `total_points` vertices, evenly spaced
    /// along the current geometry. Endpoints are preserved. No-op when the
    /// path has fewer than two points or `total_points < 2`.
    pub fn resample(&mut self, total_points: usize) {
        if total_points < 2 || self.points.len() < 2 {
            return;
        }

        let total = self.distance();
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if total == 0.0 {
            self.points = vec![first; total_points];
            return;
        }

        let step = total / (total_points - 1) as f64;
        let mut out = Vec::with_capacity(total_points);
        out.push(first);

        let mut seg_index = 0usize;
        let mut seg_start = 0.0;
        let mut seg_len = (self.points[1] - self.points[0]).norm();
        for k in 1..total_points - 1 {
            let target = step * k as f64;
            while seg_start + seg_len < target && seg_index + 2 < self.points.len() {
                seg_start += seg_len;
                seg_index += 1;
                seg_len = (self.points[seg_index + 1] - self.points[seg_index]).norm();
            }
            let t = if seg_len > 0.0 {
                (target - seg_start) / seg_len
            } else {
                0.0
            };
            let a = self.points[seg_index];
            let b = self.points[seg_index + 1];
            out.push(a + (b - a) * t);
        }

        out.push(last);
        self.points = out;
    }
}
