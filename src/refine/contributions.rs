//! The three correction terms applied to each interior vertex.
//!
//! All three return a planar correction vector for vertex `index` and are
//! skipped (zero vector) when their scale is 0, so a term can be disabled
//! without branching elsewhere.

use crate::geom::{Path, Point};
use crate::surface::Surface;

pub type GradientContributionFn = fn(&dyn Surface, Point, f64) -> Point;
pub type PathContributionFn = fn(&Path, usize, f64) -> Point;

/// The contribution functions used by the refinement engine. Replace
/// individual entries to experiment with different correction terms.
#[derive(Clone, Copy)]
pub struct Contributions {
    pub gradient: GradientContributionFn,
    pub distance: PathContributionFn,
    pub angle: PathContributionFn,
}

impl Default for Contributions {
    fn default() -> Self {
        Self {
            gradient: gradient_contribution,
            distance: distance_contribution,
            angle: angle_contribution,
        }
    }
}

/// Pulls the vertex uphill along the smoothed surface gradient.
pub fn gradient_contribution(surface: &dyn Surface, point: Point, scale: f64) -> Point {
    if scale == 0.0 {
        return Point::new(0.0, 0.0);
    }
    surface.gradient_at(point) * scale
}

/// Spring term restoring equidistant spacing: projects the vertex onto the
/// chord between its neighbors and pulls it toward the chord midpoint.
pub fn distance_contribution(path: &Path, index: usize, scale: f64) -> Point {
    if scale == 0.0 {
        return Point::new(0.0, 0.0);
    }

    let prev = path.get(index - 1);
    let next = path.get(index + 1);
    let v = path.get(index) - prev;
    let u = next - prev;

    let dot = u.dot(&u);
    if dot == 0.0 {
        // neighbors coincide, nothing to project onto
        return Point::new(0.0, 0.0);
    }

    let center = prev + u * (u.dot(&v) / dot);
    let m1 = prev - center;
    let m2 = next - center;
    (m1 + m2) * scale
}

/// Angle-smoothness term: pushes the vertex along the bisector of its two
/// edges, strongest at sharp kinks. The cube root keeps the response smooth
/// for nearly straight configurations.
pub fn angle_contribution(path: &Path, index: usize, scale: f64) -> Point {
    if scale == 0.0 {
        return Point::new(0.0, 0.0);
    }

    let current = path.get(index);
    let n1 = path.get(index - 1) - current;
    let n2 = path.get(index + 1) - current;

    let len1 = n1.norm();
    let len2 = n2.norm();
    if len1 == 0.0 || len2 == 0.0 {
        return Point::new(0.0, 0.0);
    }

    let n1 = n1 / len1;
    let n2 = n2 / len2;

    let factor = n1.dot(&n2).cbrt() + 1.0;
    let bisector = n1 + n2;
    let norm = bisector.norm();
    if norm == 0.0 {
        return Point::new(0.0, 0.0);
    }

    (bisector / norm) * (len1.min(len2) * scale * factor)
}
