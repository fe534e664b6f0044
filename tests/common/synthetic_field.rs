//! Synthetic fields and paths shared by the integration tests.

use ridgeline::field::{Kernel, ScalarField, SmoothedField};
use ridgeline::geom::{Bound, Path, Point};
use ridgeline::surface::{FieldSurface, SurfaceHints};

/// Hints matching a clean rasterized-geometry surface.
pub const TEST_HINTS: SurfaceHints = SurfaceHints {
    gradient_scale: 0.5,
    distance_scale: 0.01,
    angle_scale: 0.01,
    momentum_scale: 0.0,
    depth_based_reduction: false,
};

/// Bound giving a `w x h` field a cell size of exactly 1.0.
pub fn unit_bound(w: usize, h: usize) -> Bound {
    Bound::from_points(
        Point::new(0.0, 0.0),
        Point::new((w - 1) as f64, (h - 1) as f64),
    )
}

/// All-zero field.
pub fn flat_field(w: usize, h: usize) -> ScalarField {
    ScalarField::new(unit_bound(w, h), w, h)
}

/// Field with value 1.0 along the column `x = ridge` and 0 elsewhere.
pub fn ridge_field(w: usize, h: usize, ridge: usize) -> ScalarField {
    let mut field = flat_field(w, h);
    for y in 0..h {
        field.set(ridge, y, 1.0);
    }
    field
}

/// Surface over a single vertical ridge, smoothed with `std_dev` cells.
pub fn ridge_surface(w: usize, h: usize, ridge: usize, std_dev: f64) -> FieldSurface {
    FieldSurface::new(
        SmoothedField::new(ridge_field(w, h, ridge), Kernel::new(std_dev, 1.0)),
        TEST_HINTS,
    )
}

/// Straight path of `n` equidistant vertices from `from` to `to`.
pub fn straight_path(from: Point, to: Point, n: usize) -> Path {
    let mut path = Path::new();
    for i in 0..n {
        let t = i as f64 / (n - 1) as f64;
        path.push(from + (to - from) * t);
    }
    path
}
