//! Thin post-simplification for refined paths.
//!
//! Refinement returns densely resampled geometry (a vertex every few
//! meters). [`DouglasPeucker`] collapses that back to the significant
//! vertices via the `geo` crate's simplifier, and [`Trim`] additionally
//! drops points crowding the fixed endpoints, where the relaxation cannot
//! move vertices and artifacts accumulate.

use crate::geom::{haversine_distance, Path, Point};
use ::geo::{LineString, Simplify};

/// Simplifies a lon/lat path after refinement.
pub trait PathReducer {
    fn reduce(&self, path: &Path) -> Path;
}

/// Ramer-Douglas-Peucker simplification. `epsilon` is in path coordinate
/// units (degrees for lon/lat paths).
#[derive(Clone, Copy, Debug)]
pub struct DouglasPeucker {
    pub epsilon: f64,
}

impl Default for DouglasPeucker {
    fn default() -> Self {
        // about a meter of tolerance in lon/lat degrees
        Self { epsilon: 1e-5 }
    }
}

impl PathReducer for DouglasPeucker {
    fn reduce(&self, path: &Path) -> Path {
        if path.len() < 3 {
            return path.clone();
        }

        let line: LineString<f64> = path.points().iter().map(|p| (p.x, p.y)).collect();
        let simplified = line.simplify(&self.epsilon);
        Path::from_points(
            simplified
                .into_inner()
                .into_iter()
                .map(|c| Point::new(c.x, c.y))
                .collect(),
        )
    }
}

/// Pass-through reducer that removes interior points within
/// `endpoint_radius` meters of either endpoint before delegating to its
/// inner reducer. Distances are great-circle, so this expects lon/lat
/// paths.
pub struct Trim {
    pub inner: Box<dyn PathReducer>,
    /// Spacing in meters the path is resampled to before trimming.
    pub resample_interval: f64,
    /// Great-circle radius in meters around each endpoint to clear.
    pub endpoint_radius: f64,
}

impl Trim {
    pub fn new(inner: Box<dyn PathReducer>) -> Self {
        Self {
            inner,
            resample_interval: 2.0,
            endpoint_radius: 15.0,
        }
    }
}

impl Default for Trim {
    fn default() -> Self {
        Self::new(Box::new(DouglasPeucker::default()))
    }
}

impl PathReducer for Trim {
    fn reduce(&self, path: &Path) -> Path {
        let mut path = path.clone();
        let parts = (path.geo_distance() / self.resample_interval) as usize;
        path.resample(parts.max(2));

        while path.len() > 2
            && haversine_distance(path.get(0), path.get(1)) < self.endpoint_radius
        {
            path.remove(1);
        }
        while path.len() > 2
            && haversine_distance(path.get(path.len() - 1), path.get(path.len() - 2))
                < self.endpoint_radius
        {
            path.remove(path.len() - 2);
        }

        self.inner.reduce(&path)
    }
}
