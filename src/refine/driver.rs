use super::{engine, Contributions, RefineParams};
use crate::error::RefineError;
use crate::geom::{mercator, Path};
use crate::reduce::PathReducer;
use crate::surface::Surface;
use log::debug;
use serde::Serialize;
use std::time::Instant;

/// Outcome of a refinement. Paths are in lon/lat coordinates.
#[derive(Clone, Debug, Serialize)]
pub struct RefineResult {
    /// The corrected path.
    pub corrected: Path,
    /// Per-loop snapshots of the first
    /// [`RefineParams::intermediate_geometries`] loops.
    pub intermediate: Vec<Path>,
    /// Loop index at which the refinement stopped.
    pub loops_completed: usize,
    /// Smoothed-score change of the final loop.
    pub last_loop_delta: f64,
    /// Mean raw surface value under the path after the final loop.
    pub last_loop_score: f64,
    /// Wall-clock time of the whole refinement.
    pub runtime_ms: f64,
}

/// Drives a refinement end to end: projection into the Mercator plane,
/// resampling, the relaxation loop, inverse projection and optional
/// post-simplification.
pub struct Refiner {
    params: RefineParams,
    contributions: Contributions,
    reducer: Option<Box<dyn PathReducer>>,
}

impl Refiner {
    pub fn new(params: RefineParams) -> Self {
        Self {
            params,
            contributions: Contributions::default(),
            reducer: None,
        }
    }

    /// Simplify refined paths with `reducer` before returning them.
    pub fn with_reducer(mut self, reducer: Box<dyn PathReducer>) -> Self {
        self.reducer = Some(reducer);
        self
    }

    /// Replace the default contribution functions.
    pub fn with_contributions(mut self, contributions: Contributions) -> Self {
        self.contributions = contributions;
        self
    }

    pub fn params(&self) -> &RefineParams {
        &self.params
    }

    /// Refine a lon/lat path against the surface.
    ///
    /// The path is projected to the Mercator plane and resampled so vertices
    /// start out roughly [`RefineParams::resample_interval`] ground meters
    /// apart, which the spacing term then maintains. One open path per call;
    /// it must contain at least two points.
    pub fn refine(
        &self,
        path: &Path,
        surface: &dyn Surface,
    ) -> Result<RefineResult, RefineError> {
        if path.len() < 2 {
            return Err(RefineError::PathTooShort(path.len()));
        }

        let start = Instant::now();

        let scale_factor = mercator::scale_factor(path.bound().center().y);

        let mut projected = path.clone();
        projected.map_in_place(mercator::project);

        // a data point at least every resample_interval meters keeps the
        // equidistance assumption of the spacing term valid at loop zero
        let distance = projected.distance();
        let count = (distance / (self.params.resample_interval * scale_factor)).ceil() as usize;
        projected.resample(count + 3);
        debug!(
            "refining {} vertices over {:.0} planar meters",
            projected.len(),
            distance
        );

        let outcome = engine::run(&self.params, &self.contributions, surface, projected)?;

        let mut corrected = outcome.path;
        corrected.map_in_place(mercator::inverse);
        let corrected = self.reduce(corrected);

        let intermediate = outcome
            .snapshots
            .into_iter()
            .map(|mut snapshot| {
                snapshot.map_in_place(mercator::inverse);
                self.reduce(snapshot)
            })
            .collect();

        Ok(RefineResult {
            corrected,
            intermediate,
            loops_completed: outcome.loops_completed,
            last_loop_delta: outcome.last_loop_delta,
            last_loop_score: outcome.last_loop_score,
            runtime_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    /// Refine a path already expressed in the surface's planar coordinates.
    ///
    /// Skips projection, resampling and reduction: the caller is responsible
    /// for supplying vertices spaced closely enough for the spacing term.
    pub fn refine_projected(
        &self,
        path: &Path,
        surface: &dyn Surface,
    ) -> Result<RefineResult, RefineError> {
        if path.len() < 2 {
            return Err(RefineError::PathTooShort(path.len()));
        }

        let start = Instant::now();
        let outcome = engine::run(&self.params, &self.contributions, surface, path.clone())?;

        Ok(RefineResult {
            corrected: outcome.path,
            intermediate: outcome.snapshots,
            loops_completed: outcome.loops_completed,
            last_loop_delta: outcome.last_loop_delta,
            last_loop_score: outcome.last_loop_score,
            runtime_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    fn reduce(&self, path: Path) -> Path {
        match &self.reducer {
            Some(reducer) => reducer.reduce(&path),
            None => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::surface::SurfaceHints;

    struct Flat;

    impl Surface for Flat {
        fn value_at(&self, _: Point) -> f64 {
            0.0
        }
        fn gradient_at(&self, _: Point) -> Point {
            Point::new(0.0, 0.0)
        }
        fn hints(&self) -> SurfaceHints {
            SurfaceHints {
                gradient_scale: 0.0,
                distance_scale: 0.0,
                angle_scale: 0.0,
                momentum_scale: 0.0,
                depth_based_reduction: false,
            }
        }
    }

    #[test]
    fn refine_rejects_short_paths() {
        let refiner = Refiner::new(RefineParams::default());
        let empty = Path::new();
        assert!(matches!(
            refiner.refine(&empty, &Flat),
            Err(RefineError::PathTooShort(0))
        ));

        let single = Path::from_points(vec![Point::new(0.0, 0.0)]);
        assert!(matches!(
            refiner.refine(&single, &Flat),
            Err(RefineError::PathTooShort(1))
        ));
    }

    #[test]
    fn refine_resamples_and_projects_back() {
        // ~220 m segment at the equator, 5 m interval: plenty of vertices
        let path = Path::from_points(vec![Point::new(0.0, 0.0), Point::new(0.002, 0.0)]);
        let params = RefineParams {
            min_loops: 1,
            max_loops: 2,
            workers: 1,
            ..RefineParams::default()
        };
        let result = Refiner::new(params).refine(&path, &Flat).expect("refines");

        assert!(result.corrected.len() > 10);
        let first = result.corrected.get(0);
        let last = result.corrected.get(result.corrected.len() - 1);
        assert!((first.x - 0.0).abs() < 1e-9 && (first.y - 0.0).abs() < 1e-9);
        assert!((last.x - 0.002).abs() < 1e-9 && (last.y - 0.0).abs() < 1e-9);
    }
}
