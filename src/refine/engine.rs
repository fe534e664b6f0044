use super::{Contributions, RefineParams, SCORE_SMOOTHING};
use crate::error::RefineError;
use crate::geom::{Path, Point};
use crate::surface::Surface;
use log::debug;
use rayon::prelude::*;

/// Outcome of the relaxation loop, still in planar coordinates.
pub(crate) struct LoopOutcome {
    pub path: Path,
    pub snapshots: Vec<Path>,
    pub loops_completed: usize,
    pub last_loop_delta: f64,
    pub last_loop_score: f64,
}

/// Run the relaxation on a projected, resampled path.
///
/// Each loop computes one correction per interior vertex against the
/// committed path of the previous loop, then promotes the corrected path.
/// Corrections are evaluated in parallel but applied in vertex order, so the
/// result is identical for any worker count. Endpoints are never touched.
pub(crate) fn run(
    params: &RefineParams,
    contributions: &Contributions,
    surface: &dyn Surface,
    mut path: Path,
) -> Result<LoopOutcome, RefineError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.workers.max(1))
        .build()
        .map_err(|e| RefineError::Internal(format!("worker pool: {e}")))?;

    let n = path.len();
    let mut previous_corrections = vec![Point::new(0.0, 0.0); n];
    let mut snapshots = Vec::with_capacity(params.intermediate_geometries.min(params.max_loops));

    let mut loops_completed = params.max_loops;
    let mut delta = 0.0;
    let mut smoothed_score = 0.0;
    let mut path_score = 0.0;

    for k in 0..params.max_loops {
        let corrections: Vec<Point> = pool.install(|| {
            (1..n.saturating_sub(1))
                .into_par_iter()
                .map(|i| {
                    vertex_correction(params, contributions, surface, &path, &previous_corrections, i)
                })
                .collect()
        });

        let mut new_path = path.clone();
        for (offset, correction) in corrections.into_iter().enumerate() {
            let i = offset + 1;
            new_path.set(i, path.get(i) + correction);
            previous_corrections[i] = correction;
        }
        path = new_path;

        if k < params.intermediate_geometries {
            snapshots.push(path.clone());
        }

        // average raw surface value under the path, exponentially smoothed
        // across loops; refinement has converged when it stops moving
        path_score = average_surface_value(surface, &path);
        let previous = smoothed_score;
        smoothed_score = SCORE_SMOOTHING * previous + (1.0 - SCORE_SMOOTHING) * path_score;
        delta = (smoothed_score - previous).abs();

        if k >= params.min_loops && delta < params.threshold_epsilon {
            loops_completed = k;
            break;
        }
    }

    debug!(
        "relaxation finished after {loops_completed} loops, delta {delta:.2e}, score {path_score:.4}"
    );

    Ok(LoopOutcome {
        path,
        snapshots,
        loops_completed,
        last_loop_delta: delta,
        last_loop_score: path_score,
    })
}

fn vertex_correction(
    params: &RefineParams,
    contributions: &Contributions,
    surface: &dyn Surface,
    path: &Path,
    previous_corrections: &[Point],
    index: usize,
) -> Point {
    let point = path.get(index);

    let gradient = (contributions.gradient)(surface, point, params.gradient_scale);
    let distance = (contributions.distance)(path, index, params.distance_scale);
    let angle = (contributions.angle)(path, index, params.angle_scale);

    let mut correction =
        gradient + distance + angle + previous_corrections[index] * params.momentum_scale;

    if params.depth_based_reduction {
        let value = surface.value_at(point);
        correction *= (1.0 - value).max(0.0).sqrt();
    }

    correction
}

fn average_surface_value(surface: &dyn Surface, path: &Path) -> f64 {
    let sum: f64 = path.points().iter().map(|&p| surface.value_at(p)).sum();
    sum / path.len() as f64
}
