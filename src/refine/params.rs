use crate::surface::Surface;
use serde::Deserialize;

/// Parameters controlling the refinement loop.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RefineParams {
    /// Run at least this many refinement loops before testing convergence.
    pub min_loops: usize,
    /// Hard cap on refinement loops.
    pub max_loops: usize,
    /// Stop once the smoothed score changes by less than this per loop.
    pub threshold_epsilon: f64,
    /// Target vertex spacing in meters when resampling before refinement.
    /// Smaller values track tighter geometry at higher cost.
    pub resample_interval: f64,
    /// Weight of the smoothed-surface gradient term.
    pub gradient_scale: f64,
    /// Weight of the spacing (spring) term.
    pub distance_scale: f64,
    /// Weight of the angle-smoothness term.
    pub angle_scale: f64,
    /// Weight of the previous loop's correction.
    pub momentum_scale: f64,
    /// Damp corrections by `sqrt(1 - value)` of the raw surface value, so
    /// vertices already sitting on a ridge stop moving. Helpful when sliding
    /// to clean data such as rasterized vector geometry.
    pub depth_based_reduction: bool,
    /// Number of per-loop path snapshots to keep, for debugging or
    /// animation.
    pub intermediate_geometries: usize,
    /// Worker threads relaxing vertices within one loop.
    pub workers: usize,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            min_loops: 100,
            max_loops: 4000,
            threshold_epsilon: 5e-4,
            resample_interval: 5.0,
            gradient_scale: 0.5,
            distance_scale: 0.2,
            angle_scale: 0.1,
            momentum_scale: 0.7,
            depth_based_reduction: false,
            intermediate_geometries: 0,
            workers: default_workers(),
        }
    }
}

impl RefineParams {
    /// Defaults with the contribution weights the surface suggests for its
    /// own data. The usual way to configure a refinement.
    pub fn suggested(surface: &dyn Surface) -> Self {
        let hints = surface.hints();
        Self {
            gradient_scale: hints.gradient_scale,
            distance_scale: hints.distance_scale,
            angle_scale: hints.angle_scale,
            momentum_scale: hints.momentum_scale,
            depth_based_reduction: hints.depth_based_reduction,
            ..Self::default()
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
