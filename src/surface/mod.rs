//! Surfaces the refiner can slide a path against.
//!
//! A [`Surface`] answers three questions: the raw field value under a point
//! (used for scoring and depth-based damping), the smoothed gradient at a
//! point (the force pulling vertices toward ridges) and the parameter
//! [`SurfaceHints`] its data characteristics suggest. Points are in the Web
//! Mercator plane.
//!
//! Builders:
//! - [`ImageSurface`] – a caller-supplied bitmap over a lon/lat bound.
//! - [`TileOverlaySurface`] – overlay map tiles matched against a target
//!   color (e.g. yellow road casings).
//! - [`HeatTileSurface`] – JSON tiles carrying per-pixel heat values.
//!
//! Tile transport is abstracted behind [`TileSource`]; the crate never
//! performs HTTP itself.

mod heat;
mod image;
mod overlay;
mod tiles;

pub use self::heat::{HeatTileOptions, HeatTileSurface};
pub use self::image::{color_ratio_value, ColorValueFn, ImageSurface};
pub use self::overlay::{TileOverlayOptions, TileOverlaySurface};
pub use self::tiles::{tile_ranges, TileRange, TileSource, TILE_SIZE};

use crate::field::{Kernel, SmoothedField};
use crate::geom::Point;
use serde::{Deserialize, Serialize};

/// Capability set required of a surface by the refiner.
pub trait Surface: Sync {
    /// Raw (unsmoothed) field value in `[0, 1]` at a planar point.
    fn value_at(&self, point: Point) -> f64;

    /// Smoothed-field gradient at a planar point.
    fn gradient_at(&self, point: Point) -> Point;

    /// Parameter defaults this surface suggests for the refiner.
    fn hints(&self) -> SurfaceHints;
}

/// Refinement parameter defaults suggested by a surface.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SurfaceHints {
    pub gradient_scale: f64,
    pub distance_scale: f64,
    pub angle_scale: f64,
    pub momentum_scale: f64,
    pub depth_based_reduction: bool,
}

/// A [`SmoothedField`] paired with hints: the common backing for every
/// builder, and a convenient `Surface` over hand-built fields in tests and
/// experiments. Raw values come from the unsmoothed field, gradients from
/// the smoothed view.
pub struct FieldSurface {
    smoothed: SmoothedField,
    hints: SurfaceHints,
}

impl FieldSurface {
    pub fn new(smoothed: SmoothedField, hints: SurfaceHints) -> Self {
        Self { smoothed, hints }
    }

    pub fn smoothed(&self) -> &SmoothedField {
        &self.smoothed
    }

    /// Swap the smoothing kernel, keeping the field data.
    pub fn set_kernel(&mut self, kernel: Kernel) {
        self.smoothed.set_kernel(kernel);
    }
}

impl Surface for FieldSurface {
    fn value_at(&self, point: Point) -> f64 {
        self.smoothed.raw().value_at(point)
    }

    fn gradient_at(&self, point: Point) -> Point {
        self.smoothed.gradient_at(point)
    }

    fn hints(&self) -> SurfaceHints {
        self.hints
    }
}
