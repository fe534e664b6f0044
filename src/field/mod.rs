//! Scalar fields and their smoothed views.
//!
//! Overview
//! - [`ScalarField`] stores a rectangular grid of values in `[0, 1]` over a
//!   planar bounding box and answers bilinear [`ScalarField::value_at`]
//!   queries.
//! - [`Kernel`] builds the 1-D symmetric smoothing taps used for separable
//!   convolution: a Gaussian with a linear spike inside one standard
//!   deviation of the center, which sharpens convergence toward ridges.
//! - [`SmoothedField`] wraps a field and a kernel and evaluates the 2-D
//!   convolution lazily, memoizing per-cell results so that only the cells a
//!   refinement actually visits are ever smoothed.
//! - [`smooth_in_place`] is the eager alternative that smooths the whole
//!   field at once; it exists for callers that want to export the smoothed
//!   raster and is validated against the lazy path.

mod grid;
mod kernel;
mod lazy;
mod smooth;

pub use grid::ScalarField;
pub use kernel::Kernel;
pub use lazy::SmoothedField;
pub use smooth::smooth_in_place;
