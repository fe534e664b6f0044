#![doc = include_str!("../README.md")]

pub mod error;
pub mod field;
pub mod geom;
pub mod reduce;
pub mod refine;
pub mod surface;

// --- High-level re-exports -------------------------------------------------

// Main entry points: the refinement driver and its configuration.
pub use crate::refine::{Contributions, RefineParams, RefineResult, Refiner};

// The capability set surfaces implement and the errors both sides report.
pub use crate::error::{RefineError, SurfaceError};
pub use crate::surface::{Surface, SurfaceHints};

/// Small prelude for quick experiments.
///
/// ```no_run
/// use ridgeline::prelude::*;
///
/// # fn example(surface: &dyn Surface) -> Result<(), RefineError> {
/// let path = Path::from_points(vec![
///     Point::new(-93.2531, 44.9782),
///     Point::new(-93.2496, 44.9803),
/// ]);
/// let refiner = Refiner::new(RefineParams::suggested(surface));
/// let result = refiner.refine(&path, surface)?;
/// println!("{} loops", result.loops_completed);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::error::{RefineError, SurfaceError};
    pub use crate::geom::{Bound, Path, Point};
    pub use crate::refine::{RefineParams, RefineResult, Refiner};
    pub use crate::surface::{Surface, SurfaceHints};
}
