use thiserror::Error;

/// Errors reported by the refinement driver.
#[derive(Error, Debug)]
pub enum RefineError {
    /// The input path does not contain enough vertices to refine.
    #[error("path must contain at least two points, got {0}")]
    PathTooShort(usize),

    /// Failure in the refinement machinery itself, e.g. the worker pool
    /// could not be created.
    #[error("internal refinement failure: {0}")]
    Internal(String),
}

/// Errors reported by surface builders.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The lon/lat bound supplied to a builder is degenerate.
    #[error("surface area bound is empty")]
    BoundEmpty,

    /// A negative smoothing standard deviation was requested.
    #[error("smoothing standard deviation is negative")]
    StdDevNegative,

    /// No tile zoom level fits the bound within the configured tile budget.
    #[error("no tile range within {0} tiles per axis covers the bound")]
    TileRangeTooWide(u64),

    /// A tile could not be fetched after the configured retries.
    #[error("tile fetch failed: {0}")]
    Fetch(String),

    /// A fetched tile could not be decoded.
    #[error("tile decode failed: {0}")]
    Decode(String),

    /// Failure in the builder machinery itself.
    #[error("internal surface failure: {0}")]
    Internal(String),
}
