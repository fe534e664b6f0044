use crate::error::SurfaceError;
use crate::field::ScalarField;
use crate::geom::{mercator, Bound};
use log::debug;
use rayon::prelude::*;

/// Square tile edge length in pixels, shared by every tile scheme.
pub const TILE_SIZE: usize = 256;

/// Supplies raw tile bytes for a slippy-map coordinate. Implementations own
/// transport (HTTP, disk cache, in-memory fixtures); the builders own
/// decoding and retries.
pub trait TileSource: Sync {
    fn fetch(&self, x: u64, y: u64, zoom: u32) -> Result<Vec<u8>, SurfaceError>;
}

/// Inclusive tile coordinate ranges at a fixed zoom. Tile `y` grows
/// southward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRange {
    pub x_min: u64,
    pub x_max: u64,
    pub y_min: u64,
    pub y_max: u64,
    pub zoom: u32,
}

impl TileRange {
    pub fn width(&self) -> u64 {
        self.x_max - self.x_min + 1
    }

    pub fn height(&self) -> u64 {
        self.y_max - self.y_min + 1
    }

    pub fn tile_count(&self) -> u64 {
        self.width() * self.height()
    }

    fn tiles(&self) -> Vec<(u64, u64)> {
        let mut out = Vec::with_capacity(self.tile_count() as usize);
        for x in self.x_min..=self.x_max {
            for y in self.y_min..=self.y_max {
                out.push((x, y));
            }
        }
        out
    }

    /// Lon/lat bound of the full tile mosaic.
    pub fn bound_lonlat(&self) -> Bound {
        let nw = mercator::tile_nw_corner(self.x_min, self.y_min, self.zoom);
        let se = mercator::tile_nw_corner(self.x_max + 1, self.y_max + 1, self.zoom);
        Bound::from_points(nw, se)
    }
}

/// Choose the deepest zoom level (at most [`mercator::MAX_TILE_ZOOM`]) whose
/// tile range covers the lon/lat bound within `max_tile_dim` tiles per axis.
///
/// The range is computed one level deeper and then halved with a one-tile
/// shift, which guarantees at least half a tile of margin around the bound;
/// paths hugging a tile edge would otherwise lack surface on one side.
pub fn tile_ranges(bound_lonlat: &Bound, max_tile_dim: u64) -> Result<TileRange, SurfaceError> {
    let sw = bound_lonlat.south_west();
    let ne = bound_lonlat.north_east();

    for zoom in (0..=mercator::MAX_TILE_ZOOM).rev() {
        // tile y grows from the north, so the NE corner gives y_min
        let (x_min, y_max) = mercator::tile(sw, zoom + 1);
        let (x_max, y_min) = mercator::tile(ne, zoom + 1);

        let range = TileRange {
            x_min: x_min.saturating_sub(1) >> 1,
            x_max: (x_max + 1) >> 1,
            y_min: y_min.saturating_sub(1) >> 1,
            y_max: (y_max + 1) >> 1,
            zoom,
        };

        if range.width() <= max_tile_dim && range.height() <= max_tile_dim {
            debug!(
                "tile range {}x{} at zoom {}",
                range.width(),
                range.height(),
                range.zoom
            );
            return Ok(range);
        }
    }

    Err(SurfaceError::TileRangeTooWide(max_tile_dim))
}

/// Planar field sized and positioned for the mosaic of `range`, zero-filled.
pub(crate) fn mosaic_field(range: &TileRange) -> Result<(Bound, ScalarField), SurfaceError> {
    let lonlat = range.bound_lonlat();
    let planar = Bound::from_points(
        mercator::project(lonlat.south_west()),
        mercator::project(lonlat.north_east()),
    );
    if planar.is_empty() {
        return Err(SurfaceError::BoundEmpty);
    }

    let w = range.width() as usize * TILE_SIZE;
    let h = range.height() as usize * TILE_SIZE;
    Ok((lonlat, ScalarField::new(planar, w, h)))
}

/// Fetch and decode every tile of `range` in parallel with `workers`
/// threads, retrying each fetch up to `retries` times, then blit the decoded
/// values into the field. Tiles are decoded to `TILE_SIZE²` row-major values
/// with row 0 at the tile's north edge; the blit flips them into the
/// south-origin field. The first error aborts the remaining work.
pub(crate) fn fill_from_tiles<D>(
    field: &mut ScalarField,
    range: &TileRange,
    source: &dyn TileSource,
    retries: usize,
    workers: usize,
    decode: D,
) -> Result<(), SurfaceError>
where
    D: Fn(&[u8]) -> Result<Vec<f64>, SurfaceError> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| SurfaceError::Internal(format!("tile worker pool: {e}")))?;

    let decoded: Result<Vec<((u64, u64), Vec<f64>)>, SurfaceError> = pool.install(|| {
        range
            .tiles()
            .into_par_iter()
            .map(|(x, y)| {
                let bytes = fetch_with_retry(source, x, y, range.zoom, retries)?;
                let values = decode(&bytes)?;
                if values.len() != TILE_SIZE * TILE_SIZE {
                    return Err(SurfaceError::Decode(format!(
                        "tile {x}/{y} decoded to {} values, expected {}",
                        values.len(),
                        TILE_SIZE * TILE_SIZE
                    )));
                }
                Ok(((x, y), values))
            })
            .collect()
    });

    let flip = field.height() - 1;
    for ((x, y), values) in decoded? {
        let x_start = (x - range.x_min) as usize * TILE_SIZE;
        let y_start = (y - range.y_min) as usize * TILE_SIZE;
        for k in 0..TILE_SIZE {
            let row = flip - (y_start + k);
            for l in 0..TILE_SIZE {
                field.set(x_start + l, row, values[k * TILE_SIZE + l]);
            }
        }
    }

    Ok(())
}

fn fetch_with_retry(
    source: &dyn TileSource,
    x: u64,
    y: u64,
    zoom: u32,
    retries: usize,
) -> Result<Vec<u8>, SurfaceError> {
    let attempts = retries.max(1);
    let mut attempt = 0;
    loop {
        match source.fetch(x, y, zoom) {
            Ok(bytes) => return Ok(bytes),
            Err(err) if attempt + 1 < attempts => {
                debug!("tile {x}/{y} fetch attempt {} failed: {err}", attempt + 1);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn small_bound() -> Bound {
        // a few hundred meters in a mid-latitude city
        Bound::from_points(Point::new(-93.256, 44.976), Point::new(-93.251, 44.979))
    }

    #[test]
    fn tile_ranges_fit_within_budget() {
        let range = tile_ranges(&small_bound(), 5).expect("range exists");
        assert!(range.width() <= 5 && range.height() <= 5);
        assert!(range.zoom <= mercator::MAX_TILE_ZOOM);
        assert_eq!(range.tile_count(), range.width() * range.height());
    }

    #[test]
    fn tile_ranges_cover_the_bound_with_margin() {
        let range = tile_ranges(&small_bound(), 7).expect("range exists");
        let mosaic = range.bound_lonlat();
        assert!(mosaic.contains(small_bound().south_west()));
        assert!(mosaic.contains(small_bound().north_east()));
    }

    #[test]
    fn smaller_budget_picks_coarser_zoom() {
        let wide = tile_ranges(&small_bound(), 7).expect("range exists");
        let narrow = tile_ranges(&small_bound(), 2).expect("range exists");
        assert!(narrow.zoom <= wide.zoom);
    }

    struct FlakySource {
        failures: AtomicUsize,
    }

    impl TileSource for FlakySource {
        fn fetch(&self, x: u64, y: u64, _zoom: u32) -> Result<Vec<u8>, SurfaceError> {
            if self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n > 0).then(|| n - 1)
            }).is_ok()
            {
                return Err(SurfaceError::Fetch(format!("transient {x}/{y}")));
            }
            Ok(vec![1u8])
        }
    }

    #[test]
    fn fill_retries_transient_fetch_failures() {
        let range = TileRange {
            x_min: 10,
            x_max: 10,
            y_min: 20,
            y_max: 20,
            zoom: 12,
        };
        let (_, mut field) = mosaic_field(&range).expect("mosaic field");
        let source = FlakySource {
            failures: AtomicUsize::new(1),
        };
        let result = fill_from_tiles(&mut field, &range, &source, 2, 2, |_| {
            Ok(vec![0.5; TILE_SIZE * TILE_SIZE])
        });
        assert!(result.is_ok());
        assert_eq!(field.get(0, 0), 0.5);
    }

    #[test]
    fn fill_surfaces_persistent_failures() {
        let range = TileRange {
            x_min: 0,
            x_max: 1,
            y_min: 0,
            y_max: 0,
            zoom: 5,
        };
        let (_, mut field) = mosaic_field(&range).expect("mosaic field");
        let source = FlakySource {
            failures: AtomicUsize::new(usize::MAX),
        };
        let result = fill_from_tiles(&mut field, &range, &source, 2, 2, |_| {
            Ok(vec![0.0; TILE_SIZE * TILE_SIZE])
        });
        assert!(matches!(result, Err(SurfaceError::Fetch(_))));
    }

    #[test]
    fn fill_flips_tiles_vertically() {
        let range = TileRange {
            x_min: 3,
            x_max: 3,
            y_min: 7,
            y_max: 7,
            zoom: 10,
        };
        let (_, mut field) = mosaic_field(&range).expect("mosaic field");
        struct One;
        impl TileSource for One {
            fn fetch(&self, _: u64, _: u64, _: u32) -> Result<Vec<u8>, SurfaceError> {
                Ok(Vec::new())
            }
        }
        // mark the tile's north-west pixel
        fill_from_tiles(&mut field, &range, &One, 1, 1, |_| {
            let mut v = vec![0.0; TILE_SIZE * TILE_SIZE];
            v[0] = 1.0;
            Ok(v)
        })
        .expect("fill succeeds");
        assert_eq!(field.get(0, field.height() - 1), 1.0);
        assert_eq!(field.get(0, 0), 0.0);
    }
}
