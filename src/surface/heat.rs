use super::tiles::{fill_from_tiles, mosaic_field, tile_ranges, TileSource, TILE_SIZE};
use super::{FieldSurface, Surface, SurfaceHints};
use crate::error::SurfaceError;
use crate::field::{Kernel, SmoothedField};
use crate::geom::{mercator, Bound, Point};
use serde::Deserialize;

const SUGGESTED_HINTS: SurfaceHints = SurfaceHints {
    gradient_scale: 0.5,
    distance_scale: 0.2,
    angle_scale: 0.1,
    momentum_scale: 0.7,
    depth_based_reduction: false,
};

/// Wire format of one heat tile: row-major `[0, 1]` heat values with row 0
/// at the tile's north edge.
#[derive(Debug, Deserialize)]
struct HeatTile {
    #[allow(dead_code)]
    x: u32,
    #[allow(dead_code)]
    y: u32,
    #[allow(dead_code)]
    z: u32,
    data: Vec<f64>,
}

/// Options for [`HeatTileSurface`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HeatTileOptions {
    /// Smoothing standard deviation in meters.
    pub smoothing_std_dev: f64,
    /// Maximum mosaic dimension in tiles per axis, capping memory use.
    pub max_surface_tile_dim: u64,
    /// Fetch attempts per tile before the error is surfaced.
    pub download_retries: usize,
    /// Concurrent tile fetches.
    pub download_workers: usize,
}

impl Default for HeatTileOptions {
    fn default() -> Self {
        Self {
            smoothing_std_dev: 16.0,
            max_surface_tile_dim: 7,
            download_retries: 2,
            download_workers: 4,
        }
    }
}

/// Surface built from JSON heat tiles, e.g. aggregated GPS-track heat maps.
/// The heat values are already in `[0, 1]` and used directly.
pub struct HeatTileSurface {
    surface: FieldSurface,
    scale_factor: f64,
}

impl HeatTileSurface {
    /// Build the surface: pad the bound by 5%, pick a zoom and tile range,
    /// fetch and decode the tiles, and smooth.
    pub fn build(
        bound_lonlat: &Bound,
        source: &dyn TileSource,
        options: &HeatTileOptions,
    ) -> Result<Self, SurfaceError> {
        if bound_lonlat.is_empty() {
            return Err(SurfaceError::BoundEmpty);
        }
        if options.smoothing_std_dev < 0.0 {
            return Err(SurfaceError::StdDevNegative);
        }

        let padding = (bound_lonlat.width() + bound_lonlat.height()) / 2.0 * 0.05;
        let padded = bound_lonlat.pad(padding);
        let range = tile_ranges(&padded, options.max_surface_tile_dim)?;

        let (mosaic_lonlat, mut field) = mosaic_field(&range)?;
        fill_from_tiles(
            &mut field,
            &range,
            source,
            options.download_retries,
            options.download_workers,
            decode_heat_tile,
        )?;

        let scale_factor = mercator::scale_factor(mosaic_lonlat.center().y);
        let kernel = Kernel::new(options.smoothing_std_dev, scale_factor);
        Ok(Self {
            surface: FieldSurface::new(SmoothedField::new(field, kernel), SUGGESTED_HINTS),
            scale_factor,
        })
    }

    /// Re-smooth with a new standard deviation, keeping the tile data.
    pub fn resmooth(&mut self, smoothing_std_dev: f64) -> Result<(), SurfaceError> {
        if smoothing_std_dev < 0.0 {
            return Err(SurfaceError::StdDevNegative);
        }
        self.surface
            .set_kernel(Kernel::new(smoothing_std_dev, self.scale_factor));
        Ok(())
    }

    pub fn smoothed(&self) -> &SmoothedField {
        self.surface.smoothed()
    }
}

impl Surface for HeatTileSurface {
    fn value_at(&self, point: Point) -> f64 {
        self.surface.value_at(point)
    }

    fn gradient_at(&self, point: Point) -> Point {
        self.surface.gradient_at(point)
    }

    fn hints(&self) -> SurfaceHints {
        self.surface.hints()
    }
}

fn decode_heat_tile(bytes: &[u8]) -> Result<Vec<f64>, SurfaceError> {
    let tile: HeatTile =
        serde_json::from_slice(bytes).map_err(|e| SurfaceError::Decode(e.to_string()))?;
    if tile.data.len() != TILE_SIZE * TILE_SIZE {
        return Err(SurfaceError::Decode(format!(
            "heat tile carries {} values, expected {}",
            tile.data.len(),
            TILE_SIZE * TILE_SIZE
        )));
    }
    Ok(tile.data.into_iter().map(|v| v.clamp(0.0, 1.0)).collect())
}
