use super::image::{color_ratio_value, ColorValueFn};
use super::tiles::{fill_from_tiles, mosaic_field, tile_ranges, TileSource, TILE_SIZE};
use super::{FieldSurface, Surface, SurfaceHints};
use crate::error::SurfaceError;
use crate::field::{Kernel, SmoothedField};
use crate::geom::{mercator, Bound, Point};
use ::image::Rgba;

const SUGGESTED_HINTS: SurfaceHints = SurfaceHints {
    gradient_scale: 0.5,
    distance_scale: 0.2,
    angle_scale: 0.1,
    momentum_scale: 0.7,
    depth_based_reduction: true,
};

/// Options for [`TileOverlaySurface`].
#[derive(Clone)]
pub struct TileOverlayOptions {
    /// Smoothing standard deviation in meters.
    pub smoothing_std_dev: f64,
    /// Color the overlay draws target features in.
    pub target_color: Rgba<u8>,
    /// Pixel-to-value mapping, [`color_ratio_value`] by default.
    pub color_value: ColorValueFn,
    /// Maximum mosaic dimension in tiles per axis, capping memory use.
    pub max_surface_tile_dim: u64,
    /// Fetch attempts per tile before the error is surfaced.
    pub download_retries: usize,
    /// Concurrent tile fetches.
    pub download_workers: usize,
}

impl Default for TileOverlayOptions {
    fn default() -> Self {
        Self {
            smoothing_std_dev: 16.0,
            // the "new & misaligned roads" overlays draw their target
            // centerlines in yellow
            target_color: Rgba([255, 255, 0, 255]),
            color_value: color_ratio_value,
            max_surface_tile_dim: 5,
            download_retries: 2,
            download_workers: 4,
        }
    }
}

/// Surface built from overlay map tiles: each pixel is matched against the
/// target color, so overlay line work becomes ridges to slide onto.
pub struct TileOverlaySurface {
    surface: FieldSurface,
    scale_factor: f64,
}

impl TileOverlaySurface {
    /// Build the surface: pad the bound by 5%, pick a zoom and tile range,
    /// fetch and decode the tiles, and smooth.
    pub fn build(
        bound_lonlat: &Bound,
        source: &dyn TileSource,
        options: &TileOverlayOptions,
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

        let target = options.target_color;
        let color_value = options.color_value;
        fill_from_tiles(
            &mut field,
            &range,
            source,
            options.download_retries,
            options.download_workers,
            |bytes| decode_overlay_tile(bytes, target, color_value),
        )?;

        let scale_factor = mercator::scale_factor(mosaic_lonlat.center().y);
        let kernel = Kernel::new(options.smoothing_std_dev, scale_factor);
        Ok(Self {
            surface: FieldSurface::new(SmoothedField::new(field, kernel), SUGGESTED_HINTS),
            scale_factor,
        })
    }

    /// Re-smooth with a new standard deviation, keeping the tile data. Used
    /// by progressive sharpening schedules.
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

impl Surface for TileOverlaySurface {
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

fn decode_overlay_tile(
    bytes: &[u8],
    target: Rgba<u8>,
    color_value: ColorValueFn,
) -> Result<Vec<f64>, SurfaceError> {
    let img = ::image::load_from_memory(bytes)
        .map_err(|e| SurfaceError::Decode(e.to_string()))?
        .to_rgba8();
    if img.width() as usize != TILE_SIZE || img.height() as usize != TILE_SIZE {
        return Err(SurfaceError::Decode(format!(
            "tile is {}x{}, expected {TILE_SIZE}x{TILE_SIZE}",
            img.width(),
            img.height()
        )));
    }

    Ok(img.pixels().map(|p| color_value(*p, target)).collect())
}
