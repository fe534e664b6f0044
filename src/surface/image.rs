use super::{FieldSurface, Surface, SurfaceHints};
use crate::error::SurfaceError;
use crate::field::{Kernel, ScalarField, SmoothedField};
use crate::geom::{mercator, Bound, Point};
use ::image::{DynamicImage, Rgba};

const SUGGESTED_HINTS: SurfaceHints = SurfaceHints {
    gradient_scale: 0.5,
    distance_scale: 0.01,
    angle_scale: 0.01,
    momentum_scale: 0.0,
    depth_based_reduction: false,
};

/// Maps an image pixel and the target color to a field value in `[0, 1]`.
pub type ColorValueFn = fn(pixel: Rgba<u8>, target: Rgba<u8>) -> f64;

/// Default color match: the ratio of the red channels, accepted only when
/// the green and blue channels scale by the same ratio, otherwise 0. Works
/// best against monochromatic line work; a black target always yields 0.
pub fn color_ratio_value(pixel: Rgba<u8>, target: Rgba<u8>) -> f64 {
    let [r, g, b, _] = pixel.0.map(f64::from);
    let [rt, gt, bt, _] = target.0.map(f64::from);

    let ratio = r / rt;
    if ratio * gt == g && ratio * bt == b {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Surface built from a caller-supplied bitmap, e.g. a map scan, spanning a
/// lon/lat bound. Pixels matching the target color become ridges.
pub struct ImageSurface {
    surface: FieldSurface,
    scale_factor: f64,
}

impl ImageSurface {
    /// Build the surface: rasterize the color match into a field (flipping
    /// vertically, since image row 0 is the north edge and field row 0 the
    /// south edge) and install a smoothing kernel of `smoothing_std_dev`
    /// meters.
    pub fn new(
        bound_lonlat: &Bound,
        image: &DynamicImage,
        target_color: Rgba<u8>,
        smoothing_std_dev: f64,
    ) -> Result<Self, SurfaceError> {
        Self::with_color_value(
            bound_lonlat,
            image,
            target_color,
            smoothing_std_dev,
            color_ratio_value,
        )
    }

    /// Like [`ImageSurface::new`] with a custom pixel-to-value function.
    pub fn with_color_value(
        bound_lonlat: &Bound,
        image: &DynamicImage,
        target_color: Rgba<u8>,
        smoothing_std_dev: f64,
        color_value: ColorValueFn,
    ) -> Result<Self, SurfaceError> {
        if bound_lonlat.is_empty() {
            return Err(SurfaceError::BoundEmpty);
        }
        if smoothing_std_dev < 0.0 {
            return Err(SurfaceError::StdDevNegative);
        }

        let rgba = image.to_rgba8();
        let (w, h) = (rgba.width() as usize, rgba.height() as usize);
        if w < 2 || h < 2 {
            return Err(SurfaceError::Decode(format!(
                "image too small for a surface: {w}x{h}"
            )));
        }

        let planar = Bound::from_points(
            mercator::project(bound_lonlat.south_west()),
            mercator::project(bound_lonlat.north_east()),
        );

        // image row 0 is the north edge, field row 0 the south edge
        let mut field = ScalarField::new(planar, w, h);
        for (x, y, pixel) in rgba.enumerate_pixels() {
            let flipped = h - 1 - y as usize;
            field.set(x as usize, flipped, color_value(*pixel, target_color));
        }

        let scale_factor = mercator::scale_factor(bound_lonlat.center().y);
        let kernel = Kernel::new(smoothing_std_dev, scale_factor);
        Ok(Self {
            surface: FieldSurface::new(SmoothedField::new(field, kernel), SUGGESTED_HINTS),
            scale_factor,
        })
    }

    /// Re-smooth with a new standard deviation, keeping the field data.
    pub fn resmooth(&mut self, smoothing_std_dev: f64) -> Result<(), SurfaceError> {
        if smoothing_std_dev < 0.0 {
            return Err(SurfaceError::StdDevNegative);
        }
        self.surface
            .set_kernel(Kernel::new(smoothing_std_dev, self.scale_factor));
        Ok(())
    }

    /// The smoothed field backing this surface.
    pub fn smoothed(&self) -> &SmoothedField {
        self.surface.smoothed()
    }
}

impl Surface for ImageSurface {
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
