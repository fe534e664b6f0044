//! Web Mercator (EPSG:3857) helpers.
//!
//! The refiner assumes a surface defined in the Mercator plane. Distances in
//! that plane are stretched by `1 / cos(latitude)` relative to ground meters,
//! so meter-denominated options (resample interval, smoothing std-dev) are
//! multiplied by [`scale_factor`] before use.

use super::Point;
use std::f64::consts::PI;

/// WGS84 equatorial radius, the sphere radius used by Web Mercator.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Deepest tile zoom considered when sizing a tile mosaic.
pub const MAX_TILE_ZOOM: u32 = 17;

/// Project a lon/lat point into the Mercator plane (meters-equivalent).
#[inline]
pub fn project(p: Point) -> Point {
    let x = EARTH_RADIUS_M * p.x.to_radians();
    let y = EARTH_RADIUS_M * (PI / 4.0 + p.y.to_radians() / 2.0).tan().ln();
    Point::new(x, y)
}

/// Invert [`project`], returning lon/lat degrees.
#[inline]
pub fn inverse(p: Point) -> Point {
    let lon = (p.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (p.y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    Point::new(lon, lat)
}

/// Latitude-dependent factor converting ground meters to planar units.
#[inline]
pub fn scale_factor(latitude_deg: f64) -> f64 {
    1.0 / latitude_deg.to_radians().cos()
}

/// Slippy-map tile coordinates containing the lon/lat point at `zoom`.
/// Tile `y` grows from north to south.
pub fn tile(p: Point, zoom: u32) -> (u64, u64) {
    let n = (1u64 << zoom) as f64;
    let x = ((p.x + 180.0) / 360.0 * n).floor();
    let lat = p.y.to_radians();
    let y = ((1.0 - lat.tan().asinh() / PI) / 2.0 * n).floor();

    let max = (1u64 << zoom) - 1;
    (
        (x.max(0.0) as u64).min(max),
        (y.max(0.0) as u64).min(max),
    )
}

/// Lon/lat of the north-west corner of tile `(x, y)` at `zoom`.
pub fn tile_nw_corner(x: u64, y: u64, zoom: u32) -> Point {
    let n = (1u64 << zoom) as f64;
    let lon = x as f64 / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y as f64 / n)).sinh().atan().to_degrees();
    Point::new(lon, lat)
}
