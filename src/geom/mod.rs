//! Geometric primitives shared across the crate.
//!
//! A [`Point`] is a plain `nalgebra` 2-D vector. At the public API boundary
//! its components are longitude/latitude degrees (EPSG:4326); inside the
//! refiner everything lives in the Web Mercator plane (EPSG:3857), see
//! [`mercator`]. [`Path`] is an ordered polyline of points and [`Bound`] an
//! axis-aligned rectangle used both for lon/lat extents and for the planar
//! extents of a scalar field.

pub mod bound;
pub mod mercator;
pub mod path;

pub use bound::Bound;
pub use path::Path;

/// 2-D point. Longitude/latitude at the API boundary (`x` = lon, `y` = lat),
/// projected planar coordinates internally.
pub type Point = nalgebra::Vector2<f64>;

/// Great-circle distance in meters between two lon/lat points (haversine).
pub fn haversine_distance(a: Point, b: Point) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.x - a.x).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * mercator::EARTH_RADIUS_M * h.sqrt().asin()
}
