//! Great-circle distance and small-offset projection on a spherical earth.
//!
//! Every [Position] crossing this module's boundary is in degrees, the trig
//! runs in radians.

use crate::location::{Angle, Kilometers, PlanarOffset, Position, to_degrees, to_radians};

/// Mean radius of the earth
pub const EARTH_RADIUS_KM: Kilometers = 6371.0;

/// Haversine of an angle in radians, `(1 - cos(theta)) / 2`.
///
/// Evaluated as `sin²(theta / 2)`, the `1 - cos` form cancels badly for the short distances
/// a walking user cares about.
pub fn haversine(theta: Angle) -> f64 {
    (theta / 2.0).sin().powi(2)
}

/// Great-circle distance between two positions using the haversine formula.
///
/// Identical points give exactly `0.0`. The radicand is clamped to `[0, 1]` so rounding
/// can never push `sqrt`/`asin` into `NaN`, which makes this total over finite input.
pub fn distance(a: Position, b: Position) -> Kilometers {
    let (lat_a, long_a) = (to_radians(a.lat), to_radians(a.long));
    let (lat_b, long_b) = (to_radians(b.lat), to_radians(b.long));

    let h = haversine(lat_a - lat_b) + lat_a.cos() * lat_b.cos() * haversine(long_b - long_a);

    2.0 * EARTH_RADIUS_KM * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Move `origin` by a small planar `offset` with a flat-earth approximation.
///
/// Only accurate for offsets much smaller than [EARTH_RADIUS_KM].
///
/// At exactly `lat = ±90°` the east component divides by `cos(lat) = 0`, so any non-zero
/// `offset.east` gives a non-finite longitude. This is a known singularity and isn't masked.
/// Latitudes very close to the poles give huge (finite, meaningless) longitudes instead.
/// A zero east component never touches longitude.
pub fn project(origin: Position, offset: PlanarOffset) -> Position {
    let lat = origin.lat + to_degrees(offset.north / EARTH_RADIUS_KM);

    let long = if offset.east == 0.0 {
        origin.long
    } else {
        // cos(to_radians(90.0)) isn't exactly zero in floating point
        let cos_lat = if origin.lat.abs() == 90.0 {
            0.0
        } else {
            to_radians(origin.lat).cos()
        };
        origin.long + to_degrees(offset.east / (EARTH_RADIUS_KM * cos_lat))
    };

    Position { lat, long }
}
