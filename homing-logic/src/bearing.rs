use std::f64::consts::TAU;

use crate::{
    geodesy::{distance, project},
    location::{Angle, Orientation, PlanarOffset, Position, to_degrees},
};

/// Fold any finite angle in degrees into `[0, 360)`
pub fn normalize_degrees(degrees: Angle) -> Angle {
    let folded = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if folded >= 360.0 { 0.0 } else { folded }
}

/// Correction (in degrees) to apply to the device's heading so it points at `destination`.
///
/// `orientation.heading` is in radians. While either position is missing, or when the two are
/// the same point, no geometry is done and the heading comes back as-is in degrees
/// (un-normalized). Otherwise the result is in `[0, 360)`.
///
/// The angle at `current` is solved on a triangle with a synthetic vertex `d` km due north,
/// treating it as isoceles with two sides of length `d`. This is an approximation (it can't
/// tell east from west and degrades over long legs and near the poles). Existing clients depend
/// on these exact values, don't swap in a forward-azimuth formula.
pub fn bearing_correction(
    current: Option<Position>,
    destination: Option<Position>,
    orientation: Orientation,
) -> Angle {
    let heading = orientation.heading;

    let (Some(current), Some(destination)) = (current, destination) else {
        return to_degrees(heading);
    };

    let d = distance(current, destination);
    let two_d_squared = 2.0 * d * d;

    if two_d_squared == 0.0 {
        return to_degrees(heading);
    }

    let probe = project(
        current,
        PlanarOffset {
            north: d,
            east: 0.0,
        },
    );
    let a = distance(probe, destination);

    let gamma = ((two_d_squared - a * a) / two_d_squared)
        .clamp(-1.0, 1.0)
        .acos();

    normalize_degrees(to_degrees((heading - gamma).rem_euclid(TAU)))
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    const HERE: Position = Position::new(43.0844, -77.6749);

    fn offset(north: f64, east: f64) -> Position {
        project(HERE, PlanarOffset { north, east })
    }

    fn assert_close(actual: Angle, expected: Angle, tolerance: Angle) {
        assert!(
            (actual - expected).abs() < tolerance,
            "Expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_missing_fix_returns_heading() {
        for heading in [0.0, 1.0, -2.5, 7.5, 100.0] {
            let orientation = Orientation::from_heading(heading);
            let expected = to_degrees(heading);
            assert_eq!(bearing_correction(None, Some(HERE), orientation), expected);
            assert_eq!(bearing_correction(Some(HERE), None, orientation), expected);
            assert_eq!(bearing_correction(None, None, orientation), expected);
        }
    }

    #[test]
    fn test_pitch_and_roll_ignored() {
        let dest = offset(1.0, 1.0);
        let flat = Orientation::from_heading(0.3);
        let tilted = Orientation {
            heading: 0.3,
            pitch: 1.2,
            roll: -0.4,
        };
        assert_eq!(
            bearing_correction(Some(HERE), Some(dest), flat),
            bearing_correction(Some(HERE), Some(dest), tilted)
        );
    }

    #[test]
    fn test_same_point_returns_heading() {
        let orientation = Orientation::from_heading(2.0);
        let res = bearing_correction(Some(HERE), Some(HERE), orientation);
        assert!(!res.is_nan());
        assert_eq!(res, to_degrees(2.0));
    }

    #[test]
    fn test_nearly_same_point_stays_finite() {
        // Far enough apart for a non-zero distance, close enough that the probe lands
        // within a few ulps of the destination
        for gap in [1e-13, 3e-14, 1e-12] {
            let dest = Position::new(HERE.lat + gap, HERE.long);
            assert!(distance(HERE, dest) > 0.0);

            for heading in [0.0, 1.0, -2.0] {
                let res =
                    bearing_correction(Some(HERE), Some(dest), Orientation::from_heading(heading));
                assert!(
                    (0.0..360.0).contains(&res),
                    "{res} out of range for gap {gap} heading {heading}"
                );
            }
        }
    }

    #[test]
    fn test_destination_north() {
        let dest = offset(2.0, 0.0);
        let res = bearing_correction(Some(HERE), Some(dest), Orientation::from_heading(1.0));
        assert_close(res, to_degrees(1.0), 1e-3);
    }

    #[test]
    fn test_destination_south() {
        let dest = offset(-2.0, 0.0);
        let res = bearing_correction(Some(HERE), Some(dest), Orientation::from_heading(0.0));
        assert_close(res, 180.0, 1e-3);
    }

    #[test]
    fn test_destination_east_and_west_match() {
        let orientation = Orientation::from_heading(PI);
        let east = bearing_correction(Some(HERE), Some(offset(0.0, 1.0)), orientation);
        let west = bearing_correction(Some(HERE), Some(offset(0.0, -1.0)), orientation);

        assert_close(east, to_degrees(PI - FRAC_PI_2), 0.05);
        assert_close(west, east, 0.05);
    }

    #[test]
    fn test_negative_turn_wraps() {
        // Facing north, target south-east: heading - gamma is negative before wrapping
        let dest = offset(-1.0, 1.0);
        let res = bearing_correction(Some(HERE), Some(dest), Orientation::from_heading(0.0));
        assert_close(res, 360.0 - 135.0, 0.05);
    }

    #[test]
    fn test_result_range() {
        let destinations = [
            offset(1.0, 0.0),
            offset(0.0, 3.0),
            offset(-4.0, -4.0),
            offset(0.01, -0.02),
            Position::new(-33.8688, 151.2093),
            Position::new(0.0, 0.0),
        ];

        for dest in destinations {
            for heading in [-10.0, -PI, 0.0, 0.5, PI, 6.0, 25.0] {
                let res =
                    bearing_correction(Some(HERE), Some(dest), Orientation::from_heading(heading));
                assert!(
                    (0.0..360.0).contains(&res),
                    "{res} out of range for {dest:?} heading {heading}"
                );
            }
        }
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
    }
}
