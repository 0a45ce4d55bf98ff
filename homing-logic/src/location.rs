use serde::{Deserialize, Serialize};

use crate::{bearing, geodesy};

/// A scalar angle, range is not normalized unless a function says otherwise
pub type Angle = f64;

/// A distance along the surface of the earth
pub type Kilometers = f64;

pub fn to_radians(degrees: Angle) -> Angle {
    degrees.to_radians()
}

pub fn to_degrees(radians: Angle) -> Angle {
    radians.to_degrees()
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, specta::Type)]
/// Some point in the world, in degrees, as gotten from a Geolocation API
pub struct Position {
    /// Latitude
    pub lat: Angle,
    /// Longitude
    pub long: Angle,
}

impl Position {
    pub const fn new(lat: Angle, long: Angle) -> Self {
        Self { lat, long }
    }

    pub fn distance_to(&self, other: Position) -> Kilometers {
        geodesy::distance(*self, other)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, specta::Type)]
/// Device orientation in radians, in the order the orientation sensor reports it.
/// Only `heading` is used for navigation right now.
pub struct Orientation {
    /// True compass heading
    pub heading: Angle,
    pub pitch: Angle,
    pub roll: Angle,
}

impl Orientation {
    pub const fn from_heading(heading: Angle) -> Self {
        Self {
            heading,
            pitch: 0.0,
            roll: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, specta::Type)]
/// A small displacement on a locally flat patch of the earth
pub struct PlanarOffset {
    /// Kilometers towards true north
    pub north: Kilometers,
    /// Kilometers towards east
    pub east: Kilometers,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, specta::Type)]
/// A single navigation leg
pub struct Journey {
    pub start: Position,
    pub destination: Position,
}

impl Journey {
    pub const fn new(start: Position, destination: Position) -> Self {
        Self { start, destination }
    }

    /// Great-circle length of the leg
    pub fn distance(&self) -> Kilometers {
        geodesy::distance(self.start, self.destination)
    }

    /// Correction (degrees) a device at `start` facing `orientation` needs to point at the
    /// destination
    pub fn correction(&self, orientation: Orientation) -> Angle {
        bearing::bearing_correction(Some(self.start), Some(self.destination), orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_radian_round_trip() {
        for x in [-720.5, -360.0, -90.0, -1e-9, 0.0, 1e-9, 45.0, 180.0, 359.999, 1234.5678] {
            let back = to_degrees(to_radians(x));
            assert!(
                (back - x).abs() <= x.abs() * 1e-12 + 1e-12,
                "{x} came back as {back}"
            );
        }
    }

    #[test]
    fn test_position_json_field_order() {
        let pos = Position::new(12.5, -3.25);
        let json = serde_json::to_string(&pos).expect("Failed to serialize");
        assert_eq!(json, r#"{"lat":12.5,"long":-3.25}"#);
    }

    #[test]
    fn test_journey_delegates() {
        let journey = Journey::new(Position::new(0.0, 0.0), Position::new(0.0, 90.0));
        assert_eq!(
            journey.distance(),
            journey.start.distance_to(journey.destination)
        );

        let orientation = Orientation::from_heading(1.0);
        assert_eq!(
            journey.correction(orientation),
            bearing::bearing_correction(
                Some(journey.start),
                Some(journey.destination),
                orientation
            )
        );
    }
}
