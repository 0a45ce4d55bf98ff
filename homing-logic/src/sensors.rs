use crate::location::{Angle, Position, to_radians};

/// Value some platforms report as the true heading when they don't have one
pub const NO_HEADING: f64 = -1.0;

/// Source of position fixes (GPS, a replayed route, etc.)
pub trait LocationService {
    /// Get the current position, `None` if there's no fix right now
    fn get_loc(&self) -> Option<Position>;
}

/// Source of the device's true compass heading
pub trait HeadingService {
    /// Get the current heading in radians, `None` if there's no valid heading right now
    fn get_heading(&self) -> Option<Angle>;
}

/// Convert a platform-reported true heading (degrees) into the radian heading the solver
/// expects, dropping the [NO_HEADING] sentinel and garbage values.
pub fn heading_from_platform(raw_degrees: f64) -> Option<Angle> {
    if raw_degrees == NO_HEADING || !raw_degrees.is_finite() {
        None
    } else {
        Some(to_radians(raw_degrees))
    }
}

/// Whether a fix is usable at all
pub fn is_valid_fix(pos: &Position) -> bool {
    pos.lat.is_finite() && pos.long.is_finite()
}
