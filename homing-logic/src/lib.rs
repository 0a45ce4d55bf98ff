mod bearing;
mod geodesy;
mod location;
mod nav_state;
mod navigator;
mod sensors;
mod settings;

pub use bearing::{bearing_correction, normalize_degrees};
pub use geodesy::{EARTH_RADIUS_KM, distance, haversine, project};
pub use location::{
    Angle, Journey, Kilometers, Orientation, PlanarOffset, Position, to_degrees, to_radians,
};
pub use nav_state::{NavHistory, NavUiState};
pub use navigator::{Navigator, StateUpdateSender, UtcDT};
pub use sensors::{HeadingService, LocationService, NO_HEADING, heading_from_platform};
pub use settings::{Accuracy, SensorSettings};

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::Context;
}
