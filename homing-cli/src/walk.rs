use std::sync::Mutex;

use homing_logic::{
    Angle, EARTH_RADIUS_KM, HeadingService, Kilometers, LocationService, PlanarOffset, Position,
    distance, project, to_radians,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

struct WalkState {
    /// Where the walker actually is, fixes are this plus noise
    position: Position,
    rng: ChaCha20Rng,
}

/// Walks in a straight line towards a destination, one step per poll, reporting fixes with
/// seeded GPS noise.
pub struct SimulatedWalk {
    state: Mutex<WalkState>,
    destination: Position,
    step_km: Kilometers,
    noise_km: Kilometers,
}

impl SimulatedWalk {
    pub fn new(
        start: Position,
        destination: Position,
        step_km: Kilometers,
        noise_km: Kilometers,
        seed: u64,
    ) -> Self {
        Self {
            state: Mutex::new(WalkState {
                position: start,
                rng: ChaCha20Rng::seed_from_u64(seed),
            }),
            destination,
            step_km: step_km.abs(),
            noise_km: noise_km.abs(),
        }
    }

    fn step(position: Position, destination: Position, step_km: Kilometers) -> Position {
        if distance(position, destination) <= step_km {
            return destination;
        }

        let delta_long = (destination.long - position.long + 540.0).rem_euclid(360.0) - 180.0;
        let north = to_radians(destination.lat - position.lat) * EARTH_RADIUS_KM;
        // There's no east at a pole, head straight off it first
        let east = if at_pole(position) {
            0.0
        } else {
            to_radians(delta_long) * EARTH_RADIUS_KM * to_radians(position.lat).cos()
        };
        let len = north.hypot(east);

        if len == 0.0 {
            return destination;
        }

        let scale = step_km / len;
        project(
            position,
            PlanarOffset {
                north: north * scale,
                east: east * scale,
            },
        )
    }
}

fn at_pole(position: Position) -> bool {
    position.lat.abs() >= 90.0
}

impl LocationService for SimulatedWalk {
    fn get_loc(&self) -> Option<Position> {
        let mut state = self.state.lock().ok()?;
        state.position = Self::step(state.position, self.destination, self.step_km);

        let noise = self.noise_km;
        let north = state.rng.random_range(-noise..=noise);
        let east = state.rng.random_range(-noise..=noise);
        let jitter = PlanarOffset {
            north,
            east: if at_pole(state.position) { 0.0 } else { east },
        };

        let mut fix = project(state.position, jitter);
        fix.lat = fix.lat.clamp(-90.0, 90.0);
        Some(fix)
    }
}

/// Compass that never moves
pub struct FixedCompass(pub Option<Angle>);

impl HeadingService for FixedCompass {
    fn get_heading(&self) -> Option<Angle> {
        self.0
    }
}
