use serde::{Deserialize, Serialize};

use crate::{
    bearing::bearing_correction,
    geodesy::distance,
    location::{Angle, Journey, Kilometers, Orientation, Position, to_degrees},
    navigator::UtcDT,
    settings::SensorSettings,
};

#[derive(Debug, Clone)]
/// Latest sensor samples plus the destination, everything the navigator needs to compute
/// a correction
pub struct NavState {
    /// When navigation started
    started: UtcDT,

    /// Most recent valid position fix
    position: Option<Position>,

    /// Most recent valid heading in radians
    heading: Option<Angle>,

    /// Where we're trying to go
    destination: Option<Position>,

    /// Time of the most recent position fix
    last_fix: Option<UtcDT>,

    /// Polls in a row that came back without a fix
    missed_fixes: u32,

    settings: SensorSettings,

    /// Every fix received, in order. Not capped, the whole session is handed back in
    /// [NavHistory] so it grows by one entry per poll with a fix.
    pub location_history: Vec<(UtcDT, Position)>,
}

impl NavState {
    pub fn new(settings: SensorSettings, now: UtcDT) -> Self {
        Self {
            started: now,
            position: None,
            heading: None,
            destination: None,
            last_fix: None,
            missed_fixes: 0,
            settings,
            location_history: Vec::with_capacity(30),
        }
    }

    /// Record a new fix, returns whether the position changed
    pub fn push_loc(&mut self, now: UtcDT, loc: Position) -> bool {
        let changed = self.position != Some(loc);
        self.position = Some(loc);
        self.last_fix = Some(now);
        self.missed_fixes = 0;
        self.location_history.push((now, loc));
        changed
    }

    /// Record a poll with no fix, returns `true` only on the poll where the fix becomes stale
    pub fn note_missed_fix(&mut self) -> bool {
        self.missed_fixes = self.missed_fixes.saturating_add(1);
        self.missed_fixes == self.settings.stale_after_ticks.max(1)
    }

    pub fn fix_is_stale(&self) -> bool {
        self.position.is_none() || self.missed_fixes >= self.settings.stale_after_ticks.max(1)
    }

    /// Record a new heading, returns whether the heading changed
    pub fn push_heading(&mut self, heading: Angle) -> bool {
        let changed = self.heading != Some(heading);
        self.heading = Some(heading);
        changed
    }

    pub fn set_destination(&mut self, destination: Option<Position>) {
        self.destination = destination;
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// The leg from the current position to the destination, if both are known
    pub fn journey(&self) -> Option<Journey> {
        self.position
            .zip(self.destination)
            .map(|(start, destination)| Journey::new(start, destination))
    }

    pub fn distance_km(&self) -> Option<Kilometers> {
        self.journey().map(|j| j.distance())
    }

    /// Correction in degrees, a missing heading counts as facing north
    pub fn correction_deg(&self) -> Angle {
        let orientation = Orientation::from_heading(self.heading.unwrap_or_default());
        bearing_correction(self.position, self.destination, orientation)
    }

    fn distance_travelled_km(&self) -> Kilometers {
        self.location_history
            .windows(2)
            .map(|pair| distance(pair[0].1, pair[1].1))
            .sum()
    }

    pub fn as_nav_history(&self, now: UtcDT) -> NavHistory {
        NavHistory {
            started: self.started,
            ended: now,
            destination: self.destination,
            distance_travelled_km: self.distance_travelled_km(),
            locations: self.location_history.clone(),
        }
    }

    pub fn as_ui_state(&self) -> NavUiState {
        NavUiState {
            position: self.position,
            heading_deg: self.heading.map(to_degrees),
            destination: self.destination,
            distance_km: self.distance_km(),
            correction_deg: self.correction_deg(),
            last_fix: self.last_fix,
            fix_stale: self.fix_is_stale(),
        }
    }
}

/// Record of a finished navigation session
#[derive(Debug, Clone, Serialize, Deserialize, specta::Type)]
pub struct NavHistory {
    pub started: UtcDT,
    pub ended: UtcDT,
    pub destination: Option<Position>,
    /// Sum of the great-circle distances between consecutive fixes
    pub distance_travelled_km: Kilometers,
    pub locations: Vec<(UtcDT, Position)>,
}

/// Subset of [NavState] that is meant to be sent to a UI frontend
#[derive(Debug, Clone, Serialize, Deserialize, specta::Type)]
pub struct NavUiState {
    /// Latest position fix
    pub position: Option<Position>,
    /// Latest heading in degrees
    pub heading_deg: Option<Angle>,
    /// Current destination
    pub destination: Option<Position>,
    /// Distance left to the destination
    pub distance_km: Option<Kilometers>,
    /// Angle to turn towards the destination in degrees, or just the heading if there's no
    /// destination or fix yet
    pub correction_deg: Angle,
    /// When the last fix came in **in UTC**
    pub last_fix: Option<UtcDT>,
    /// Whether the latest fix is missing or too old to trust
    pub fix_stale: bool,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use crate::geodesy::EARTH_RADIUS_KM;

    use super::*;

    fn mk_state(stale_after_ticks: u32) -> NavState {
        NavState::new(
            SensorSettings {
                stale_after_ticks,
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_no_fix_means_heading_passthrough() {
        let mut state = mk_state(3);
        state.push_heading(1.25);
        state.set_destination(Some(Position::new(1.0, 1.0)));

        let ui = state.as_ui_state();
        assert_eq!(ui.correction_deg, to_degrees(1.25));
        assert_eq!(ui.distance_km, None);
        assert!(ui.fix_stale);
    }

    #[test]
    fn test_push_loc_reports_change() {
        let mut state = mk_state(3);
        let now = Utc::now();
        assert!(state.push_loc(now, Position::new(1.0, 2.0)));
        assert!(!state.push_loc(now, Position::new(1.0, 2.0)));
        assert!(state.push_loc(now, Position::new(1.0, 2.5)));
        assert_eq!(state.location_history.len(), 3);
    }

    #[test]
    fn test_stale_reported_once() {
        let mut state = mk_state(3);
        state.push_loc(Utc::now(), Position::new(0.0, 0.0));

        assert!(!state.note_missed_fix());
        assert!(!state.note_missed_fix());
        assert!(!state.fix_is_stale());
        assert!(state.note_missed_fix());
        assert!(state.fix_is_stale());
        assert!(!state.note_missed_fix());

        state.push_loc(Utc::now(), Position::new(0.0, 0.0));
        assert!(!state.fix_is_stale());
    }

    #[test]
    fn test_history_distance() {
        let mut state = mk_state(3);
        let start = Utc::now();
        let one_degree = EARTH_RADIUS_KM * 1.0_f64.to_radians();

        state.push_loc(start, Position::new(0.0, 0.0));
        state.push_loc(start + TimeDelta::seconds(1), Position::new(1.0, 0.0));
        state.push_loc(start + TimeDelta::seconds(2), Position::new(2.0, 0.0));
        state.set_destination(Some(Position::new(3.0, 0.0)));

        let history = state.as_nav_history(start + TimeDelta::seconds(3));
        assert_eq!(history.locations.len(), 3);
        assert_eq!(history.destination, Some(Position::new(3.0, 0.0)));
        assert!((history.distance_travelled_km - 2.0 * one_degree).abs() < 1e-6);

        let left = state.distance_km().expect("Should have a journey");
        assert!((left - one_degree).abs() < 1e-6);
    }

    #[test]
    fn test_history_keeps_whole_session() {
        let mut state = mk_state(3);
        let start = Utc::now();

        for i in 0..5000 {
            state.push_loc(start + TimeDelta::seconds(i), Position::new(0.0, 0.0));
        }

        let history = state.as_nav_history(start + TimeDelta::seconds(5000));
        assert_eq!(history.locations.len(), 5000);
        assert_eq!(history.locations[0].0, start);
        assert_eq!(history.distance_travelled_km, 0.0);
    }
}
