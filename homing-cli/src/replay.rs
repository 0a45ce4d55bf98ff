use std::{collections::VecDeque, path::Path, sync::Mutex};

use anyhow::Context;
use homing_logic::{Angle, HeadingService, LocationService, Position, heading_from_platform};
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One recorded poll of the device sensors
pub struct RouteSample {
    /// Fix for this poll, `null` when the GPS had nothing
    #[serde(default)]
    pub position: Option<Position>,
    /// True heading in degrees as the platform reported it (`-1` for none)
    #[serde(default)]
    pub heading: Option<f64>,
}

pub fn parse_route(raw: &str) -> Result<Vec<RouteSample>> {
    serde_json::from_str(raw).context("Failed to parse route, expected a JSON array of samples")
}

pub fn load_route(path: &Path) -> Result<Vec<RouteSample>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read route file {}", path.display()))?;
    parse_route(&raw)
}

/// Plays back recorded fixes one poll at a time
pub struct ReplayLocation(Mutex<VecDeque<Option<Position>>>);

impl LocationService for ReplayLocation {
    fn get_loc(&self) -> Option<Position> {
        self.0.lock().ok()?.pop_front().flatten()
    }
}

/// Plays back recorded headings one poll at a time
pub struct ReplayHeading(Mutex<VecDeque<Option<Angle>>>);

impl HeadingService for ReplayHeading {
    fn get_heading(&self) -> Option<Angle> {
        self.0.lock().ok()?.pop_front().flatten()
    }
}

/// Split a route into the two sensor feeds, dropping "no heading" readings on the way
pub fn split_route(samples: Vec<RouteSample>) -> (ReplayLocation, ReplayHeading) {
    let (positions, headings): (VecDeque<_>, VecDeque<_>) = samples
        .into_iter()
        .map(|s| (s.position, s.heading.and_then(heading_from_platform)))
        .unzip();

    (
        ReplayLocation(Mutex::new(positions)),
        ReplayHeading(Mutex::new(headings)),
    )
}
