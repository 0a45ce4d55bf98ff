use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, specta::Type)]
/// Accuracy tier to request from the platform's location provider
pub enum Accuracy {
    /// Roughly 3 km, cell towers only
    Lowest,
    /// Roughly 1 km
    Low,
    /// Roughly 100 m
    Balanced,
    /// Roughly 10 m
    High,
    /// Best the device can do
    Highest,
    /// Best the device can do, plus any extra sensors the platform can fuse in
    BestForNavigation,
}

impl Accuracy {
    /// Typical horizontal error for this tier, in meters
    pub fn expected_error_meters(&self) -> f64 {
        match self {
            Self::Lowest => 3000.0,
            Self::Low => 1000.0,
            Self::Balanced => 100.0,
            Self::High => 10.0,
            Self::Highest | Self::BestForNavigation => 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, specta::Type)]
#[serde(default)]
/// Settings handed to the sensor layer, the geometry itself takes no configuration
pub struct SensorSettings {
    /// Accuracy tier for position fixes
    pub accuracy: Accuracy,
    /// Time between sensor polls (also used as the platform's position timeout)
    pub interval_milliseconds: u32,
    /// Whether the platform may show its own settings dialog if location access is denied.
    /// Only a real platform location provider reads this, replayed and simulated fixes ignore it.
    pub may_show_user_settings_dialog: bool,
    /// Number of polls in a row without a fix before the fix is considered stale
    pub stale_after_ticks: u32,
}

impl SensorSettings {
    /// Poll interval, never zero
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_milliseconds.max(1) as u64)
    }
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::BestForNavigation,
            interval_milliseconds: 1000,
            may_show_user_settings_dialog: true,
            stale_after_ticks: 10,
        }
    }
}
