use anyhow::bail;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::prelude::*;

use crate::{
    location::{Journey, Position},
    nav_state::{NavHistory, NavState, NavUiState},
    sensors::{HeadingService, LocationService, is_valid_fix},
    settings::SensorSettings,
};

/// Convenience alias for UTC DT
pub type UtcDT = DateTime<Utc>;

pub trait StateUpdateSender {
    fn send_update(&self);
}

/// Polls a [LocationService] and a [HeadingService] on an interval and keeps the latest
/// distance and correction towards a destination up to date.
///
/// Lifecycle is explicit: [Navigator::main_loop] runs until [Navigator::stop] is called.
pub struct Navigator<L: LocationService, H: HeadingService, S: StateUpdateSender> {
    state: RwLock<NavState>,
    location: L,
    heading: H,
    state_update_sender: S,
    interval: Duration,
    cancel: CancellationToken,
}

impl<L: LocationService, H: HeadingService, S: StateUpdateSender> Navigator<L, H, S> {
    pub fn new(settings: SensorSettings, location: L, heading: H, state_update_sender: S) -> Self {
        let interval = settings.interval();
        let state = NavState::new(settings, Self::get_now());

        Self {
            state: RwLock::new(state),
            location,
            heading,
            state_update_sender,
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Navigate towards `destination`, the latitude must be within ±90°
    pub async fn set_destination(&self, destination: Position) -> Result {
        if !is_valid_fix(&destination) {
            bail!("Destination {destination:?} isn't a finite position");
        }
        if destination.lat.abs() > 90.0 {
            bail!("Destination latitude {} is outside [-90, 90]", destination.lat);
        }

        info!("Navigating to {destination:?}");
        self.state.write().await.set_destination(Some(destination));
        self.state_update_sender.send_update();
        Ok(())
    }

    pub async fn clear_destination(&self) {
        info!("Destination cleared");
        self.state.write().await.set_destination(None);
        self.state_update_sender.send_update();
    }

    pub async fn get_ui_state(&self) -> NavUiState {
        self.state.read().await.as_ui_state()
    }

    pub async fn journey(&self) -> Option<Journey> {
        self.state.read().await.journey()
    }

    /// Poll sensors once. Returns whether anything the UI shows changed.
    fn tick(&self, state: &mut NavState, now: UtcDT) -> bool {
        let mut changed = false;

        match self.location.get_loc().filter(is_valid_fix) {
            Some(loc) => {
                debug!("Fix at {loc:?}");
                changed |= state.push_loc(now, loc);
            }
            None => {
                if state.note_missed_fix() {
                    warn!(
                        "Position fix went stale, last known position is {:?}",
                        state.position()
                    );
                    changed = true;
                }
            }
        }

        if let Some(heading) = self.heading.get_heading().filter(|h| h.is_finite()) {
            changed |= state.push_heading(heading);
        }

        changed
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    #[cfg(test)]
    fn get_now() -> UtcDT {
        let fake = tokio::time::Instant::now();
        let real = std::time::Instant::now();
        Utc::now() + fake.into_std().duration_since(real)
    }

    #[cfg(not(test))]
    fn get_now() -> UtcDT {
        Utc::now()
    }

    /// Main loop of the navigator, polls sensors every interval until [Navigator::stop] is
    /// called, then returns everything that was recorded.
    pub async fn main_loop(&self) -> NavHistory {
        let mut interval = tokio::time::interval(self.interval);

        info!("Starting navigation, polling every {:?}", self.interval);

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    break;
                }

                _ = interval.tick() => {
                    let mut state = self.state.write().await;
                    if self.tick(&mut state, Self::get_now()) {
                        self.state_update_sender.send_update();
                    }
                }
            }
        }

        let history = self.state.read().await.as_nav_history(Self::get_now());

        info!(
            "Navigation stopped after {} fixes, travelled {:.3} km",
            history.locations.len(),
            history.distance_travelled_km
        );

        history
    }
}
