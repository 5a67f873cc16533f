//! Telemetry cadence
//!
//! While a peer is subscribed the bridge ticks every 50 ms. A tick only turns
//! into a notification when the motion fields changed, or when one of the
//! idle counters has run past its refresh threshold. The counters bound how
//! stale the environment fields can get when the board is not moving.

use embassy_time::Duration;

use crate::config::BridgeConfig;
use crate::radio::StackError;

/// Periodic timer that feeds [`crate::BridgeEvent::Tick`] into the event queue.
pub trait TickTimer {
    /// Start (or restart) periodic ticks at `period`.
    fn start(&mut self, period: Duration) -> Result<(), StackError>;

    /// Stop ticking. Stopping an idle timer is not an error.
    fn stop(&mut self) -> Result<(), StackError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceState {
    /// No subscriber; the timer is stopped.
    Idle,
    /// A peer has notifications enabled; the timer is running.
    Streaming,
}

/// What a tick asks the bridge to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Not streaming; drop the tick.
    Ignore,
    /// Nothing worth sending.
    Skip,
    /// Refresh the environment fields and notify.
    Notify,
}

#[derive(Debug, Clone)]
pub struct CadenceController {
    state: CadenceState,
    imu_idle: u16,
    rht_idle: u16,
    imu_threshold: u16,
    rht_threshold: u16,
}

impl CadenceController {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            state: CadenceState::Idle,
            imu_idle: 0,
            rht_idle: 0,
            imu_threshold: config.motion_refresh_ticks.into(),
            rht_threshold: config.environment_refresh_ticks.into(),
        }
    }

    pub fn state(&self) -> CadenceState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.state == CadenceState::Streaming
    }

    /// `(imu, rht)` idle tick counters.
    pub fn counters(&self) -> (u16, u16) {
        (self.imu_idle, self.rht_idle)
    }

    /// Enter Streaming. The caller notifies right away, so counting restarts.
    pub fn start(&mut self) {
        self.state = CadenceState::Streaming;
        self.reset();
    }

    pub fn stop(&mut self) {
        self.state = CadenceState::Idle;
    }

    pub fn reset(&mut self) {
        self.imu_idle = 0;
        self.rht_idle = 0;
    }

    /// Account for one tick given the motion encoder's change flag.
    ///
    /// Each counter holds the number of ticks since the last notification,
    /// including this one, and a refresh fires once either passes its
    /// threshold. With the default threshold of 20 the 21st idle tick
    /// notifies, and both counters go back to 0. The counters are wider than
    /// the thresholds, so every threshold a config can carry is reachable.
    pub fn on_tick(&mut self, motion_changed: bool) -> TickAction {
        if !self.is_streaming() {
            return TickAction::Ignore;
        }

        self.imu_idle = self.imu_idle.saturating_add(1);
        self.rht_idle = self.rht_idle.saturating_add(1);

        if motion_changed || self.imu_idle > self.imu_threshold || self.rht_idle > self.rht_threshold
        {
            self.reset();
            TickAction::Notify
        } else {
            TickAction::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streaming() -> CadenceController {
        let mut cadence = CadenceController::new(&BridgeConfig::default());
        cadence.start();
        cadence
    }

    #[test]
    fn test_idle_controller_ignores_ticks() {
        let mut cadence = CadenceController::new(&BridgeConfig::default());
        assert_eq!(cadence.on_tick(true), TickAction::Ignore);
        assert_eq!(cadence.counters(), (0, 0));
    }

    #[test]
    fn test_refresh_forced_on_tick_21() {
        let mut cadence = streaming();

        for tick in 1..=20 {
            assert_eq!(cadence.on_tick(false), TickAction::Skip, "tick {}", tick);
        }
        assert_eq!(cadence.counters(), (20, 20));

        assert_eq!(cadence.on_tick(false), TickAction::Notify);
        assert_eq!(cadence.counters(), (0, 0));
    }

    #[test]
    fn test_motion_change_notifies_and_resets() {
        let mut cadence = streaming();
        for _ in 0..7 {
            cadence.on_tick(false);
        }

        assert_eq!(cadence.on_tick(true), TickAction::Notify);
        assert_eq!(cadence.counters(), (0, 0));

        // The forced refresh is measured from the last notification.
        for _ in 1..=20 {
            assert_eq!(cadence.on_tick(false), TickAction::Skip);
        }
        assert_eq!(cadence.on_tick(false), TickAction::Notify);
    }

    #[test]
    fn test_counters_never_exceed_threshold_plus_one() {
        let mut cadence = streaming();
        for _ in 0..1000 {
            cadence.on_tick(false);
            let (imu, rht) = cadence.counters();
            assert!(imu <= 21 && rht <= 21);
        }
    }

    #[test]
    fn test_shorter_environment_threshold_wins() {
        let config = BridgeConfig {
            environment_refresh_ticks: 4,
            ..BridgeConfig::default()
        };
        let mut cadence = CadenceController::new(&config);
        cadence.start();

        for _ in 0..4 {
            assert_eq!(cadence.on_tick(false), TickAction::Skip);
        }
        assert_eq!(cadence.on_tick(false), TickAction::Notify);
    }

    #[test]
    fn test_max_threshold_still_forces_refresh() {
        let config = BridgeConfig {
            motion_refresh_ticks: u8::MAX,
            environment_refresh_ticks: u8::MAX,
            ..BridgeConfig::default()
        };
        let config = BridgeConfig::from_bytes(&config.to_bytes().unwrap()).unwrap();
        let mut cadence = CadenceController::new(&config);
        cadence.start();

        for tick in 1..=255 {
            assert_eq!(cadence.on_tick(false), TickAction::Skip, "tick {}", tick);
        }
        assert_eq!(cadence.counters(), (255, 255));
        assert_eq!(cadence.on_tick(false), TickAction::Notify);
        assert_eq!(cadence.counters(), (0, 0));
    }

    #[test]
    fn test_stop_returns_to_idle() {
        let mut cadence = streaming();
        cadence.stop();
        assert_eq!(cadence.state(), CadenceState::Idle);
        assert_eq!(cadence.on_tick(false), TickAction::Ignore);
    }
}
