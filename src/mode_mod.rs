//! Display mode selection
//!
//! Exactly one [`DisplayMode`] is active at a time. [`select_mode`] picks it from a
//! telemetry snapshot with a fixed precedence, first match wins:
//!
//! 1. ECU offline: `Idle`, whatever the stale readings say
//! 2. `rpm == 0` and throttle above 20 %: `ThrottlePosition`
//! 3. engine stopped: `BatteryStatus`
//! 4. `rpm < shift_rpm`: `RevRange`
//! 5. `shift_rpm <= rpm < redline`: `ShiftPoint`
//! 6. `rpm >= redline`: `Redline`

use crate::config_mod::{THROTTLE_DISPLAY_THRESHOLD_TENTHS, TachConfig};
use crate::telemetry_mod::TelemetrySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Heartbeat animation, no usable telemetry
    #[default]
    Idle,
    /// Green rpm bar
    RevRange,
    /// Yellow rpm bar
    ShiftPoint,
    /// Whole strip flashing red
    Redline,
    /// Cyan throttle bar while the engine is stopped
    ThrottlePosition,
    /// Whole strip in a battery voltage color
    BatteryStatus,
}

pub fn select_mode(snapshot: &TelemetrySnapshot, config: &TachConfig) -> DisplayMode {
    if !snapshot.bus_present {
        return DisplayMode::Idle;
    }
    if snapshot.rpm == 0 && snapshot.tps_tenths > THROTTLE_DISPLAY_THRESHOLD_TENTHS {
        return DisplayMode::ThrottlePosition;
    }
    if !snapshot.engine_running {
        return DisplayMode::BatteryStatus;
    }
    if snapshot.rpm < config.shift_rpm() {
        DisplayMode::RevRange
    } else if snapshot.rpm < config.redline() {
        DisplayMode::ShiftPoint
    } else {
        DisplayMode::Redline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(rpm: u16, tps_tenths: u16, bus_present: bool) -> TelemetrySnapshot {
        TelemetrySnapshot {
            rpm,
            tps_tenths,
            centivolts: Some(1250),
            engine_running: rpm != 0,
            bus_present,
        }
    }

    fn mode(rpm: u16, tps_tenths: u16) -> DisplayMode {
        select_mode(&snap(rpm, tps_tenths, true), &TachConfig::DEFAULT)
    }

    #[test]
    fn rpm_bands() {
        assert_eq!(mode(1, 0), DisplayMode::RevRange);
        assert_eq!(mode(8999, 0), DisplayMode::RevRange);
        assert_eq!(mode(9000, 0), DisplayMode::ShiftPoint);
        assert_eq!(mode(9500, 0), DisplayMode::ShiftPoint);
        assert_eq!(mode(11999, 0), DisplayMode::ShiftPoint);
        assert_eq!(mode(12000, 0), DisplayMode::Redline);
        assert_eq!(mode(13000, 0), DisplayMode::Redline);
    }

    #[test]
    fn throttle_bar_needs_stopped_engine_and_threshold() {
        assert_eq!(mode(0, 250), DisplayMode::ThrottlePosition);
        assert_eq!(mode(0, 201), DisplayMode::ThrottlePosition);
        assert_eq!(mode(0, 200), DisplayMode::BatteryStatus);
        assert_eq!(mode(3000, 800), DisplayMode::RevRange);
    }

    #[test]
    fn battery_status_when_stopped_and_online() {
        assert_eq!(mode(0, 0), DisplayMode::BatteryStatus);
        assert_eq!(mode(0, 150), DisplayMode::BatteryStatus);
    }

    #[test]
    fn offline_is_always_idle() {
        let config = TachConfig::DEFAULT;
        for (rpm, tps) in [(0, 0), (0, 900), (5000, 0), (9500, 0), (13000, 0)] {
            assert_eq!(select_mode(&snap(rpm, tps, false), &config), DisplayMode::Idle);
        }
    }

    #[test]
    fn thresholds_come_from_config() {
        let config = TachConfig::new(1000, 5000, 6000).unwrap();
        assert_eq!(select_mode(&snap(5500, 0, true), &config), DisplayMode::ShiftPoint);
        assert_eq!(select_mode(&snap(6000, 0, true), &config), DisplayMode::Redline);
    }
}
