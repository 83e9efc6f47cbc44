//! Build-time configuration
//!
//! All thresholds are fixed when the firmware is built. The rpm thresholds live in
//! [`TachConfig`], whose default is checked in a const context so a bad set of
//! numbers fails the build instead of producing a wrong display.

/// Number of pixels on the WS2812B strip.
pub const STRIP_LEN: usize = 16;

/// The ECU is considered offline once no engine frame arrived for this long.
pub const PRESENCE_TIMEOUT_MS: u64 = 2000;

/// Throttle position (in 0.1 % units) above which a stopped engine shows the throttle bar.
pub const THROTTLE_DISPLAY_THRESHOLD_TENTHS: u16 = 200;

/// Global strip brightness, 0 to 255.
pub const BRIGHTNESS: u8 = 255;

/// PE3 ECU bus speed.
pub const CAN_BITRATE: u32 = 250_000;

/// Period of the display tick. Must stay below the shortest animation phase (20ms).
pub const TICK_MS: u64 = 10;

/// Reasons a set of rpm thresholds is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `wake_up` must be below `shift_rpm`
    WakeUpNotBelowShift,
    /// `shift_rpm` must be below `redline`
    ShiftNotBelowRedline,
}

/// Rpm thresholds for the shift light.
///
/// Guaranteed to satisfy `wake_up < shift_rpm < redline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TachConfig {
    wake_up: u16,
    shift_rpm: u16,
    redline: u16,
}

impl TachConfig {
    /// 1500 / 9000 / 12000 rpm
    pub const DEFAULT: Self = match Self::new(1500, 9000, 12000) {
        Ok(config) => config,
        Err(_) => panic!("rpm thresholds must satisfy wake_up < shift_rpm < redline"),
    };

    pub const fn new(wake_up: u16, shift_rpm: u16, redline: u16) -> Result<Self, ConfigError> {
        if wake_up >= shift_rpm {
            return Err(ConfigError::WakeUpNotBelowShift);
        }
        if shift_rpm >= redline {
            return Err(ConfigError::ShiftNotBelowRedline);
        }
        Ok(Self {
            wake_up,
            shift_rpm,
            redline,
        })
    }

    pub const fn wake_up(&self) -> u16 {
        self.wake_up
    }

    pub const fn shift_rpm(&self) -> u16 {
        self.shift_rpm
    }

    pub const fn redline(&self) -> u16 {
        self.redline
    }

    /// Rpm covered by the bar, `redline - wake_up`. Never zero.
    pub const fn bar_span(&self) -> u32 {
        (self.redline - self.wake_up) as u32
    }
}

impl Default for TachConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
