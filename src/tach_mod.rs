//! Display tick driver
//!
//! [`Tachometer`] owns the pixel buffer and the animation state. Each call to
//! [`Tachometer::tick`] takes a copy of the telemetry, selects the display mode,
//! repaints, and reports what changed so the caller only pushes pixels to the
//! strip when needed.

use crate::anim_mod::{HEARTBEAT, PhaseCycle, REDLINE_FLASH};
use crate::config_mod::TachConfig;
use crate::mode_mod::{DisplayMode, select_mode};
use crate::render_mod::{
    PixelBuffer, render_battery, render_rev_range, render_shift_point, render_throttle,
};
use crate::telemetry_mod::{TelemetrySnapshot, TelemetryState};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    pub mode: DisplayMode,
    /// The mode differs from the previous tick
    pub mode_changed: bool,
    /// `Some(present)` when the ECU came online or went offline this tick
    pub presence_changed: Option<bool>,
    /// The pixel buffer differs from the last one handed out
    pub dirty: bool,
}

pub struct Tachometer {
    config: TachConfig,
    mode: DisplayMode,
    bus_present: bool,
    heartbeat: PhaseCycle,
    redline: PhaseCycle,
    pixels: PixelBuffer,
    started: bool,
}

impl Tachometer {
    pub const fn new(config: TachConfig) -> Self {
        Self {
            config,
            mode: DisplayMode::Idle,
            bus_present: false,
            heartbeat: PhaseCycle::new(&HEARTBEAT),
            redline: PhaseCycle::new(&REDLINE_FLASH),
            pixels: PixelBuffer::new(),
            started: false,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn tick(&mut self, telemetry: &TelemetryState, now_ms: u64) -> TickOutcome {
        let snapshot = telemetry.snapshot(now_ms);

        let presence_changed =
            (snapshot.bus_present != self.bus_present).then_some(snapshot.bus_present);
        self.bus_present = snapshot.bus_present;

        let mode = select_mode(&snapshot, &self.config);
        let mode_changed = !self.started || mode != self.mode;
        if mode_changed {
            self.enter(mode, now_ms);
        }
        self.started = true;

        let before = self.pixels;
        self.paint(&snapshot, now_ms);

        TickOutcome {
            mode,
            mode_changed,
            presence_changed,
            dirty: mode_changed || self.pixels != before,
        }
    }

    fn enter(&mut self, mode: DisplayMode, now_ms: u64) {
        self.mode = mode;
        match mode {
            DisplayMode::Idle => self.heartbeat.restart(now_ms),
            DisplayMode::Redline => self.redline.restart(now_ms),
            _ => {}
        }
    }

    fn paint(&mut self, snapshot: &TelemetrySnapshot, now_ms: u64) {
        match self.mode {
            DisplayMode::Idle => {
                self.heartbeat.advance(now_ms);
                self.heartbeat.current().paint(&mut self.pixels);
            }
            DisplayMode::Redline => {
                self.redline.advance(now_ms);
                self.redline.current().paint(&mut self.pixels);
            }
            DisplayMode::RevRange => render_rev_range(&mut self.pixels, snapshot.rpm, &self.config),
            DisplayMode::ShiftPoint => {
                render_shift_point(&mut self.pixels, snapshot.rpm, &self.config)
            }
            DisplayMode::ThrottlePosition => render_throttle(&mut self.pixels, snapshot.tps_tenths),
            DisplayMode::BatteryStatus => render_battery(&mut self.pixels, snapshot.centivolts),
        }
    }
}

impl Default for Tachometer {
    fn default() -> Self {
        Self::new(TachConfig::DEFAULT)
    }
}
