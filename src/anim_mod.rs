//! Time-sliced strip animations
//!
//! An animation is a table of [`Phase`]s, each a whole-strip fill held for a fixed
//! time. [`PhaseCycle`] walks the table against a millisecond clock sampled by the
//! caller, so advancing it never sleeps and the CAN task keeps running between
//! phases.

use crate::render_mod::{DIM_RED, PixelBuffer, RED, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    /// Whole-strip color, `None` for dark
    pub fill: Option<Rgb>,
    pub hold_ms: u32,
}

impl Phase {
    pub const fn lit(color: Rgb, hold_ms: u32) -> Self {
        Self {
            fill: Some(color),
            hold_ms,
        }
    }

    pub const fn dark(hold_ms: u32) -> Self {
        Self {
            fill: None,
            hold_ms,
        }
    }

    pub fn paint(&self, buffer: &mut PixelBuffer) {
        match self.fill {
            Some(color) => buffer.fill(color),
            None => buffer.clear(),
        }
    }
}

/// Double pulse shown while there is no usable telemetry.
///
/// The second dim pulse has no hold and is cleared straight away.
pub const HEARTBEAT: [Phase; 5] = [
    Phase::lit(RED, 70),
    Phase::lit(DIM_RED, 80),
    Phase::lit(RED, 70),
    Phase::lit(DIM_RED, 0),
    Phase::dark(1500),
];

/// Whole strip flashing red at the rev limit.
pub const REDLINE_FLASH: [Phase; 2] = [Phase::lit(RED, 20), Phase::dark(20)];

/// Position inside a looping phase table.
#[derive(Debug, Clone, Copy)]
pub struct PhaseCycle {
    phases: &'static [Phase],
    index: usize,
    started_at: u64,
}

impl PhaseCycle {
    /// `phases` must not be empty.
    pub const fn new(phases: &'static [Phase]) -> Self {
        Self {
            phases,
            index: 0,
            started_at: 0,
        }
    }

    /// Jumps back to the first phase, starting now.
    pub fn restart(&mut self, now_ms: u64) {
        self.index = 0;
        self.started_at = now_ms;
        self.skip_empty();
    }

    pub fn current(&self) -> &Phase {
        &self.phases[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves past every phase whose hold has fully elapsed.
    ///
    /// Returns true if the current phase changed. If the caller fell behind by more
    /// than a whole cycle the remaining backlog is dropped and the current phase
    /// restarts at `now_ms`.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        let mut steps = 0;
        while now_ms.saturating_sub(self.started_at) >= u64::from(self.current().hold_ms) {
            self.started_at += u64::from(self.current().hold_ms);
            self.index = (self.index + 1) % self.phases.len();
            steps += 1;
            if steps > self.phases.len() {
                self.started_at = now_ms;
                self.skip_empty();
                break;
            }
        }
        steps > 0
    }

    fn skip_empty(&mut self) {
        for _ in 0..self.phases.len() {
            if self.current().hold_ms != 0 {
                return;
            }
            self.index = (self.index + 1) % self.phases.len();
        }
    }
}
