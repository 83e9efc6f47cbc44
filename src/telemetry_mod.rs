//! Last known ECU readings
//!
//! [`TelemetryState`] is written by the CAN receive path and read by the display
//! tick. It is `Copy` so the tick can take a consistent copy under a short lock and
//! work on it without holding the lock.
//!
//! Presence of the ECU is derived, never stored: only engine (PE1) frames count,
//! because the electrical frame alone does not prove the engine side of the ECU is
//! talking. Stale readings are kept after a timeout, they are simply ignored.

use crate::can_mod::{ElectricalEvent, EngineEvent, FrameError, FrameListener, TelemetryEvent};
use crate::config_mod::PRESENCE_TIMEOUT_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineReading {
    pub rpm: u16,
    /// Throttle position in 0.1 % units
    pub tps_tenths: u16,
    /// Arrival time of the last engine frame (ms)
    pub updated_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ElectricalReading {
    /// Battery voltage in 0.01 V units
    pub centivolts: u16,
    /// Arrival time of the last electrical frame (ms)
    pub updated_at: u64,
}

/// Everything the mode selector looks at, evaluated at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetrySnapshot {
    pub rpm: u16,
    pub tps_tenths: u16,
    /// `None` until the first electrical frame
    pub centivolts: Option<u16>,
    pub engine_running: bool,
    pub bus_present: bool,
}

impl TelemetrySnapshot {
    /// Throttle position in percent
    pub fn tps(&self) -> f32 {
        f32::from(self.tps_tenths) / 10.0
    }

    /// Battery voltage in volts
    pub fn voltage(&self) -> Option<f32> {
        self.centivolts.map(|cv| f32::from(cv) / 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetryState {
    engine: Option<EngineReading>,
    electrical: Option<ElectricalReading>,
}

impl TelemetryState {
    pub const fn new() -> Self {
        Self {
            engine: None,
            electrical: None,
        }
    }

    pub fn engine(&self) -> Option<&EngineReading> {
        self.engine.as_ref()
    }

    pub fn electrical(&self) -> Option<&ElectricalReading> {
        self.electrical.as_ref()
    }

    /// Any engine frame refreshes presence, including one reporting 0 rpm.
    pub fn apply_engine_event(&mut self, event: EngineEvent, now_ms: u64) {
        self.engine = Some(EngineReading {
            rpm: event.rpm,
            tps_tenths: event.tps_tenths,
            updated_at: now_ms,
        });
    }

    /// Updates the voltage only. Does not count towards presence.
    pub fn apply_electrical_event(&mut self, event: ElectricalEvent, now_ms: u64) {
        self.electrical = Some(ElectricalReading {
            centivolts: event.centivolts,
            updated_at: now_ms,
        });
    }

    pub fn apply(&mut self, event: TelemetryEvent, now_ms: u64) {
        match event {
            TelemetryEvent::Engine(engine) => self.apply_engine_event(engine, now_ms),
            TelemetryEvent::Electrical(electrical) => {
                self.apply_electrical_event(electrical, now_ms)
            }
        }
    }

    /// True while the last engine frame is younger than [`PRESENCE_TIMEOUT_MS`].
    ///
    /// A frame stamped after `now_ms` counts as fresh.
    pub fn is_bus_present(&self, now_ms: u64) -> bool {
        self.engine
            .is_some_and(|e| now_ms.saturating_sub(e.updated_at) < PRESENCE_TIMEOUT_MS)
    }

    pub fn snapshot(&self, now_ms: u64) -> TelemetrySnapshot {
        let (rpm, tps_tenths) = self.engine.map_or((0, 0), |e| (e.rpm, e.tps_tenths));
        TelemetrySnapshot {
            rpm,
            tps_tenths,
            centivolts: self.electrical.map(|e| e.centivolts),
            engine_running: rpm != 0,
            bus_present: self.is_bus_present(now_ms),
        }
    }
}

impl FrameListener for TelemetryState {
    fn on_frame(&mut self, id: u32, payload: &[u8], now_ms: u64) -> Result<(), FrameError> {
        let event = crate::can_mod::decode_can_frame(id, payload)?;
        self.apply(event, now_ms);
        Ok(())
    }
}
