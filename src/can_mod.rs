//! Module for CAN frame decoding
//!
//! Turns a received frame (extended ID + payload) into a typed telemetry event.
//! The bus is receive-only; this module never builds frames.
//!
//! Traffic from other nodes is expected on the bus and is reported as
//! [`FrameError::Unrecognized`] so the caller can drop it quietly. A recognized ID
//! with a payload too short for its package is [`FrameError::Truncated`].

use crate::ecu_can::{EcuPack, PE3_BINCODE_CONFIG, Pe1Pack, Pe6Pack};

/// Engine speed and throttle, from PE1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineEvent {
    pub rpm: u16,
    /// Throttle position in 0.1 % units
    pub tps_tenths: u16,
}

impl EngineEvent {
    /// Throttle position in percent
    pub fn tps(&self) -> f32 {
        f32::from(self.tps_tenths) / 10.0
    }
}

/// Battery voltage, from PE6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ElectricalEvent {
    /// Battery voltage in 0.01 V units
    pub centivolts: u16,
}

impl ElectricalEvent {
    /// Battery voltage in volts
    pub fn voltage(&self) -> f32 {
        f32::from(self.centivolts) / 100.0
    }
}

/// A decoded telemetry frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryEvent {
    Engine(EngineEvent),
    Electrical(ElectricalEvent),
}

/// Reasons a frame produced no telemetry event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// The ID does not belong to a package this firmware reads
    Unrecognized(u32),
    /// The payload is shorter than the package it claims to carry
    Truncated { id: u32, len: usize, needed: usize },
}

/// Receiver of raw bus frames.
///
/// Registered once with the CAN receive loop, which calls it for every frame in
/// arrival order. Implementations must not block.
pub trait FrameListener {
    fn on_frame(&mut self, id: u32, payload: &[u8], now_ms: u64) -> Result<(), FrameError>;
}

/// Decodes a CAN frame into its corresponding telemetry event
///
/// Returns an error if the ID is unknown or the payload is too short.
pub fn decode_can_frame(id: u32, payload: &[u8]) -> Result<TelemetryEvent, FrameError> {
    match id {
        Pe1Pack::ID => {
            let pack = decode_pack::<Pe1Pack>(payload)?;
            Ok(TelemetryEvent::Engine(EngineEvent {
                rpm: pack.rpm,
                tps_tenths: pack.tps,
            }))
        }
        Pe6Pack::ID => {
            let pack = decode_pack::<Pe6Pack>(payload)?;
            Ok(TelemetryEvent::Electrical(ElectricalEvent {
                centivolts: pack.battery_volt,
            }))
        }
        _ => Err(FrameError::Unrecognized(id)),
    }
}

fn decode_pack<T: EcuPack>(data: &[u8]) -> Result<T, FrameError> {
    let truncated = FrameError::Truncated {
        id: T::ID,
        len: data.len(),
        needed: T::MIN_BYTES,
    };
    if data.len() < T::MIN_BYTES {
        return Err(truncated);
    }
    bincode::decode_from_slice(data, PE3_BINCODE_CONFIG)
        .map(|(pack, _)| pack)
        .map_err(|_| truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGINE_ID: u32 = 218_099_784;
    const ELECTRICAL_ID: u32 = 218_101_064;

    #[test]
    fn decodes_engine_frame() {
        let event = decode_can_frame(ENGINE_ID, &[0x1C, 0x25, 0xFA, 0x00, 0, 0, 0, 0]);
        assert_eq!(
            event,
            Ok(TelemetryEvent::Engine(EngineEvent {
                rpm: 9500,
                tps_tenths: 250
            }))
        );
    }

    #[test]
    fn engine_frame_scales_throttle() {
        let Ok(TelemetryEvent::Engine(engine)) = decode_can_frame(ENGINE_ID, &[0, 0, 0xE8, 0x03])
        else {
            panic!("expected an engine event");
        };
        assert_eq!(engine.rpm, 0);
        assert!((engine.tps() - 100.0).abs() < 0.001);
    }

    #[test]
    fn decodes_electrical_frame() {
        let event = decode_can_frame(ELECTRICAL_ID, &[0x74, 0x04]);
        assert_eq!(
            event,
            Ok(TelemetryEvent::Electrical(ElectricalEvent { centivolts: 1140 }))
        );
        let Ok(TelemetryEvent::Electrical(electrical)) = event else {
            unreachable!()
        };
        assert!((electrical.voltage() - 11.4).abs() < 0.001);
    }

    #[test]
    fn unknown_id_is_unrecognized() {
        assert_eq!(
            decode_can_frame(0x123, &[1, 2, 3, 4, 5, 6, 7, 8]),
            Err(FrameError::Unrecognized(0x123))
        );
    }

    #[test]
    fn short_engine_frame_is_truncated() {
        assert_eq!(
            decode_can_frame(ENGINE_ID, &[0x1C, 0x25, 0xFA]),
            Err(FrameError::Truncated {
                id: ENGINE_ID,
                len: 3,
                needed: 4
            })
        );
    }

    #[test]
    fn empty_electrical_frame_is_truncated() {
        assert_eq!(
            decode_can_frame(ELECTRICAL_ID, &[]),
            Err(FrameError::Truncated {
                id: ELECTRICAL_ID,
                len: 0,
                needed: 2
            })
        );
    }

    #[test]
    fn decoding_is_repeatable() {
        let payload = [0x10, 0x27, 0x64, 0x00];
        assert_eq!(
            decode_can_frame(ENGINE_ID, &payload),
            decode_can_frame(ENGINE_ID, &payload)
        );
    }
}
