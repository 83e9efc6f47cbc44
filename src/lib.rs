#![cfg_attr(not(test), no_std)]
//! # Tachometer Documentation
//! This is the documentation for the shift light's code. The firmware reads PE3 ECU
//! telemetry from the CAN bus and drives a 16 pixel WS2812B strip as a rev bar,
//! shift light and redline flasher, a throttle bar while the engine is stopped, and a
//! battery status light. With no ECU on the bus it shows a heartbeat.
//!
//! The library holds all of the decision logic and has no hardware dependency, so it
//! is tested on the host with `cargo test`. The board code lives in the `tach` binary
//! (`--features firmware`).
//!
//! Data flows CAN frame → [`can_mod`] → [`telemetry_mod`] → (tick) [`mode_mod`] →
//! [`render_mod`] / [`anim_mod`] → pixels, driven by [`tach_mod`].

pub mod anim_mod;
pub mod can_mod;
pub mod config_mod;
pub mod ecu_can;
pub mod mode_mod;
pub mod render_mod;
pub mod tach_mod;
pub mod telemetry_mod;
