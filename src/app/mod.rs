//! Application core — pure domain orchestration, zero direct I/O.
//!
//! This module wires the plant repository, the watering scheduler and the
//! settings store together.  All interaction with storage, notifications
//! and the clock happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without a real database or device.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
