//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for a Lanoria sight session:
//! the danger/emergency state machine, one-shot and periodic analysis
//! cycle orchestration, and feedback sequencing. All interaction with the
//! outside world happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without a camera, network or speaker.

pub mod commands;
pub mod context;
pub mod events;
pub mod ports;
pub mod service;
