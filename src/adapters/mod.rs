//! Adapters — the outer ring.
//!
//! Concrete implementations of the port traits in
//! [`crate::app::ports`]: HTTP clients for the vision and emergency
//! endpoints, a file-backed video source for host runs, console-backed
//! feedback, and a log-based event sink. The session core never imports
//! anything from this module.

pub mod camera;
pub mod feedback;
pub mod http;
pub mod log_sink;
