//! Port traits — the boundary between the session core and the outside
//! world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SightService (domain)
//! ```
//!
//! Driven adapters (camera, HTTP clients, speech synthesis, alarm audio,
//! event sinks) implement these traits. The
//! [`SightService`](super::service::SightService) consumes them via
//! generics, so the domain core never touches a device or socket directly.
//!
//! The two endpoint ports are fire-and-forget: the adapter performs the
//! round trip off the main loop and posts the completion back as an
//! [`Event`](crate::events::Event). That keeps the core single-threaded
//! and lets overlapping cycles resolve in whatever order the network
//! delivers them (last-result-wins, by design).

use serde::Deserialize;

use crate::capture::EncodedFrame;
use crate::feedback::Utterance;

// ───────────────────────────────────────────────────────────────
// Camera port (driven adapter: camera → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to grab an encoded still frame.
pub trait CameraPort {
    /// Capture the current frame. `None` while the stream is not ready.
    fn capture(&mut self) -> Option<EncodedFrame>;
}

// ───────────────────────────────────────────────────────────────
// Endpoint ports (driven adapters: domain → remote vision model)
// ───────────────────────────────────────────────────────────────

/// Submit a frame for danger-aware scene analysis. Completion arrives as
/// [`Event::AnalysisCompleted`](crate::events::Event::AnalysisCompleted).
pub trait VisionPort {
    fn analyze(&mut self, frame: EncodedFrame);
}

/// Submit a frame for emergency-message synthesis. Completion arrives as
/// [`Event::EmergencyCompleted`](crate::events::Event::EmergencyCompleted).
pub trait EmergencyPort {
    fn request_message(&mut self, frame: EncodedFrame);
}

/// What the emergency endpoint answers. The `message` field is populated
/// even on failure responses; `error` carries the upstream failure reason
/// when there was one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmergencyReport {
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub error: Option<String>,
}

// ───────────────────────────────────────────────────────────────
// Feedback ports (driven adapters: domain → audio output)
// ───────────────────────────────────────────────────────────────

/// Speech synthesis. `speak` begins a new utterance; end/error is reported
/// back through the event bus. `cancel` stops an in-progress utterance
/// immediately and must be safe to call when nothing is playing.
pub trait SpeechPort {
    fn speak(&mut self, utterance: &Utterance);
    fn cancel(&mut self);
}

/// The fixed alarm sound. Always restarts from time zero; implementations
/// log playback rejection instead of propagating it.
pub trait AlarmPort {
    fn play_from_start(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / UI projection)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (log, UI state, a
/// test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Combined device bound
// ───────────────────────────────────────────────────────────────

/// Everything the orchestrator needs for one call. A single adapter
/// bundle satisfies all device ports — this avoids a five-way mutable
/// borrow while keeping each port boundary explicit.
pub trait DevicePorts: CameraPort + VisionPort + EmergencyPort + SpeechPort + AlarmPort {}

impl<T: CameraPort + VisionPort + EmergencyPort + SpeechPort + AlarmPort> DevicePorts for T {}
