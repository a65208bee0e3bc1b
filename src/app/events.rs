//! Outbound application events.
//!
//! The [`SightService`](super::service::SightService) emits these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them — log them, project them onto UI
//! state, record them in tests.

use crate::error::UpstreamError;

/// Structured events emitted by the session core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The session started.
    SessionStarted,

    /// A capture-and-analyze round trip was issued.
    AnalysisStarted,

    /// A normalized description is ready for display/speech.
    SceneDescribed { danger: bool, description: String },

    /// An analysis round trip failed (spoken notice already sequenced).
    AnalysisFailed(UpstreamError),

    /// A danger result raised the alert state.
    DangerRaised,

    /// The danger display window expired.
    DangerCleared,

    /// Periodic mode started.
    PeriodicStarted,

    /// Periodic mode stopped.
    PeriodicStopped,

    /// The emergency flow was triggered.
    EmergencyRaised,

    /// The emergency message was derived (endpoint or fallback).
    EmergencyMessage(String),

    /// The emergency display window expired.
    EmergencyCleared,

    /// The session was torn down.
    SessionClosed,
}
