//! Inbound commands to the session core.
//!
//! These represent actions requested by the outside world — classified
//! gestures, a hardware button, a test harness — that the
//! [`SightService`](super::service::SightService) interprets and acts upon.

use crate::gesture::{Gesture, TapRegion};

/// Commands that external adapters can send into the session core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Run a single capture-and-analyze cycle now.
    AnalyzeOnce,

    /// Begin periodic capture-and-analyze cycles (no-op if running).
    StartPeriodic,

    /// Stop periodic cycles and clear the displayed description.
    StopPeriodic,

    /// Start periodic mode if idle, stop it if running.
    TogglePeriodic,

    /// Speak the last description again.
    RepeatDescription,

    /// Cancel speech and stop periodic mode (panic-stop).
    Silence,

    /// Capture a frame and synthesize an emergency message.
    TriggerEmergency,
}

/// Positional + temporal gesture routing: upper-half taps drive periodic
/// mode, lower-half taps run one-shot analysis, swipe-up is the emergency
/// gesture.
pub fn command_for_gesture(gesture: Gesture) -> AppCommand {
    match gesture {
        Gesture::SingleTap(TapRegion::Upper) => AppCommand::TogglePeriodic,
        Gesture::SingleTap(TapRegion::Lower) => AppCommand::AnalyzeOnce,
        Gesture::DoubleTap => AppCommand::RepeatDescription,
        Gesture::TripleOrMoreTap => AppCommand::Silence,
        Gesture::SwipeUp => AppCommand::TriggerEmergency,
    }
}
