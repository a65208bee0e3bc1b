//! Shared mutable session state threaded through the orchestrator.
//!
//! `SessionContext` is the single record the orchestrator reads from and
//! writes to: the current mode, the in-flight/danger/emergency flags, the
//! last texts shown to the user, and every pending deadline. Timers are
//! plain millisecond deadlines compared against the clock passed into
//! `tick()` — nothing here sleeps or schedules callbacks, which is what
//! makes the whole state machine drivable from a test with a scripted
//! clock.

use crate::config::SystemConfig;

/// The session's top-level mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Nothing scheduled; waiting for a gesture.
    Idle,
    /// A single user-initiated cycle is in flight.
    SingleShot,
    /// Timer-driven cycles run until explicitly stopped.
    Periodic,
}

/// A deferred utterance: due time plus what to say.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSpeech {
    pub due_ms: u64,
    pub text: String,
}

/// The orchestrator's blackboard.
pub struct SessionContext {
    pub mode: SessionMode,

    /// True while a capture-and-analyze round trip is outstanding.
    pub analyzing: bool,
    /// True for the danger display window after a danger result.
    pub dangerous: bool,
    /// True for the emergency display window after an emergency trigger.
    pub emergency: bool,

    /// Last description shown/spoken.
    pub last_description: String,
    /// Last derived emergency message.
    pub last_emergency_message: String,

    /// The single periodic timer. Rescheduling replaces it; `None` means
    /// no cycle is pending (last-writer-wins).
    pub next_periodic_at: Option<u64>,
    /// Danger description waiting for its post-alarm speak delay.
    pub danger_speech: Option<PendingSpeech>,
    /// When the danger display window expires.
    pub danger_clear_at: Option<u64>,
    /// Emergency message waiting for its post-alarm speak delay.
    pub emergency_speech: Option<PendingSpeech>,
    /// When the emergency display window expires.
    pub emergency_clear_at: Option<u64>,

    /// System configuration (fixed constants).
    pub config: SystemConfig,
}

impl SessionContext {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            mode: SessionMode::Idle,
            analyzing: false,
            dangerous: false,
            emergency: false,
            last_description: String::new(),
            last_emergency_message: String::new(),
            next_periodic_at: None,
            danger_speech: None,
            danger_clear_at: None,
            emergency_speech: None,
            emergency_clear_at: None,
            config,
        }
    }

    /// Drop every pending deadline (teardown).
    pub fn cancel_all_deadlines(&mut self) {
        self.next_periodic_at = None;
        self.danger_speech = None;
        self.danger_clear_at = None;
        self.emergency_speech = None;
        self.emergency_clear_at = None;
    }
}
