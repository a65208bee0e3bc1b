//! Session orchestrator — the hexagonal core.
//!
//! [`SightService`] owns the danger/emergency state machine and all cycle
//! scheduling. It exposes a clean, device-agnostic API; all I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters and a scripted clock.
//!
//! ```text
//!  CameraPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                 │        SightService         │
//!  VisionPort ◀──│  cycles · danger · emergency │──▶ SpeechPort
//!  EmergencyPort◀│        AlertFeedback         │──▶ AlarmPort
//!                 └────────────────────────────┘
//! ```
//!
//! Every externally visible effect is sequenced from three entry points:
//! [`handle_command`](SightService::handle_command) (classified gestures),
//! the completion handlers (endpoint round trips, speech), and
//! [`tick`](SightService::tick) (deadline expiry). The main loop calls
//! them in that order with a shared `now_ms`.

use log::{debug, info, warn};
use serde_json::Value;

use crate::error::UpstreamError;
use crate::feedback::AlertFeedback;
use crate::normalize::normalize;

use super::commands::AppCommand;
use super::context::{PendingSpeech, SessionContext, SessionMode};
use super::events::AppEvent;
use super::ports::{DevicePorts, EmergencyReport, EventSink, SpeechPort};
use crate::config::SystemConfig;

// ── Fixed spoken phrases ──────────────────────────────────────

/// Spoken when the endpoint answers with a failure status.
pub const SPOKEN_ANALYZE_ERROR: &str = "Error al analizar la imagen";
/// Spoken when the round trip dies in transit.
pub const SPOKEN_TRANSPORT_ERROR: &str = "Error al procesar la imagen";
/// Spoken when a user-initiated capture finds no frame.
pub const SPOKEN_CAPTURE_ERROR: &str = "No se pudo capturar la imagen";
/// Emergency message used when no frame or no endpoint answer is available.
pub const EMERGENCY_FALLBACK_MESSAGE: &str =
    "Emergencia: Persona ciega solicita asistencia inmediata. \
     No se pudo analizar la situación visual.";
/// Prepended to the emergency message when it is spoken.
pub const EMERGENCY_SPOKEN_PREFIX: &str = "Mensaje de emergencia: ";

// ───────────────────────────────────────────────────────────────
// SightService
// ───────────────────────────────────────────────────────────────

/// The session orchestrator.
pub struct SightService {
    ctx: SessionContext,
    feedback: AlertFeedback,
}

impl SightService {
    /// Construct the service from configuration.
    ///
    /// Does **not** emit anything — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            ctx: SessionContext::new(config),
            feedback: AlertFeedback::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the session. Call once before the first tick.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::SessionStarted);
        info!("sight session started");
    }

    /// Tear the session down: cancel the periodic timer and every pending
    /// deadline, silence speech. In-flight round trips are not aborted;
    /// their completions land after the loop has stopped dispatching.
    pub fn shutdown(&mut self, speech: &mut impl SpeechPort, sink: &mut impl EventSink) {
        self.ctx.cancel_all_deadlines();
        self.ctx.mode = SessionMode::Idle;
        self.ctx.analyzing = false;
        self.ctx.dangerous = false;
        self.ctx.emergency = false;
        self.feedback.silence(speech);
        sink.emit(&AppEvent::SessionClosed);
        info!("sight session closed");
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (classified gesture, test harness).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        io: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::AnalyzeOnce => self.start_one_shot(io, sink),
            AppCommand::StartPeriodic => self.start_periodic(now_ms, io, sink),
            AppCommand::StopPeriodic => self.stop_periodic(sink),
            AppCommand::TogglePeriodic => {
                if self.ctx.mode == SessionMode::Periodic {
                    self.stop_periodic(sink);
                } else {
                    self.start_periodic(now_ms, io, sink);
                }
            }
            AppCommand::RepeatDescription => {
                if self.ctx.last_description.is_empty() {
                    debug!("nothing to repeat yet");
                } else {
                    let text = self.ctx.last_description.clone();
                    self.feedback.speak(io, &self.ctx.config, &text);
                }
            }
            AppCommand::Silence => {
                self.feedback.silence(io);
                self.stop_periodic(sink);
            }
            AppCommand::TriggerEmergency => self.trigger_emergency(now_ms, io, sink),
        }
    }

    // ── Analysis cycles ───────────────────────────────────────

    /// One user-initiated capture-and-analyze cycle. Ignored while a
    /// one-shot round trip is already outstanding; a failed capture is
    /// announced out loud.
    pub fn start_one_shot(&mut self, io: &mut impl DevicePorts, sink: &mut impl EventSink) {
        if self.ctx.analyzing {
            debug!("analysis already in flight, ignoring one-shot request");
            return;
        }
        match io.capture() {
            Some(frame) => {
                if self.ctx.mode == SessionMode::Idle {
                    self.ctx.mode = SessionMode::SingleShot;
                }
                self.begin_cycle(frame, io, sink);
            }
            None => {
                warn!("one-shot capture failed: stream not ready");
                self.feedback.speak(io, &self.ctx.config, SPOKEN_CAPTURE_ERROR);
            }
        }
    }

    /// Begin periodic cycles: first one immediately, then every interval.
    /// Idempotent while already running.
    pub fn start_periodic(
        &mut self,
        now_ms: u64,
        io: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        if self.ctx.mode == SessionMode::Periodic {
            debug!("periodic mode already running");
            return;
        }
        self.ctx.mode = SessionMode::Periodic;
        // Writing the deadline *is* the cancel of any predecessor: there is
        // exactly one periodic timer slot.
        self.ctx.next_periodic_at = Some(now_ms + self.ctx.config.periodic_interval_ms);
        sink.emit(&AppEvent::PeriodicStarted);
        info!(
            "periodic analysis started, every {} ms",
            self.ctx.config.periodic_interval_ms
        );
        self.run_periodic_cycle(io, sink);
    }

    /// Stop periodic cycles and clear the displayed description and the
    /// analyzing flag. An already-issued round trip is not aborted; its
    /// late result is still displayed (last-result-wins).
    pub fn stop_periodic(&mut self, sink: &mut impl EventSink) {
        if self.ctx.mode != SessionMode::Periodic {
            return;
        }
        self.ctx.mode = SessionMode::Idle;
        self.ctx.next_periodic_at = None;
        self.ctx.analyzing = false;
        self.ctx.last_description.clear();
        sink.emit(&AppEvent::PeriodicStopped);
        info!("periodic analysis stopped");
    }

    fn run_periodic_cycle(&mut self, io: &mut impl DevicePorts, sink: &mut impl EventSink) {
        // No analyzing guard here: an interval shorter than a round trip
        // produces overlapping cycles whose results interleave, and only
        // the most recently displayed one matters.
        match io.capture() {
            Some(frame) => self.begin_cycle(frame, io, sink),
            None => debug!("camera not ready, skipping this cycle"),
        }
    }

    fn begin_cycle(
        &mut self,
        frame: crate::capture::EncodedFrame,
        io: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        self.ctx.analyzing = true;
        sink.emit(&AppEvent::AnalysisStarted);
        io.analyze(frame);
    }

    /// A vision round trip finished. Capture always precedes the call and
    /// the call precedes this normalization; only *across* cycles is no
    /// ordering promised.
    pub fn on_analysis_result(
        &mut self,
        result: Result<Value, UpstreamError>,
        now_ms: u64,
        io: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        self.ctx.analyzing = false;
        if self.ctx.mode == SessionMode::SingleShot {
            self.ctx.mode = SessionMode::Idle;
        }

        match result {
            Ok(raw) => {
                let outcome = normalize(&raw);
                if outcome.danger {
                    self.raise_danger(outcome.description, now_ms, io, sink);
                } else {
                    // An active danger window is left alone here: it only
                    // expires through its own deadline.
                    self.ctx.last_description = outcome.description.clone();
                    sink.emit(&AppEvent::SceneDescribed {
                        danger: false,
                        description: outcome.description.clone(),
                    });
                    self.feedback
                        .speak(io, &self.ctx.config, &outcome.description);
                }
            }
            Err(e) => {
                warn!("analysis round trip failed: {e}");
                let phrase = match &e {
                    UpstreamError::Transport(_) => SPOKEN_TRANSPORT_ERROR,
                    _ => SPOKEN_ANALYZE_ERROR,
                };
                sink.emit(&AppEvent::AnalysisFailed(e));
                self.feedback.speak(io, &self.ctx.config, phrase);
            }
        }
    }

    fn raise_danger(
        &mut self,
        description: String,
        now_ms: u64,
        io: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        self.ctx.dangerous = true;
        sink.emit(&AppEvent::DangerRaised);
        self.feedback.play_alarm(io);

        // Alarm first; the description follows once the sound has had a
        // moment to land. A fresh danger result restarts the display
        // window (last-danger-wins).
        self.ctx.danger_speech = Some(PendingSpeech {
            due_ms: now_ms + self.ctx.config.danger_speak_delay_ms,
            text: description,
        });
        self.ctx.danger_clear_at = Some(now_ms + self.ctx.config.danger_display_ms);
    }

    // ── Emergency flow ────────────────────────────────────────

    /// Capture a frame and request an emergency message. Independent of
    /// danger state and periodic mode — neither is touched.
    pub fn trigger_emergency(
        &mut self,
        now_ms: u64,
        io: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        self.ctx.emergency = true;
        sink.emit(&AppEvent::EmergencyRaised);
        info!("emergency triggered");

        match io.capture() {
            Some(frame) => io.request_message(frame),
            None => {
                warn!("emergency capture failed, using fallback message");
                self.finish_emergency(EMERGENCY_FALLBACK_MESSAGE.to_string(), now_ms, io, sink);
            }
        }
    }

    /// An emergency round trip finished. A message is always derived:
    /// endpoint answer, its failure-body message, or the fixed fallback.
    pub fn on_emergency_result(
        &mut self,
        result: Result<EmergencyReport, UpstreamError>,
        now_ms: u64,
        io: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        if !self.ctx.emergency {
            debug!("emergency result after dismissal, ignoring");
            return;
        }

        let message = match result {
            Ok(report) => {
                if let Some(err) = &report.error {
                    warn!("emergency endpoint degraded: {err}");
                }
                if report.message.trim().is_empty() {
                    EMERGENCY_FALLBACK_MESSAGE.to_string()
                } else {
                    report.message
                }
            }
            Err(e) => {
                warn!("emergency round trip failed: {e}");
                EMERGENCY_FALLBACK_MESSAGE.to_string()
            }
        };
        self.finish_emergency(message, now_ms, io, sink);
    }

    fn finish_emergency(
        &mut self,
        message: String,
        now_ms: u64,
        io: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        self.ctx.last_emergency_message = message.clone();
        sink.emit(&AppEvent::EmergencyMessage(message.clone()));
        self.feedback.play_alarm(io);

        self.ctx.emergency_speech = Some(PendingSpeech {
            due_ms: now_ms + self.ctx.config.emergency_speak_delay_ms,
            text: format!("{EMERGENCY_SPOKEN_PREFIX}{message}"),
        });
        self.ctx.emergency_clear_at = Some(now_ms + self.ctx.config.emergency_display_ms);
    }

    // ── Speech completions ────────────────────────────────────

    pub fn on_speech_finished(&mut self) {
        self.feedback.on_speech_finished();
    }

    pub fn on_speech_failed(&mut self) {
        self.feedback.on_speech_failed();
    }

    // ── Per-tick deadline processing ──────────────────────────

    /// Advance every pending deadline against `now_ms`. Call at control-
    /// tick rate from the main loop (after draining completions).
    pub fn tick(&mut self, now_ms: u64, io: &mut impl DevicePorts, sink: &mut impl EventSink) {
        if let Some(pending) = self.ctx.danger_speech.take_if(|p| now_ms >= p.due_ms) {
            self.ctx.last_description = pending.text.clone();
            sink.emit(&AppEvent::SceneDescribed {
                danger: true,
                description: pending.text.clone(),
            });
            self.feedback.speak(io, &self.ctx.config, &pending.text);
        }

        if self.ctx.danger_clear_at.take_if(|at| now_ms >= *at).is_some() {
            self.ctx.dangerous = false;
            sink.emit(&AppEvent::DangerCleared);
        }

        if let Some(pending) = self.ctx.emergency_speech.take_if(|p| now_ms >= p.due_ms) {
            self.feedback.speak(io, &self.ctx.config, &pending.text);
        }

        if self
            .ctx
            .emergency_clear_at
            .take_if(|at| now_ms >= *at)
            .is_some()
        {
            self.ctx.emergency = false;
            self.ctx.last_emergency_message.clear();
            sink.emit(&AppEvent::EmergencyCleared);
        }

        let periodic_due = self.ctx.mode == SessionMode::Periodic
            && self.ctx.next_periodic_at.is_some_and(|at| now_ms >= at);
        if periodic_due {
            self.ctx.next_periodic_at = Some(now_ms + self.ctx.config.periodic_interval_ms);
            self.run_periodic_cycle(io, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> SessionMode {
        self.ctx.mode
    }

    pub fn is_analyzing(&self) -> bool {
        self.ctx.analyzing
    }

    pub fn is_dangerous(&self) -> bool {
        self.ctx.dangerous
    }

    pub fn is_emergency(&self) -> bool {
        self.ctx.emergency
    }

    pub fn is_speaking(&self) -> bool {
        self.feedback.is_speaking()
    }

    pub fn last_description(&self) -> &str {
        &self.ctx.last_description
    }

    pub fn last_emergency_message(&self) -> &str {
        &self.ctx.last_emergency_message
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }
}
