//! End-to-end tests for the SightService orchestrator.
//!
//! Time is a plain `now_ms` value handed into each call, so every timer
//! (speak delays, display windows, the periodic interval) is driven by
//! the test itself — no sleeping, no real clock.

use serde_json::json;

use lanoria::app::commands::AppCommand;
use lanoria::app::context::SessionMode;
use lanoria::app::events::AppEvent;
use lanoria::app::service::{
    SightService, EMERGENCY_FALLBACK_MESSAGE, EMERGENCY_SPOKEN_PREFIX, SPOKEN_ANALYZE_ERROR,
    SPOKEN_CAPTURE_ERROR, SPOKEN_TRANSPORT_ERROR,
};
use lanoria::config::SystemConfig;
use lanoria::error::UpstreamError;

use crate::mock_ports::{DeviceCall, MockDevices, RecordingSink};

fn make_service() -> (SightService, MockDevices, RecordingSink) {
    let mut service = SightService::new(SystemConfig::default());
    let devices = MockDevices::new();
    let mut sink = RecordingSink::new();
    service.start(&mut sink);
    (service, devices, sink)
}

// ── Scenario 1: calm description ─────────────────────────────

#[test]
fn calm_result_is_spoken_without_alarm() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::AnalyzeOnce, 1000, &mut io, &mut sink);
    assert!(service.is_analyzing());
    assert_eq!(io.analyze_count(), 1);
    assert!(sink.contains(&AppEvent::AnalysisStarted));

    service.on_analysis_result(
        Ok(json!({"danger": false, "description": "Delante tuya hay una mesa"})),
        1300,
        &mut io,
        &mut sink,
    );

    assert!(!service.is_analyzing());
    assert!(!service.is_dangerous());
    assert_eq!(io.alarm_count(), 0, "no alarm for a calm scene");
    assert_eq!(io.last_spoken(), Some("Delante tuya hay una mesa"));
    assert_eq!(service.last_description(), "Delante tuya hay una mesa");
    assert!(sink.contains(&AppEvent::SceneDescribed {
        danger: false,
        description: "Delante tuya hay una mesa".into(),
    }));
}

// ── Scenario 2: danger sequencing ────────────────────────────

#[test]
fn danger_result_sequences_alarm_speech_and_reset() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::AnalyzeOnce, 1000, &mut io, &mut sink);
    service.on_analysis_result(
        Ok(json!({"danger": true, "description": "Cuidado, pared"})),
        1300,
        &mut io,
        &mut sink,
    );

    // Alarm fires immediately; the description waits out the speak delay.
    assert!(service.is_dangerous());
    assert_eq!(io.alarm_count(), 1);
    assert_eq!(io.last_spoken(), None);
    assert!(sink.contains(&AppEvent::DangerRaised));

    service.tick(1750, &mut io, &mut sink);
    assert_eq!(io.last_spoken(), None, "speak delay not yet elapsed");

    service.tick(1800, &mut io, &mut sink);
    assert_eq!(io.last_spoken(), Some("Cuidado, pared"));
    assert_eq!(service.last_description(), "Cuidado, pared");
    assert!(sink.contains(&AppEvent::SceneDescribed {
        danger: true,
        description: "Cuidado, pared".into(),
    }));

    // Display window: 3000 ms anchored at the result.
    service.tick(4299, &mut io, &mut sink);
    assert!(service.is_dangerous());
    service.tick(4300, &mut io, &mut sink);
    assert!(!service.is_dangerous());
    assert!(sink.contains(&AppEvent::DangerCleared));
}

#[test]
fn later_calm_result_does_not_clear_the_danger_window() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::StartPeriodic, 1000, &mut io, &mut sink);
    service.on_analysis_result(
        Ok(json!({"danger": true, "description": "Cuidado, escalera"})),
        2000,
        &mut io,
        &mut sink,
    );
    assert!(service.is_dangerous());

    // A calm result lands before the window (2000 + 3000) expires.
    service.on_analysis_result(
        Ok(json!({"danger": false, "description": "Un pasillo vacío"})),
        3500,
        &mut io,
        &mut sink,
    );
    assert!(
        service.is_dangerous(),
        "danger clears only through its own timeout"
    );

    service.tick(5000, &mut io, &mut sink);
    assert!(!service.is_dangerous());
}

#[test]
fn fresh_danger_restarts_the_display_window() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::StartPeriodic, 0, &mut io, &mut sink);
    service.on_analysis_result(
        Ok(json!({"danger": true, "description": "Cuidado, un coche"})),
        1000,
        &mut io,
        &mut sink,
    );
    // Second danger result before the first window (1000 + 3000) ends.
    service.on_analysis_result(
        Ok(json!({"danger": true, "description": "Cuidado, otro coche"})),
        3000,
        &mut io,
        &mut sink,
    );

    service.tick(4500, &mut io, &mut sink);
    assert!(service.is_dangerous(), "last danger wins the window");
    service.tick(6000, &mut io, &mut sink);
    assert!(!service.is_dangerous());
    assert_eq!(io.alarm_count(), 2, "each danger result restarts the alarm");
}

// ── Scenario 3: endpoint failure ─────────────────────────────

#[test]
fn endpoint_failure_speaks_notice_and_leaves_state_alone() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::AnalyzeOnce, 1000, &mut io, &mut sink);
    service.on_analysis_result(
        Err(UpstreamError::Status {
            code: 500,
            message: "Failed to analyze frame".into(),
        }),
        1400,
        &mut io,
        &mut sink,
    );

    assert_eq!(io.last_spoken(), Some(SPOKEN_ANALYZE_ERROR));
    assert_eq!(service.mode(), SessionMode::Idle);
    assert!(!service.is_analyzing());
    assert!(!service.is_dangerous());
}

#[test]
fn transport_failure_does_not_stop_periodic_mode() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::StartPeriodic, 0, &mut io, &mut sink);
    assert_eq!(io.analyze_count(), 1, "first cycle runs immediately");

    service.on_analysis_result(
        Err(UpstreamError::Transport("connection reset".into())),
        800,
        &mut io,
        &mut sink,
    );
    assert_eq!(io.last_spoken(), Some(SPOKEN_TRANSPORT_ERROR));
    assert_eq!(service.mode(), SessionMode::Periodic);

    // Next scheduled cycle still fires.
    service.tick(5000, &mut io, &mut sink);
    assert_eq!(io.analyze_count(), 2);
}

// ── Scenario 4: emergency with capture failure ───────────────

#[test]
fn emergency_capture_failure_uses_the_fallback_message() {
    let mut service = SightService::new(SystemConfig::default());
    let mut io = MockDevices::without_camera();
    let mut sink = RecordingSink::new();
    service.start(&mut sink);

    service.handle_command(AppCommand::TriggerEmergency, 1000, &mut io, &mut sink);

    assert!(service.is_emergency());
    assert_eq!(io.emergency_count(), 0, "no remote call without a frame");
    assert_eq!(io.alarm_count(), 1);
    assert_eq!(service.last_emergency_message(), EMERGENCY_FALLBACK_MESSAGE);
    assert!(sink.contains(&AppEvent::EmergencyMessage(
        EMERGENCY_FALLBACK_MESSAGE.into()
    )));

    // Spoken prefix + fallback after the 1500 ms delay.
    service.tick(2400, &mut io, &mut sink);
    assert_eq!(io.last_spoken(), None);
    service.tick(2500, &mut io, &mut sink);
    assert_eq!(
        io.last_spoken(),
        Some(format!("{EMERGENCY_SPOKEN_PREFIX}{EMERGENCY_FALLBACK_MESSAGE}").as_str())
    );

    // Display window: 10 s anchored at the fallback derivation.
    service.tick(10_999, &mut io, &mut sink);
    assert!(service.is_emergency());
    service.tick(11_000, &mut io, &mut sink);
    assert!(!service.is_emergency());
    assert_eq!(service.last_emergency_message(), "");
    assert!(sink.contains(&AppEvent::EmergencyCleared));
}

#[test]
fn emergency_round_trip_speaks_the_derived_message() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::TriggerEmergency, 1000, &mut io, &mut sink);
    assert_eq!(io.emergency_count(), 1);
    assert_eq!(io.alarm_count(), 0, "alarm waits for the message");

    service.on_emergency_result(
        Ok(lanoria::app::ports::EmergencyReport {
            message: "Emergencia: Persona ciega solicita asistencia. Interior, pasillo.".into(),
            timestamp: "2025-03-14T10:00:00Z".into(),
            error: None,
        }),
        2000,
        &mut io,
        &mut sink,
    );

    assert_eq!(io.alarm_count(), 1);
    service.tick(3500, &mut io, &mut sink);
    assert_eq!(
        io.last_spoken(),
        Some(
            "Mensaje de emergencia: Emergencia: Persona ciega solicita asistencia. \
             Interior, pasillo."
        )
    );
    service.tick(12_000, &mut io, &mut sink);
    assert!(!service.is_emergency());
}

#[test]
fn emergency_endpoint_failure_still_derives_a_message() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::TriggerEmergency, 0, &mut io, &mut sink);
    service.on_emergency_result(
        Err(UpstreamError::Status {
            code: 500,
            message: "Failed to analyze emergency situation".into(),
        }),
        700,
        &mut io,
        &mut sink,
    );

    assert_eq!(service.last_emergency_message(), EMERGENCY_FALLBACK_MESSAGE);
    assert_eq!(io.alarm_count(), 1);
}

#[test]
fn emergency_does_not_disturb_periodic_mode() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::StartPeriodic, 0, &mut io, &mut sink);
    service.handle_command(AppCommand::TriggerEmergency, 1000, &mut io, &mut sink);

    assert_eq!(service.mode(), SessionMode::Periodic);
    service.tick(5000, &mut io, &mut sink);
    assert_eq!(io.analyze_count(), 2, "periodic cycles continue");
    assert!(service.is_emergency());
}

// ── Periodic mode invariants ─────────────────────────────────

#[test]
fn starting_periodic_twice_is_idempotent() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::StartPeriodic, 0, &mut io, &mut sink);
    service.handle_command(AppCommand::StartPeriodic, 100, &mut io, &mut sink);

    assert_eq!(io.analyze_count(), 1, "no duplicate immediate cycle");
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PeriodicStarted)),
        1,
        "no duplicate start event"
    );

    // Exactly one timer: one new cycle per interval.
    service.tick(4999, &mut io, &mut sink);
    assert_eq!(io.analyze_count(), 1);
    service.tick(5000, &mut io, &mut sink);
    assert_eq!(io.analyze_count(), 2);
}

#[test]
fn stop_periodic_halts_cycles_and_clears_display() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::StartPeriodic, 0, &mut io, &mut sink);
    service.on_analysis_result(
        Ok(json!({"danger": false, "description": "Una cocina"})),
        500,
        &mut io,
        &mut sink,
    );
    assert_eq!(service.last_description(), "Una cocina");

    service.handle_command(AppCommand::StopPeriodic, 1000, &mut io, &mut sink);
    assert_eq!(service.mode(), SessionMode::Idle);
    assert!(!service.is_analyzing());
    assert_eq!(service.last_description(), "");
    assert!(sink.contains(&AppEvent::PeriodicStopped));

    for t in [5000, 10_000, 60_000] {
        service.tick(t, &mut io, &mut sink);
    }
    assert_eq!(io.analyze_count(), 1, "no cycles after stop");

    // Stopping again is a no-op.
    service.handle_command(AppCommand::StopPeriodic, 2000, &mut io, &mut sink);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PeriodicStopped)), 1);
}

#[test]
fn toggle_flips_periodic_mode() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::TogglePeriodic, 0, &mut io, &mut sink);
    assert_eq!(service.mode(), SessionMode::Periodic);
    service.handle_command(AppCommand::TogglePeriodic, 100, &mut io, &mut sink);
    assert_eq!(service.mode(), SessionMode::Idle);
}

#[test]
fn overlapping_cycles_resolve_last_result_wins() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::StartPeriodic, 0, &mut io, &mut sink);
    // Interval elapses before the first round trip finishes: a second
    // cycle is issued anyway.
    service.tick(5000, &mut io, &mut sink);
    assert_eq!(io.analyze_count(), 2);
    assert!(service.is_analyzing());

    // Completions arrive out of issue order; the one delivered last is
    // the one displayed.
    service.on_analysis_result(
        Ok(json!({"danger": false, "description": "Segunda captura"})),
        5600,
        &mut io,
        &mut sink,
    );
    service.on_analysis_result(
        Ok(json!({"danger": false, "description": "Primera captura"})),
        5700,
        &mut io,
        &mut sink,
    );
    assert_eq!(service.last_description(), "Primera captura");
    assert!(!service.is_analyzing());
}

#[test]
fn periodic_cycle_skips_silently_while_camera_warms_up() {
    let mut service = SightService::new(SystemConfig::default());
    let mut io = MockDevices::without_camera();
    let mut sink = RecordingSink::new();
    service.start(&mut sink);

    service.handle_command(AppCommand::StartPeriodic, 0, &mut io, &mut sink);
    service.tick(5000, &mut io, &mut sink);

    assert_eq!(io.analyze_count(), 0);
    assert!(io.spoken().is_empty(), "periodic capture failure is silent");
    assert_eq!(service.mode(), SessionMode::Periodic);
}

// ── One-shot invariants ──────────────────────────────────────

#[test]
fn one_shot_is_ignored_while_a_round_trip_is_outstanding() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::AnalyzeOnce, 0, &mut io, &mut sink);
    service.handle_command(AppCommand::AnalyzeOnce, 100, &mut io, &mut sink);
    assert_eq!(io.analyze_count(), 1);

    service.on_analysis_result(
        Ok(json!({"danger": false, "description": "Una mesa"})),
        500,
        &mut io,
        &mut sink,
    );
    service.handle_command(AppCommand::AnalyzeOnce, 600, &mut io, &mut sink);
    assert_eq!(io.analyze_count(), 2, "accepted again after completion");
}

#[test]
fn one_shot_capture_failure_is_announced() {
    let mut service = SightService::new(SystemConfig::default());
    let mut io = MockDevices::without_camera();
    let mut sink = RecordingSink::new();
    service.start(&mut sink);

    service.handle_command(AppCommand::AnalyzeOnce, 0, &mut io, &mut sink);

    assert_eq!(io.last_spoken(), Some(SPOKEN_CAPTURE_ERROR));
    assert_eq!(service.mode(), SessionMode::Idle);
    assert!(!service.is_analyzing());
    assert_eq!(io.analyze_count(), 0);
}

// ── Speech coordination ──────────────────────────────────────

#[test]
fn speech_flag_follows_completion_events() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::AnalyzeOnce, 0, &mut io, &mut sink);
    service.on_analysis_result(
        Ok(json!({"danger": false, "description": "Un sofá"})),
        300,
        &mut io,
        &mut sink,
    );
    assert!(service.is_speaking());

    service.on_speech_finished();
    assert!(!service.is_speaking());
}

#[test]
fn repeat_description_speaks_the_stored_text_again() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::RepeatDescription, 0, &mut io, &mut sink);
    assert!(io.spoken().is_empty(), "nothing stored yet");

    service.handle_command(AppCommand::AnalyzeOnce, 100, &mut io, &mut sink);
    service.on_analysis_result(
        Ok(json!({"danger": false, "description": "Una ventana"})),
        400,
        &mut io,
        &mut sink,
    );
    service.handle_command(AppCommand::RepeatDescription, 1000, &mut io, &mut sink);

    assert_eq!(io.spoken(), vec!["Una ventana", "Una ventana"]);
}

#[test]
fn silence_cancels_speech_and_stops_periodic() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::StartPeriodic, 0, &mut io, &mut sink);
    service.on_analysis_result(
        Ok(json!({"danger": false, "description": "Un parque"})),
        500,
        &mut io,
        &mut sink,
    );
    assert!(service.is_speaking());

    service.handle_command(AppCommand::Silence, 600, &mut io, &mut sink);
    assert!(!service.is_speaking());
    assert_eq!(service.mode(), SessionMode::Idle);
    assert!(io.calls.contains(&DeviceCall::CancelSpeech));
}

// ── Teardown ─────────────────────────────────────────────────

#[test]
fn shutdown_cancels_timers_and_speech() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::StartPeriodic, 0, &mut io, &mut sink);
    service.on_analysis_result(
        Ok(json!({"danger": true, "description": "Cuidado, fuego"})),
        500,
        &mut io,
        &mut sink,
    );

    service.shutdown(&mut io, &mut sink);
    assert!(sink.contains(&AppEvent::SessionClosed));
    assert_eq!(service.mode(), SessionMode::Idle);
    assert!(!service.is_dangerous());
    assert!(!service.is_speaking());

    // Pending speak delay, display window and periodic timer are gone.
    let calls_before = io.calls.len();
    for t in [1000, 3500, 5000, 20_000] {
        service.tick(t, &mut io, &mut sink);
    }
    assert_eq!(io.calls.len(), calls_before, "no effects after teardown");
}

#[test]
fn stale_emergency_result_after_shutdown_is_ignored() {
    let (mut service, mut io, mut sink) = make_service();

    service.handle_command(AppCommand::TriggerEmergency, 0, &mut io, &mut sink);
    service.shutdown(&mut io, &mut sink);

    service.on_emergency_result(
        Ok(lanoria::app::ports::EmergencyReport {
            message: "Emergencia: tardía".into(),
            timestamp: String::new(),
            error: None,
        }),
        9000,
        &mut io,
        &mut sink,
    );
    assert_eq!(service.last_emergency_message(), "");
    assert_eq!(io.alarm_count(), 0);
}
