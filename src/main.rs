//! Lanoria — host entry point.
//!
//! Hexagonal architecture with event-driven execution:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  FrameGrabber      HttpEndpoints      ConsoleSpeech/Alarm      │
//! │  (CameraPort)      (Vision+Emergency) (SpeechPort, AlarmPort)  │
//! │  LogEventSink      console input → synthetic touch events      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            SightService (pure logic)                   │    │
//! │  │  cycles · danger · emergency · feedback sequencing     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  TouchClassifier (debounce) · EventBus (completion spine)      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop blocks on the bus up to one control tick, dispatches any
//! completions, then advances the gesture window and every deadline.

#![deny(unused_must_use)]

use std::io::BufRead;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{info, warn};

use lanoria::adapters::camera::StillImageSource;
use lanoria::adapters::feedback::{ConsoleAlarm, ConsoleSpeech};
use lanoria::adapters::http::HttpEndpoints;
use lanoria::adapters::log_sink::LogEventSink;
use lanoria::app::commands::command_for_gesture;
use lanoria::app::ports::{AlarmPort, CameraPort, EmergencyPort, SpeechPort, VisionPort};
use lanoria::app::service::SightService;
use lanoria::capture::{EncodedFrame, FrameGrabber};
use lanoria::config::SystemConfig;
use lanoria::events::{Event, EventBus, EventPublisher};
use lanoria::feedback::Utterance;
use lanoria::gesture::{TouchClassifier, TouchPoint};

/// Virtual capture-surface height for the console front end; taps in the
/// top half toggle periodic mode, taps in the bottom half analyze once.
const SURFACE_HEIGHT_PX: f32 = 800.0;

// ── Device bundle ─────────────────────────────────────────────
//
// One struct satisfies every device port, mirroring how a platform
// shell would hand the service its camera, network and audio stack.

struct Devices {
    camera: FrameGrabber<StillImageSource>,
    http: HttpEndpoints,
    speech: ConsoleSpeech,
    alarm: ConsoleAlarm,
}

impl CameraPort for Devices {
    fn capture(&mut self) -> Option<EncodedFrame> {
        self.camera.capture()
    }
}

impl VisionPort for Devices {
    fn analyze(&mut self, frame: EncodedFrame) {
        self.http.analyze(frame);
    }
}

impl EmergencyPort for Devices {
    fn request_message(&mut self, frame: EncodedFrame) {
        self.http.request_message(frame);
    }
}

impl SpeechPort for Devices {
    fn speak(&mut self, utterance: &Utterance) {
        self.speech.speak(utterance);
    }

    fn cancel(&mut self) {
        self.speech.cancel();
    }
}

impl AlarmPort for Devices {
    fn play_from_start(&mut self) {
        self.alarm.play_from_start();
    }
}

// ── Console input ─────────────────────────────────────────────

/// Translate a console line into synthetic touch events. Timestamps are
/// assigned at dispatch, so a batch lands inside one debounce window.
fn touches_for(line: &str) -> Vec<Event> {
    let upper = TouchPoint { x: 180.0, y: 150.0 };
    let lower = TouchPoint { x: 180.0, y: 650.0 };
    let tap = |p: TouchPoint| vec![Event::TouchStart(p), Event::TouchEnd(p)];

    match line.trim() {
        "tap" | "t" => tap(lower),
        "up" | "u" => tap(upper),
        "double" | "d" => [tap(lower), tap(lower)].concat(),
        "triple" => [tap(lower), tap(lower), tap(lower)].concat(),
        "swipe" | "s" => vec![
            Event::TouchStart(TouchPoint { x: 180.0, y: 600.0 }),
            Event::TouchEnd(TouchPoint { x: 180.0, y: 500.0 }),
        ],
        "quit" | "q" => vec![Event::Shutdown],
        "" => Vec::new(),
        other => {
            warn!("unknown input '{other}' (tap, up, double, triple, swipe, quit)");
            Vec::new()
        }
    }
}

fn spawn_console_input(publisher: EventPublisher) {
    let _ = std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            for event in touches_for(&line) {
                if !publisher.post(event) {
                    return;
                }
            }
        }
        publisher.post(Event::Shutdown);
    });
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    info!("Lanoria v{}", env!("CARGO_PKG_VERSION"));
    info!("console gestures: tap | up | double | triple | swipe | quit");

    let config = SystemConfig::default();
    let bus = EventBus::new();
    spawn_console_input(bus.publisher());

    // With an image argument the camera serves that frame; without one it
    // stays unready, which exercises the capture-failure paths.
    let source = match std::env::args().nth(1) {
        Some(path) => StillImageSource::open(Path::new(&path))?,
        None => {
            warn!("no frame image given; camera will report not-ready");
            StillImageSource::unavailable()
        }
    };

    let mut devices = Devices {
        camera: FrameGrabber::new(source, config.jpeg_quality),
        http: HttpEndpoints::new(&config, bus.publisher())?,
        speech: ConsoleSpeech::new(bus.publisher()),
        alarm: ConsoleAlarm::new(),
    };
    let mut sink = LogEventSink::new();
    let mut classifier = TouchClassifier::new(&config, SURFACE_HEIGHT_PX);
    let mut service = SightService::new(config.clone());
    service.start(&mut sink);

    let started = Instant::now();
    let tick = Duration::from_millis(config.control_loop_interval_ms);

    'main: loop {
        // Block until the next completion or the next control tick.
        let first = bus.poll(tick);
        let now_ms = started.elapsed().as_millis() as u64;

        let mut pending = Vec::new();
        if let Some(event) = first {
            pending.push(event);
        }
        bus.drain(|event| pending.push(event));

        for event in pending {
            match event {
                Event::TouchStart(point) => classifier.touch_start(point, now_ms),
                Event::TouchEnd(point) => {
                    if let Some(gesture) = classifier.touch_end(point, now_ms) {
                        let cmd = command_for_gesture(gesture);
                        service.handle_command(cmd, now_ms, &mut devices, &mut sink);
                    }
                }
                Event::AnalysisCompleted(result) => {
                    service.on_analysis_result(result, now_ms, &mut devices, &mut sink);
                }
                Event::EmergencyCompleted(result) => {
                    service.on_emergency_result(result, now_ms, &mut devices, &mut sink);
                }
                Event::SpeechFinished => service.on_speech_finished(),
                Event::SpeechFailed => service.on_speech_failed(),
                Event::Shutdown => break 'main,
            }
        }

        if let Some(gesture) = classifier.tick(now_ms) {
            let cmd = command_for_gesture(gesture);
            service.handle_command(cmd, now_ms, &mut devices, &mut sink);
        }
        service.tick(now_ms, &mut devices, &mut sink);
    }

    service.shutdown(&mut devices, &mut sink);
    Ok(())
}
