//! Completion-event bus.
//!
//! Events are produced by:
//! - the touch surface (raw finger down/up samples)
//! - HTTP worker threads (analysis / emergency round trips finishing)
//! - the speech adapter (utterance end or error)
//!
//! Events are consumed by the main loop, which processes them one at a
//! time between control ticks.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Touch input  │────▶│              │     │              │
//! │ HTTP workers │────▶│  Event Bus   │────▶│  Main Loop   │
//! │ Speech ends  │────▶│  (channel)   │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Producers hold a cheap [`EventPublisher`] clone; the single consumer
//! drains with [`EventBus::drain`] or blocks with [`EventBus::poll`].

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde_json::Value;

use crate::app::ports::EmergencyReport;
use crate::error::UpstreamError;
use crate::gesture::TouchPoint;

/// Events delivered to the main loop.
#[derive(Debug, Clone)]
pub enum Event {
    /// A finger landed on the capture surface.
    TouchStart(TouchPoint),
    /// A finger lifted off the capture surface.
    TouchEnd(TouchPoint),
    /// A vision round trip finished (raw payload or failure).
    AnalysisCompleted(Result<Value, UpstreamError>),
    /// An emergency round trip finished.
    EmergencyCompleted(Result<EmergencyReport, UpstreamError>),
    /// The current utterance ran to completion.
    SpeechFinished,
    /// The current utterance failed mid-synthesis.
    SpeechFailed,
    /// Ask the main loop to exit.
    Shutdown,
}

/// Cloneable producer half of the bus.
#[derive(Clone)]
pub struct EventPublisher {
    tx: Sender<Event>,
}

impl EventPublisher {
    /// Post an event. Returns `false` if the consumer is gone.
    pub fn post(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// The bus itself; owned by the main loop.
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A producer handle for adapters and worker threads.
    pub fn publisher(&self) -> EventPublisher {
        EventPublisher {
            tx: self.tx.clone(),
        }
    }

    /// Drain all pending events into a handler, FIFO.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        for event in self.rx.try_iter() {
            handler(event);
        }
    }

    /// Wait up to `timeout` for the next event. `None` on timeout.
    pub fn poll(&self, timeout: Duration) -> Option<Event> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
