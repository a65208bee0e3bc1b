//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger. A UI adapter would implement the same trait to project
//! the events onto screen state.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::SessionStarted => info!("SESSION | started"),
            AppEvent::AnalysisStarted => info!("CYCLE | analysis issued"),
            AppEvent::SceneDescribed {
                danger,
                description,
            } => {
                info!(
                    "SCENE | danger={} | {}",
                    if *danger { "YES" } else { "no" },
                    description
                );
            }
            AppEvent::AnalysisFailed(e) => warn!("CYCLE | failed: {e}"),
            AppEvent::DangerRaised => warn!("DANGER | raised"),
            AppEvent::DangerCleared => info!("DANGER | cleared"),
            AppEvent::PeriodicStarted => info!("PERIODIC | started"),
            AppEvent::PeriodicStopped => info!("PERIODIC | stopped"),
            AppEvent::EmergencyRaised => warn!("EMERGENCY | raised"),
            AppEvent::EmergencyMessage(message) => warn!("EMERGENCY | message: {message}"),
            AppEvent::EmergencyCleared => info!("EMERGENCY | cleared"),
            AppEvent::SessionClosed => info!("SESSION | closed"),
        }
    }
}
