//! Console feedback adapters.
//!
//! Host stand-ins for the speaker: utterances and the alarm go to the
//! log, and speech "completes" instantly by posting the end event back to
//! the bus. A platform adapter (native TTS, an audio element) implements
//! the same two traits.

use log::{debug, info};

use crate::app::ports::{AlarmPort, SpeechPort};
use crate::events::{Event, EventPublisher};
use crate::feedback::Utterance;

/// Logs utterances and immediately reports them finished.
pub struct ConsoleSpeech {
    publisher: EventPublisher,
}

impl ConsoleSpeech {
    pub fn new(publisher: EventPublisher) -> Self {
        Self { publisher }
    }
}

impl SpeechPort for ConsoleSpeech {
    fn speak(&mut self, utterance: &Utterance) {
        info!(
            "SPEAK | lang={} rate={:.1} | {}",
            utterance.lang, utterance.rate, utterance.text
        );
        self.publisher.post(Event::SpeechFinished);
    }

    fn cancel(&mut self) {
        debug!("SPEAK | cancel");
    }
}

/// Logs the alarm. A real adapter rewinds its audio element to zero and
/// logs (never propagates) playback rejection.
pub struct ConsoleAlarm;

impl ConsoleAlarm {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleAlarm {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmPort for ConsoleAlarm {
    fn play_from_start(&mut self) {
        info!("ALARM | restarting from 0:00");
    }
}
