//! Audible feedback: alarm playback and speech synthesis sequencing.
//!
//! [`AlertFeedback`] owns the single "currently speaking" flag. Starting a
//! new utterance always preempts the previous one (speech is never queued),
//! and the alarm always restarts from time zero. Completion and failure of
//! an utterance are reported back by the speech adapter as events; the
//! orchestrator forwards them here to clear the flag.

use log::warn;

use crate::app::ports::{AlarmPort, SpeechPort};
use crate::config::SystemConfig;

/// A fully-specified speech request handed to the [`SpeechPort`].
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// BCP-47 language tag.
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Utterance {
    pub fn from_config(config: &SystemConfig, text: &str) -> Self {
        Self {
            text: text.to_string(),
            lang: config.speech_lang.clone(),
            rate: config.speech_rate,
            pitch: config.speech_pitch,
            volume: config.speech_volume,
        }
    }
}

/// Owner of the system-wide speaking flag and alarm sequencing.
pub struct AlertFeedback {
    speaking: bool,
}

impl AlertFeedback {
    pub fn new() -> Self {
        Self { speaking: false }
    }

    /// Preempt any current utterance and start speaking `text` with the
    /// configured voice parameters.
    pub fn speak(&mut self, speech: &mut impl SpeechPort, config: &SystemConfig, text: &str) {
        speech.cancel();
        self.speaking = true;
        speech.speak(&Utterance::from_config(config, text));
    }

    /// Restart the alarm sound from the beginning. Playback rejection is
    /// the adapter's problem to log; it never propagates here.
    pub fn play_alarm(&mut self, alarm: &mut impl AlarmPort) {
        alarm.play_from_start();
    }

    /// Cancel any in-flight utterance and clear the speaking flag.
    pub fn silence(&mut self, speech: &mut impl SpeechPort) {
        speech.cancel();
        self.speaking = false;
    }

    /// The adapter reported the utterance ran to completion.
    pub fn on_speech_finished(&mut self) {
        self.speaking = false;
    }

    /// The adapter reported a synthesis error. Logged, never surfaced.
    pub fn on_speech_failed(&mut self) {
        warn!("speech synthesis reported an error");
        self.speaking = false;
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }
}

impl Default for AlertFeedback {
    fn default() -> Self {
        Self::new()
    }
}
