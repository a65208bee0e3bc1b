//! Unified error types for the sight session core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! error handling in the main loop uniform. None of these are fatal: the
//! orchestrator converts each into a safe default or a spoken notice at
//! the point where the fallible call happens.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the session core funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A frame could not be captured or encoded.
    Capture(CaptureError),
    /// A remote endpoint call failed.
    Upstream(UpstreamError),
    /// Audio or speech playback failed.
    Playback(PlaybackError),
    /// Adapter initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture(e) => write!(f, "capture: {e}"),
            Self::Upstream(e) => write!(f, "upstream: {e}"),
            Self::Playback(e) => write!(f, "playback: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Capture errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    /// The video stream has no dimensions yet (camera still starting).
    StreamNotReady,
    /// The pixel buffer could not be encoded to JPEG.
    EncodeFailed,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreamNotReady => write!(f, "video stream not ready"),
            Self::EncodeFailed => write!(f, "JPEG encode failed"),
        }
    }
}

impl From<CaptureError> for Error {
    fn from(e: CaptureError) -> Self {
        Self::Capture(e)
    }
}

// ---------------------------------------------------------------------------
// Upstream (endpoint) errors
// ---------------------------------------------------------------------------

/// Failures talking to the vision or emergency endpoint.
///
/// `Status` means the endpoint answered with a non-2xx code; `Transport`
/// means the request never completed (DNS, TLS, timeout, connection reset).
/// The distinction matters because the two map to different spoken phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Non-2xx response; carries the status code and the endpoint's
    /// `error` field when one could be decoded.
    Status { code: u16, message: String },
    /// The request failed before a response arrived.
    Transport(String),
    /// A 2xx response whose body was not decodable at all.
    UnreadableBody,
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { code, message } => write!(f, "HTTP {code}: {message}"),
            Self::Transport(msg) => write!(f, "transport failure: {msg}"),
            Self::UnreadableBody => write!(f, "unreadable response body"),
        }
    }
}

impl From<UpstreamError> for Error {
    fn from(e: UpstreamError) -> Self {
        Self::Upstream(e)
    }
}

// ---------------------------------------------------------------------------
// Playback errors
// ---------------------------------------------------------------------------

/// Audio-side failures. These are logged at the adapter and never block
/// the state machine (a browser autoplay rejection must not stop analysis).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackError {
    /// The alarm sound could not start (e.g. autoplay policy).
    AlarmRejected,
    /// Speech synthesis reported an error mid-utterance.
    SpeechFailed,
    /// Speech synthesis is not available at all.
    SpeechUnavailable,
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlarmRejected => write!(f, "alarm playback rejected"),
            Self::SpeechFailed => write!(f, "speech synthesis failed"),
            Self::SpeechUnavailable => write!(f, "speech synthesis unavailable"),
        }
    }
}

impl From<PlaybackError> for Error {
    fn from(e: PlaybackError) -> Self {
        Self::Playback(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
