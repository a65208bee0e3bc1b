//! System configuration parameters
//!
//! All tunable parameters for a Lanoria sight session.
//! There are no configuration files; `SystemConfig::default()` *is* the
//! production configuration, and tests override individual fields.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Endpoints ---
    /// Vision analysis endpoint (danger-aware description of a frame)
    pub analyze_url: String,
    /// Emergency message endpoint
    pub emergency_url: String,
    /// HTTP request timeout (milliseconds)
    pub request_timeout_ms: u64,

    // --- Capture ---
    /// JPEG compression quality for captured frames (0-100)
    pub jpeg_quality: u8,

    // --- Gestures ---
    /// Tap accumulation window (milliseconds); each tap refreshes it
    pub debounce_window_ms: u64,
    /// Minimum upward displacement for a swipe (pixels)
    pub swipe_min_distance_px: f32,
    /// Maximum touch duration for a swipe (milliseconds)
    pub swipe_max_duration_ms: u64,

    // --- Analysis timing ---
    /// Interval between periodic capture-and-analyze cycles (milliseconds)
    pub periodic_interval_ms: u64,
    /// Gap between the alarm and speaking a danger description (milliseconds)
    pub danger_speak_delay_ms: u64,
    /// How long the danger state stays raised (milliseconds)
    pub danger_display_ms: u64,
    /// Gap between the alarm and speaking the emergency message (milliseconds)
    pub emergency_speak_delay_ms: u64,
    /// How long the emergency state stays raised (milliseconds)
    pub emergency_display_ms: u64,

    // --- Speech ---
    /// BCP-47 language tag for synthesized speech
    pub speech_lang: String,
    /// Speech rate multiplier (1.0 = normal)
    pub speech_rate: f32,
    /// Speech pitch (1.0 = normal)
    pub speech_pitch: f32,
    /// Speech volume (0.0 - 1.0)
    pub speech_volume: f32,

    // --- Timing ---
    /// Main control loop interval (milliseconds)
    pub control_loop_interval_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Endpoints
            analyze_url: "https://lanoria.app/api/analyze-frame".to_string(),
            emergency_url: "https://lanoria.app/api/emergency".to_string(),
            request_timeout_ms: 20_000,

            // Capture
            jpeg_quality: 80,

            // Gestures
            debounce_window_ms: 400,
            swipe_min_distance_px: 50.0,
            swipe_max_duration_ms: 500,

            // Analysis timing
            periodic_interval_ms: 5000,
            danger_speak_delay_ms: 500,
            danger_display_ms: 3000,
            emergency_speak_delay_ms: 1500,
            emergency_display_ms: 10_000,

            // Speech
            speech_lang: "es-ES".to_string(),
            speech_rate: 1.4,
            speech_pitch: 1.0,
            speech_volume: 1.0,

            // Timing
            control_loop_interval_ms: 50, // 20 Hz
        }
    }
}
