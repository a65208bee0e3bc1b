//! HTTP adapters for the vision and emergency endpoints.
//!
//! Each request runs on its own worker thread so the main loop never
//! blocks on the network; the outcome is posted back through the
//! [`EventBus`](crate::events::EventBus). Requests are never aborted —
//! stopping periodic mode or tearing the session down simply stops
//! dispatching the completions.

use std::thread;
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use serde_json::{json, Value};

use crate::app::ports::{EmergencyPort, EmergencyReport, VisionPort};
use crate::capture::EncodedFrame;
use crate::config::SystemConfig;
use crate::error::{Error, Result, UpstreamError};
use crate::events::{Event, EventPublisher};

/// Blocking-client adapter for both remote endpoints.
pub struct HttpEndpoints {
    client: Client,
    analyze_url: String,
    emergency_url: String,
    publisher: EventPublisher,
}

impl HttpEndpoints {
    pub fn new(config: &SystemConfig, publisher: EventPublisher) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| {
                warn!("HTTP client construction failed: {e}");
                Error::Init("HTTP client construction failed")
            })?;
        Ok(Self {
            client,
            analyze_url: config.analyze_url.clone(),
            emergency_url: config.emergency_url.clone(),
            publisher,
        })
    }
}

impl VisionPort for HttpEndpoints {
    fn analyze(&mut self, frame: EncodedFrame) {
        let client = self.client.clone();
        let url = self.analyze_url.clone();
        let publisher = self.publisher.clone();
        // Detached worker: the round trip is never aborted.
        let _ = thread::spawn(move || {
            let result = post_frame(&client, &url, frame);
            if !publisher.post(Event::AnalysisCompleted(result)) {
                debug!("analysis completed after the session ended");
            }
        });
    }
}

impl EmergencyPort for HttpEndpoints {
    fn request_message(&mut self, frame: EncodedFrame) {
        let client = self.client.clone();
        let url = self.emergency_url.clone();
        let publisher = self.publisher.clone();
        let _ = thread::spawn(move || {
            let result = post_emergency(&client, &url, frame);
            if !publisher.post(Event::EmergencyCompleted(result)) {
                debug!("emergency message arrived after the session ended");
            }
        });
    }
}

fn post_frame(
    client: &Client,
    url: &str,
    frame: EncodedFrame,
) -> core::result::Result<Value, UpstreamError> {
    let response = client
        .post(url)
        .json(&json!({ "image": frame.into_data_uri() }))
        .send()
        .map_err(|e| UpstreamError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<Value>()
            .ok()
            .and_then(|body| {
                body.get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("endpoint failure")
                    .to_string()
            });
        return Err(UpstreamError::Status {
            code: status.as_u16(),
            message,
        });
    }

    response
        .json::<Value>()
        .map_err(|_| UpstreamError::UnreadableBody)
}

fn post_emergency(
    client: &Client,
    url: &str,
    frame: EncodedFrame,
) -> core::result::Result<EmergencyReport, UpstreamError> {
    let response = client
        .post(url)
        .json(&json!({ "image": frame.into_data_uri() }))
        .send()
        .map_err(|e| UpstreamError::Transport(e.to_string()))?;

    let status = response.status();
    // The endpoint populates `message` even on failure responses, so the
    // body is decoded regardless of the status code.
    match response.json::<EmergencyReport>() {
        Ok(report) => Ok(report),
        Err(_) if status.is_success() => Err(UpstreamError::UnreadableBody),
        Err(_) => Err(UpstreamError::Status {
            code: status.as_u16(),
            message: "emergency endpoint failure".to_string(),
        }),
    }
}
