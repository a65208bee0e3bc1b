//! Still-frame capture from a live video source.
//!
//! [`FrameGrabber`] reads the most recent pixel buffer out of a
//! [`VideoSource`], compresses it to JPEG at a fixed quality and wraps it
//! into the `data:image/jpeg;base64,…` URI the analysis endpoints expect.
//! Capture is synchronous, side-effect free and callable any number of
//! times; it yields `None` until the stream reports its dimensions.

use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use log::warn;

use crate::app::ports::CameraPort;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// A JPEG still frame, already encoded as a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    data_uri: String,
}

impl EncodedFrame {
    /// Wrap raw JPEG bytes into a data URI.
    pub fn from_jpeg(bytes: &[u8]) -> Self {
        let mut data_uri = String::with_capacity(DATA_URI_PREFIX.len() + bytes.len() * 4 / 3 + 4);
        data_uri.push_str(DATA_URI_PREFIX);
        base64::engine::general_purpose::STANDARD.encode_string(bytes, &mut data_uri);
        Self { data_uri }
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn into_data_uri(self) -> String {
        self.data_uri
    }
}

/// Read-side abstraction over a live camera stream. The stream yields no
/// frame until its dimensions are populated.
pub trait VideoSource {
    /// Stream dimensions, or `None` while the camera is still starting.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// The most recent decoded frame. Non-destructive; successive calls
    /// without a new camera frame return the same image.
    fn latest_frame(&mut self) -> Option<RgbImage>;
}

/// Captures encoded still frames from a [`VideoSource`].
pub struct FrameGrabber<S: VideoSource> {
    source: S,
    jpeg_quality: u8,
}

impl<S: VideoSource> FrameGrabber<S> {
    pub fn new(source: S, jpeg_quality: u8) -> Self {
        Self {
            source,
            jpeg_quality,
        }
    }

    /// Grab and encode the current frame. `None` when the stream is not
    /// ready yet or the frame could not be encoded.
    pub fn capture(&mut self) -> Option<EncodedFrame> {
        self.source.dimensions()?;
        let frame = self.source.latest_frame()?;

        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality);
        if let Err(e) = encoder.encode_image(&frame) {
            warn!("frame JPEG encode failed: {e}");
            return None;
        }
        Some(EncodedFrame::from_jpeg(&jpeg))
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: VideoSource> CameraPort for FrameGrabber<S> {
    fn capture(&mut self) -> Option<EncodedFrame> {
        FrameGrabber::capture(self)
    }
}
