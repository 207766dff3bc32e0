//! Frame ingestion sources.
//!
//! This module provides sources for captured stills:
//! - Synthetic poses (`stub://` URLs, testing and demos)
//! - Local still directories (replayed stills)
//!
//! All sources produce `StillFrame` instances through the `FrameSource`
//! contract. The ingestion layer is responsible for:
//! - Reporting readiness of the device
//! - Completing a capture with a frame, no image, or an error
//!
//! The ingestion layer MUST NOT:
//! - Classify frames (that is the classifier's job)
//! - Retry failed captures (the sampling loop owns pacing)

mod camera;
mod directory;
mod source;
mod synthetic;

pub use camera::{CameraConfig, CameraSource, CameraStats};
pub use source::{Capture, CaptureCompleter, CaptureOutcome, FrameSource, PendingCapture};
