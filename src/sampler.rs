//! Live frame sampler.
//!
//! One `tick` takes at most one still, classifies it and reports both the
//! detection (if any) and how long to wait before the next tick:
//!
//! | situation                  | next tick | detection |
//! |----------------------------|-----------|-----------|
//! | camera not ready           | 400 ms    | no        |
//! | capture still in flight    | 200 ms    | no        |
//! | still captured             | 1100 ms   | yes       |
//! | capture gave no image      | 500 ms    | no        |
//! | capture failed             | 900 ms    | no        |
//!
//! At most one capture is ever in flight. The in-flight slot is cleared before
//! the tick returns whenever the capture has resolved, whatever the outcome.
//!
//! A pending capture is observed on the next busy tick, so a result can wait
//! up to 200 ms before it is classified; the post-detection delay counts from
//! that tick.

use std::task::Poll;
use std::time::Duration;

use crate::detect::{DetectionResult, GestureClassifier};
use crate::ingest::{Capture, CaptureOutcome, FrameSource, PendingCapture};

pub const NOT_READY_DELAY: Duration = Duration::from_millis(400);
pub const BUSY_DELAY: Duration = Duration::from_millis(200);
pub const EMPTY_CAPTURE_DELAY: Duration = Duration::from_millis(500);
pub const CAPTURE_ERROR_DELAY: Duration = Duration::from_millis(900);
pub const DETECTION_DELAY: Duration = Duration::from_millis(1_100);

/// What one tick produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub next_delay: Duration,
    pub detection: Option<DetectionResult>,
}

impl Tick {
    fn idle(next_delay: Duration) -> Self {
        Self {
            next_delay,
            detection: None,
        }
    }
}

/// Counters for one capture session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SamplerStats {
    pub ticks: u64,
    pub captures_started: u64,
    pub detections: u64,
    pub empty_captures: u64,
    pub capture_errors: u64,
    pub not_ready: u64,
    pub busy: u64,
}

/// Sampler state: the in-flight slot and counters.
#[derive(Default)]
pub struct SamplingLoop {
    in_flight: Option<PendingCapture>,
    stats: SamplerStats,
}

impl SamplingLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick<S, K>(&mut self, source: &mut S, classifier: &mut K) -> Tick
    where
        S: FrameSource + ?Sized,
        K: GestureClassifier + ?Sized,
    {
        self.stats.ticks += 1;

        if !source.is_ready() {
            self.stats.not_ready += 1;
            return Tick::idle(NOT_READY_DELAY);
        }

        if let Some(pending) = &self.in_flight {
            match pending.poll() {
                Poll::Pending => {
                    self.stats.busy += 1;
                    return Tick::idle(BUSY_DELAY);
                }
                Poll::Ready(outcome) => {
                    self.in_flight = None;
                    return self.finish(outcome, classifier);
                }
            }
        }

        self.stats.captures_started += 1;
        match source.capture_still() {
            Capture::Ready(outcome) => self.finish(outcome, classifier),
            Capture::Pending(pending) => {
                log::debug!("capture in flight on {}", source.name());
                self.in_flight = Some(pending);
                Tick::idle(BUSY_DELAY)
            }
        }
    }

    fn finish<K>(&mut self, outcome: CaptureOutcome, classifier: &mut K) -> Tick
    where
        K: GestureClassifier + ?Sized,
    {
        match outcome {
            Ok(Some(frame)) => {
                let detection = classifier.classify_frame(&frame.info());
                self.stats.detections += 1;
                log::debug!(
                    "frame {} bytes -> {} ({:.2}) via {}",
                    frame.byte_size(),
                    detection.gesture,
                    detection.confidence,
                    classifier.name()
                );
                Tick {
                    next_delay: DETECTION_DELAY,
                    detection: Some(detection),
                }
            }
            Ok(None) => {
                self.stats.empty_captures += 1;
                log::debug!("capture produced no usable image");
                Tick::idle(EMPTY_CAPTURE_DELAY)
            }
            Err(e) => {
                self.stats.capture_errors += 1;
                log::warn!("frame capture failed: {:#}", e);
                Tick::idle(CAPTURE_ERROR_DELAY)
            }
        }
    }

    pub fn is_frame_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn stats(&self) -> &SamplerStats {
        &self.stats
    }

    /// Abandon any in-flight capture and zero the counters.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.stats = SamplerStats::default();
    }
}
