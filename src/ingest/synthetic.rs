//! Synthetic camera (`stub://` URLs).
//!
//! Simulates a player holding a pose for a few frames before switching.
//! Each pose encodes to a characteristic size, so the size-band classifier
//! sees the kind of spread a real feed produces. A small share of captures
//! come back empty or fail, to keep the sampler's soft-failure paths busy.

use anyhow::anyhow;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::Cell;

use super::camera::{CameraConfig, CameraStats};
use super::source::{Capture, CaptureOutcome};
use crate::clock::{Clock, SystemClock};
use crate::frame::StillFrame;
use crate::Gesture;

const JITTER_BYTES: u32 = 2_500;
const MIN_HOLD_FRAMES: u32 = 3;
const MAX_HOLD_FRAMES: u32 = 6;
/// One capture in this many returns no image.
const EMPTY_EVERY: u32 = 25;
/// One capture in this many fails.
const FAIL_EVERY: u32 = 40;

pub(crate) struct SyntheticCamera {
    config: CameraConfig,
    rng: StdRng,
    connected: bool,
    warmup_remaining: Cell<u32>,
    pose: Gesture,
    hold_remaining: u32,
    frame_count: u64,
}

impl SyntheticCamera {
    pub(crate) fn new(config: CameraConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let warmup = config.warmup_frames;
        Self {
            config,
            rng,
            connected: false,
            warmup_remaining: Cell::new(warmup),
            pose: Gesture::Unknown,
            hold_remaining: 0,
            frame_count: 0,
        }
    }

    pub(crate) fn connect(&mut self) -> anyhow::Result<()> {
        log::info!("CameraSource: connected to {} (synthetic)", self.config.url);
        self.connected = true;
        Ok(())
    }

    pub(crate) fn is_ready(&self) -> bool {
        if !self.connected {
            return false;
        }
        let remaining = self.warmup_remaining.get();
        if remaining > 0 {
            self.warmup_remaining.set(remaining - 1);
            return false;
        }
        true
    }

    pub(crate) fn capture_still(&mut self) -> Capture {
        Capture::Ready(self.next_outcome())
    }

    fn next_outcome(&mut self) -> CaptureOutcome {
        self.frame_count += 1;

        if self.rng.gen_ratio(1, FAIL_EVERY) {
            return Err(anyhow!(
                "synthetic capture fault on frame {}",
                self.frame_count
            ));
        }
        if self.rng.gen_ratio(1, EMPTY_EVERY) {
            return Ok(None);
        }

        if self.hold_remaining == 0 {
            self.pose = crate::random_gesture(&mut self.rng);
            self.hold_remaining = self.rng.gen_range(MIN_HOLD_FRAMES..=MAX_HOLD_FRAMES);
        }
        self.hold_remaining -= 1;

        let size = self.encoded_size(self.pose);
        Ok(Some(StillFrame::new(vec![0u8; size], SystemClock.now_ms())))
    }

    fn encoded_size(&mut self, pose: Gesture) -> usize {
        let base: u32 = match pose {
            Gesture::Rock => 28_000,
            Gesture::Scissors => 52_000,
            Gesture::Paper => 76_000,
            Gesture::Unknown => 40_000,
        };
        let jitter = self.rng.gen_range(0..=JITTER_BYTES * 2);
        (base - JITTER_BYTES + jitter) as usize
    }

    pub(crate) fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            url: self.config.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(seed: u64, warmup_frames: u32) -> SyntheticCamera {
        SyntheticCamera::new(CameraConfig {
            url: "stub://test".to_string(),
            seed: Some(seed),
            warmup_frames,
        })
    }

    #[test]
    fn not_ready_until_connected_and_warm() {
        let mut cam = camera(1, 2);
        assert!(!cam.is_ready());
        cam.connect().unwrap();
        assert!(!cam.is_ready());
        assert!(!cam.is_ready());
        assert!(cam.is_ready());
    }

    #[test]
    fn frame_sizes_stay_within_pose_ranges() {
        let mut cam = camera(9, 0);
        cam.connect().unwrap();
        let mut frames = 0;
        for _ in 0..200 {
            if let Capture::Ready(Ok(Some(frame))) = cam.capture_still() {
                let size = frame.byte_size();
                assert!((25_500..=78_500).contains(&size), "size {}", size);
                frames += 1;
            }
        }
        assert!(frames > 150);
        assert_eq!(cam.stats().frames_captured, 200);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = camera(42, 0);
        let mut b = camera(42, 0);
        for _ in 0..50 {
            let sa = match a.capture_still() {
                Capture::Ready(Ok(frame)) => frame.map(|f| f.byte_size()),
                _ => None,
            };
            let sb = match b.capture_still() {
                Capture::Ready(Ok(frame)) => frame.map(|f| f.byte_size()),
                _ => None,
            };
            assert_eq!(sa, sb);
        }
    }
}
