//! Detection aggregator.
//!
//! A single confident frame never commits a round. A move is committed once
//! `REQUIRED_STREAK` consecutive detections of the same known gesture reach
//! `MIN_CONFIDENCE`, and only while the round gate is open.

use crate::detect::DetectionResult;
use crate::Gesture;

pub const MIN_CONFIDENCE: f32 = 0.5;
pub const REQUIRED_STREAK: u32 = 2;

/// Run of consecutive qualifying same-gesture detections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetectionStreak {
    pub gesture: Gesture,
    pub count: u32,
}

impl DetectionStreak {
    /// `{unknown, 0}`.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Streak state plus the live detection shown to the player.
#[derive(Clone, Debug)]
pub struct DetectionAggregator {
    streak: DetectionStreak,
    live: DetectionResult,
    min_confidence: f32,
    required_streak: u32,
}

impl DetectionAggregator {
    pub fn new() -> Self {
        Self {
            streak: DetectionStreak::empty(),
            live: DetectionResult::unknown(),
            min_confidence: MIN_CONFIDENCE,
            required_streak: REQUIRED_STREAK,
        }
    }

    /// Feed one detection. Returns the gesture to commit, if any.
    ///
    /// `gate_open` is false while a round is processing or the round lock is
    /// engaged; the streak keeps accumulating but nothing is committed.
    pub fn on_detection(&mut self, detection: DetectionResult, gate_open: bool) -> Option<Gesture> {
        self.live = detection;

        if !detection.gesture.is_known() || !(detection.confidence >= self.min_confidence) {
            self.streak = DetectionStreak::empty();
            return None;
        }

        if self.streak.gesture == detection.gesture {
            self.streak.count += 1;
        } else {
            self.streak = DetectionStreak {
                gesture: detection.gesture,
                count: 1,
            };
        }

        if self.streak.count >= self.required_streak && gate_open {
            let gesture = self.streak.gesture;
            self.streak = DetectionStreak::empty();
            return Some(gesture);
        }
        None
    }

    /// Most recent detection, qualifying or not.
    pub fn live(&self) -> DetectionResult {
        self.live
    }

    pub fn streak(&self) -> DetectionStreak {
        self.streak
    }

    /// Forget the streak and the live detection.
    pub fn reset(&mut self) {
        self.streak = DetectionStreak::empty();
        self.live = DetectionResult::unknown();
    }

    /// Forget the streak only; the live detection stays on display.
    pub fn clear_streak(&mut self) {
        self.streak = DetectionStreak::empty();
    }
}

impl Default for DetectionAggregator {
    fn default() -> Self {
        Self::new()
    }
}
