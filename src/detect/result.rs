use serde::Serialize;

use crate::Gesture;

/// Per-frame gesture estimate. Replaced on every sampler tick, never mutated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DetectionResult {
    pub gesture: Gesture,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
}

impl DetectionResult {
    pub fn new(gesture: Gesture, confidence: f32) -> Self {
        Self {
            gesture,
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }

    /// `{unknown, 0}`.
    pub fn unknown() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped_into_unit_range() {
        assert_eq!(DetectionResult::new(Gesture::Rock, 1.7).confidence, 1.0);
        assert_eq!(DetectionResult::new(Gesture::Rock, -0.2).confidence, 0.0);
        assert_eq!(DetectionResult::new(Gesture::Rock, 0.42).confidence, 0.42);
    }

    #[test]
    fn non_finite_confidence_becomes_zero() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let d = DetectionResult::new(Gesture::Paper, bad);
            assert_eq!(d.confidence, 0.0);
            assert_eq!(d.gesture, Gesture::Paper);
        }
    }
}
