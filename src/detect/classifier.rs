use crate::clock::Clock;
use crate::detect::result::DetectionResult;
use crate::detect::window::SizeSampleWindow;
use crate::frame::FrameInfo;
use crate::Gesture;

/// Minimum byte-size spread across the window before bands are trusted.
pub const MIN_SPREAD_BYTES: f64 = 25_000.0;

/// Band estimates below this confidence defer to the time fallback.
pub const MIN_BAND_CONFIDENCE: f64 = 0.6;

/// Fixed confidence reported by the time fallback.
pub const FALLBACK_CONFIDENCE: f32 = 0.6;

/// Width of one fallback time slice.
pub const FALLBACK_SLICE_MS: u64 = 1_500;

/// Band-to-gesture assignment, smallest sizes first. Also the fallback rotation.
pub const BAND_ORDER: [Gesture; 3] = [Gesture::Rock, Gesture::Scissors, Gesture::Paper];

const SEED_DIVISOR: f64 = 10_000.0;
const BASE_CONFIDENCE: f64 = 0.55;
const CLOSENESS_WEIGHT: f64 = 0.4;

/// Turns a captured frame into a gesture estimate.
///
/// Classifiers see only `FrameInfo`, never pixels.
pub trait GestureClassifier {
    /// Classifier identifier for logs.
    fn name(&self) -> &'static str;

    fn classify_frame(&mut self, frame: &FrameInfo) -> DetectionResult;
}

/// Size-band heuristic.
///
/// Each frame's encoded size is placed within the range of the last
/// `MAX_SIZE_SAMPLES` sizes; the range is cut into three equal bands mapped to
/// rock, scissors and paper. When the range is too narrow, or the frame sits
/// near a band edge, a gesture is picked from the current 1.5 s time slice
/// instead. This is a placeholder for pose recognition and does not track what
/// the hand is actually doing.
pub struct SizeBandClassifier<C: Clock> {
    window: SizeSampleWindow,
    clock: C,
}

impl<C: Clock> SizeBandClassifier<C> {
    pub fn new(clock: C) -> Self {
        Self::with_window(SizeSampleWindow::new(), clock)
    }

    pub fn with_window(window: SizeSampleWindow, clock: C) -> Self {
        Self { window, clock }
    }

    /// Classify one encoded size. `None`, zero, negative and non-finite sizes
    /// yield `{unknown, 0}` and leave the window untouched.
    pub fn classify(&mut self, byte_size: Option<f64>) -> DetectionResult {
        let Some(size) = byte_size.filter(|s| s.is_finite() && *s > 0.0) else {
            return DetectionResult::unknown();
        };

        self.window.push(size);

        let (Some(min), Some(max)) = (self.window.min(), self.window.max()) else {
            return time_fallback(self.clock.now_ms(), Some(size));
        };
        let spread = max - min;
        if spread < MIN_SPREAD_BYTES {
            return time_fallback(self.clock.now_ms(), Some(size));
        }

        let step = spread / BAND_ORDER.len() as f64;
        let band = if size < min + step {
            0
        } else if size < min + step * 2.0 {
            1
        } else {
            2
        };
        let center = min + step * (band as f64 + 0.5);
        let half_band = step / 2.0;
        let distance = (size - center).abs();
        let closeness = (1.0 - distance / half_band.max(1.0)).max(0.0);
        let confidence = (BASE_CONFIDENCE + closeness * CLOSENESS_WEIGHT).min(1.0);

        if confidence < MIN_BAND_CONFIDENCE {
            return time_fallback(self.clock.now_ms(), Some(size));
        }

        DetectionResult::new(BAND_ORDER[band], confidence as f32)
    }

    pub fn window(&self) -> &SizeSampleWindow {
        &self.window
    }

    /// Forget every recorded size.
    pub fn reset(&mut self) {
        self.window.reset();
    }
}

impl<C: Clock> GestureClassifier for SizeBandClassifier<C> {
    fn name(&self) -> &'static str {
        "size-band"
    }

    fn classify_frame(&mut self, frame: &FrameInfo) -> DetectionResult {
        self.classify(Some(frame.byte_size))
    }
}

/// Gesture for the time slice containing `now_ms`, offset by `seed / 10_000`.
pub fn time_fallback(now_ms: u64, seed: Option<f64>) -> DetectionResult {
    let slice = now_ms / FALLBACK_SLICE_MS;
    let offset = seed
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| (s / SEED_DIVISOR).floor() as u64)
        .unwrap_or(0);
    let index = (slice.wrapping_add(offset) % BAND_ORDER.len() as u64) as usize;
    DetectionResult {
        gesture: BAND_ORDER[index],
        confidence: FALLBACK_CONFIDENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::detect::window::MAX_SIZE_SAMPLES;

    fn flat_classifier(clock: &ManualClock) -> SizeBandClassifier<ManualClock> {
        let mut classifier = SizeBandClassifier::new(clock.clone());
        for _ in 0..MAX_SIZE_SAMPLES {
            classifier.classify(Some(10_000.0));
        }
        classifier
    }

    #[test]
    fn degenerate_sizes_are_unknown() {
        let mut classifier = SizeBandClassifier::new(ManualClock::new(0));
        for size in [None, Some(0.0), Some(f64::NAN), Some(f64::INFINITY), Some(-5.0)] {
            assert_eq!(classifier.classify(size), DetectionResult::unknown());
        }
        assert!(classifier.window().is_empty());
    }

    #[test]
    fn narrow_spread_uses_time_fallback() {
        let clock = ManualClock::new(0);
        let mut classifier = flat_classifier(&clock);
        assert_eq!(classifier.window().spread(), 0.0);

        // slice 0 + floor(10_000 / 10_000) = 1 -> scissors
        let r = classifier.classify(Some(10_000.0));
        assert_eq!(r.gesture, Gesture::Scissors);
        assert_eq!(r.confidence, FALLBACK_CONFIDENCE);

        clock.set(1_500);
        let r = classifier.classify(Some(10_000.0));
        assert_eq!(r.gesture, Gesture::Paper);
        assert_eq!(r.confidence, 0.6);

        // spread 14_000 is still too narrow: slice 2 + floor(2.4) = 4 -> scissors
        clock.set(3_000);
        assert_eq!(classifier.classify(Some(24_000.0)).gesture, Gesture::Scissors);
    }

    #[test]
    fn wide_spread_enables_size_bands_on_following_frame() {
        let clock = ManualClock::new(0);
        let mut classifier = flat_classifier(&clock);

        // 50_000 sits on the paper band's far edge: closeness 0, confidence 0.55 -> fallback.
        let first = classifier.classify(Some(50_000.0));
        assert_eq!(classifier.window().spread(), 40_000.0);
        assert_eq!(first.confidence, FALLBACK_CONFIDENCE);

        // Band centres for [10_000, 50_000] are ~16_667, 30_000, ~43_333.
        let rock = classifier.classify(Some(16_667.0));
        assert_eq!(rock.gesture, Gesture::Rock);
        assert!(rock.confidence > 0.94);

        let scissors = classifier.classify(Some(30_000.0));
        assert_eq!(scissors.gesture, Gesture::Scissors);
        assert!((scissors.confidence - 0.95).abs() < 1e-6);

        let paper = classifier.classify(Some(43_333.0));
        assert_eq!(paper.gesture, Gesture::Paper);
        assert!(paper.confidence > 0.94);
    }

    #[test]
    fn band_edge_defers_to_fallback() {
        let clock = ManualClock::new(0);
        let mut classifier = flat_classifier(&clock);
        classifier.classify(Some(70_000.0));

        // step = 20_000; 29_000 is 1_000 below the rock/scissors boundary.
        // closeness = 1 - 9_000 / 10_000 = 0.1 -> confidence 0.59 < 0.6.
        let r = classifier.classify(Some(29_000.0));
        assert_eq!(r.confidence, FALLBACK_CONFIDENCE);
        // slice 0 + floor(29_000 / 10_000) = 2 -> paper
        assert_eq!(r.gesture, Gesture::Paper);
    }

    #[test]
    fn reset_empties_window() {
        let clock = ManualClock::new(0);
        let mut classifier = flat_classifier(&clock);
        classifier.reset();
        assert!(classifier.window().is_empty());
    }

    #[test]
    fn fallback_without_seed_rotates_by_slice() {
        assert_eq!(time_fallback(0, None).gesture, Gesture::Rock);
        assert_eq!(time_fallback(1_499, None).gesture, Gesture::Rock);
        assert_eq!(time_fallback(1_500, None).gesture, Gesture::Scissors);
        assert_eq!(time_fallback(3_000, None).gesture, Gesture::Paper);
        assert_eq!(time_fallback(4_500, None).gesture, Gesture::Rock);
    }
}
