mod classifier;
mod result;
mod window;

pub use classifier::{
    time_fallback, GestureClassifier, SizeBandClassifier, BAND_ORDER, FALLBACK_CONFIDENCE,
    FALLBACK_SLICE_MS, MIN_BAND_CONFIDENCE, MIN_SPREAD_BYTES,
};
pub use result::DetectionResult;
pub use window::{SizeSampleWindow, MAX_SIZE_SAMPLES};
