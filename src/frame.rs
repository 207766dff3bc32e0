//! Captured stills.
//!
//! - `StillFrame`: one encoded image taken from the live feed. The encoded bytes
//!   are private; the classifier only ever sees the encoded size.
//! - `FrameInfo`: the non-pixel summary handed to a `GestureClassifier`.

use std::fmt;

/// One encoded still taken from the live feed.
///
/// There is no `.as_bytes()`: nothing in the pipeline inspects pixels, and
/// frames are dropped as soon as they have been classified.
pub struct StillFrame {
    data: Vec<u8>,
    /// Capture time as stamped by the source (built-in sources use wall-clock
    /// epoch ms). Informational only: round timestamps come from the session clock.
    pub captured_at_ms: u64,
}

impl StillFrame {
    pub fn new(data: Vec<u8>, captured_at_ms: u64) -> Self {
        Self {
            data,
            captured_at_ms,
        }
    }

    /// Encoded size in bytes.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// Restricted summary for classifiers.
    pub fn info(&self) -> FrameInfo {
        FrameInfo {
            byte_size: self.data.len() as f64,
            captured_at_ms: self.captured_at_ms,
        }
    }
}

impl fmt::Debug for StillFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StillFrame")
            .field("byte_size", &self.data.len())
            .field("captured_at_ms", &self.captured_at_ms)
            .finish()
    }
}

/// What a classifier is allowed to know about a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInfo {
    pub byte_size: f64,
    pub captured_at_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_reports_encoded_size() {
        let frame = StillFrame::new(vec![0u8; 31_337], 42);
        let info = frame.info();
        assert_eq!(frame.byte_size(), 31_337);
        assert_eq!(info.byte_size, 31_337.0);
        assert_eq!(info.captured_at_ms, 42);
    }

    #[test]
    fn debug_does_not_dump_bytes() {
        let frame = StillFrame::new(vec![7u8; 16], 0);
        let rendered = format!("{:?}", frame);
        assert!(rendered.contains("byte_size: 16"));
        assert!(!rendered.contains("[7"));
    }
}
