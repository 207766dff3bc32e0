use std::collections::VecDeque;

/// Number of recent frame sizes kept as the classification reference range.
pub const MAX_SIZE_SAMPLES: usize = 40;

/// Bounded FIFO of recent encoded frame sizes.
///
/// The window outlives capture sessions and rounds; it is only emptied by
/// `reset` (or by creating a new classifier).
#[derive(Clone, Debug)]
pub struct SizeSampleWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl SizeSampleWindow {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SIZE_SAMPLES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when over capacity.
    pub fn push(&mut self, size: f64) {
        self.samples.push_back(size);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn min(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::max)
    }

    /// `max - min`, or zero for an empty window.
    pub fn spread(&self) -> f64 {
        match (self.min(), self.max()) {
            (Some(min), Some(max)) => max - min,
            _ => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}

impl Default for SizeSampleWindow {
    fn default() -> Self {
        Self::new()
    }
}
