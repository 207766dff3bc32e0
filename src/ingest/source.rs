//! Frame source contract.

use anyhow::{anyhow, Result};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::task::Poll;

use crate::frame::StillFrame;

/// Result of one still capture: a frame, no usable image, or an error.
pub type CaptureOutcome = Result<Option<StillFrame>>;

/// A device (or simulation) the sampling loop can take stills from.
///
/// Sources fail softly: `Ok(None)` for "no usable image", `Err` for anything
/// else. Neither is fatal to the caller.
pub trait FrameSource {
    /// Source identifier for logs.
    fn name(&self) -> &str;

    /// Whether the device can take a still right now.
    fn is_ready(&self) -> bool;

    /// Start a still capture. Sources that block (disk, device I/O) should
    /// return `Capture::Pending` and complete it from elsewhere.
    fn capture_still(&mut self) -> Capture;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn capture_still(&mut self) -> Capture {
        (**self).capture_still()
    }
}

/// A capture that either finished synchronously or is still running.
pub enum Capture {
    Ready(CaptureOutcome),
    Pending(PendingCapture),
}

/// Receiving half of an in-flight capture.
pub struct PendingCapture {
    rx: Receiver<CaptureOutcome>,
}

impl PendingCapture {
    /// Create a linked completer / pending pair.
    pub fn channel() -> (CaptureCompleter, PendingCapture) {
        let (tx, rx) = mpsc::channel();
        (CaptureCompleter { tx }, PendingCapture { rx })
    }

    /// Non-blocking check for completion. A completer dropped without
    /// completing resolves to an error.
    pub fn poll(&self) -> Poll<CaptureOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Poll::Ready(outcome),
            Err(TryRecvError::Empty) => Poll::Pending,
            Err(TryRecvError::Disconnected) => {
                Poll::Ready(Err(anyhow!("capture abandoned before completion")))
            }
        }
    }
}

/// Sending half of an in-flight capture.
pub struct CaptureCompleter {
    tx: Sender<CaptureOutcome>,
}

impl CaptureCompleter {
    pub fn complete(self, outcome: CaptureOutcome) {
        // The pending side is dropped when capture mode ends; late results are discarded.
        let _ = self.tx.send(outcome);
    }
}
