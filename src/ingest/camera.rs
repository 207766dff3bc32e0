//! Camera source selection.
//!
//! `CameraSource` dispatches on the configured URL:
//! - `stub://<name>`: synthetic poses (no device needed)
//! - a local directory path: replayed stills
//!
//! Any other URL scheme is rejected.

use anyhow::Result;

use super::directory::DirectorySource;
use super::source::{Capture, FrameSource};
use super::synthetic::SyntheticCamera;

/// Configuration for a camera source.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// `stub://name` or a local directory of stills.
    pub url: String,
    /// Seed for the synthetic camera. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Synthetic camera only: readiness polls answered "not ready" after connect.
    pub warmup_frames: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            url: "stub://front_camera".to_string(),
            seed: None,
            warmup_frames: 0,
        }
    }
}

/// Live camera feed.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticCamera),
    Directory(DirectorySource),
}

impl CameraSource {
    pub fn new(config: CameraConfig) -> Result<Self> {
        if config.url.starts_with("stub://") {
            Ok(Self {
                backend: CameraBackend::Synthetic(SyntheticCamera::new(config)),
            })
        } else {
            Ok(Self {
                backend: CameraBackend::Directory(DirectorySource::new(config)?),
            })
        }
    }

    /// Open the device. Until this succeeds the source reports not ready.
    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.connect(),
            CameraBackend::Directory(source) => source.connect(),
        }
    }

    pub fn stats(&self) -> CameraStats {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.stats(),
            CameraBackend::Directory(source) => source.stats(),
        }
    }
}

impl FrameSource for CameraSource {
    fn name(&self) -> &str {
        match &self.backend {
            CameraBackend::Synthetic(_) => "synthetic",
            CameraBackend::Directory(_) => "directory",
        }
    }

    fn is_ready(&self) -> bool {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.is_ready(),
            CameraBackend::Directory(source) => source.is_ready(),
        }
    }

    fn capture_still(&mut self) -> Capture {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.capture_still(),
            CameraBackend::Directory(source) => source.capture_still(),
        }
    }
}

/// Statistics for a camera source.
#[derive(Clone, Debug)]
pub struct CameraStats {
    pub frames_captured: u64,
    pub url: String,
}
