//! Local still-image directory source.
//!
//! Replays encoded stills (JPEG/PNG/WebP) from a local directory in name
//! order, looping at the end. Each read runs on a worker thread and is handed
//! back as a pending capture, the same way a device capture would be.
//!
//! The directory source MUST NOT fetch remote URLs.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::thread;

use super::camera::{CameraConfig, CameraStats};
use super::source::{Capture, PendingCapture};
use crate::clock::{Clock, SystemClock};
use crate::frame::StillFrame;

const STILL_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

pub(crate) struct DirectorySource {
    config: CameraConfig,
    root: PathBuf,
    stills: Vec<PathBuf>,
    cursor: usize,
    frame_count: u64,
}

impl DirectorySource {
    pub(crate) fn new(config: CameraConfig) -> Result<Self> {
        if !is_local_path(&config.url) {
            return Err(anyhow!(
                "directory ingestion only supports local paths (no URL schemes)"
            ));
        }
        let root = PathBuf::from(&config.url);
        Ok(Self {
            config,
            root,
            stills: Vec::new(),
            cursor: 0,
            frame_count: 0,
        })
    }

    pub(crate) fn connect(&mut self) -> Result<()> {
        self.stills = list_stills(&self.root)?;
        if self.stills.is_empty() {
            log::warn!(
                "CameraSource: no stills found in {}; captures will be empty",
                self.root.display()
            );
        }
        log::info!(
            "CameraSource: connected to {} ({} stills)",
            self.root.display(),
            self.stills.len()
        );
        Ok(())
    }

    pub(crate) fn is_ready(&self) -> bool {
        !self.stills.is_empty()
    }

    pub(crate) fn capture_still(&mut self) -> Capture {
        let Some(path) = self.stills.get(self.cursor).cloned() else {
            return Capture::Ready(Ok(None));
        };
        self.cursor = (self.cursor + 1) % self.stills.len();
        self.frame_count += 1;

        let (completer, pending) = PendingCapture::channel();
        thread::spawn(move || {
            let outcome = std::fs::read(&path)
                .with_context(|| format!("reading still {}", path.display()))
                .map(|data| {
                    if data.is_empty() {
                        None
                    } else {
                        Some(StillFrame::new(data, SystemClock.now_ms()))
                    }
                });
            completer.complete(outcome);
        });
        Capture::Pending(pending)
    }

    pub(crate) fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            url: self.config.url.clone(),
        }
    }
}

fn list_stills(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("opening still directory {}", root.display()))?;
    let mut stills = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && has_still_extension(&path) {
            stills.push(path);
        }
    }
    stills.sort();
    Ok(stills)
}

fn has_still_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            STILL_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

fn is_local_path(path: &str) -> bool {
    !path.trim().is_empty() && !path.contains("://")
}
