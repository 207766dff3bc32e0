use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use crate::detect::DetectionResult;
use crate::round::RoundOutcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool) -> Self {
        Self { mode, is_tty }
    }

    pub fn from_args(ui_flag: Option<&str>, is_tty: bool) -> Self {
        let mode = match ui_flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        Self::new(mode, is_tty)
    }

    fn use_pretty(&self) -> bool {
        self.is_tty && self.mode != UiMode::Plain
    }

    /// Start a live-capture display for one round.
    pub fn capture_view(&self, round: u32) -> CaptureView {
        if self.use_pretty() {
            let spinner = ProgressBar::new_spinner();
            spinner.set_draw_target(ProgressDrawTarget::stderr());
            spinner.enable_steady_tick(Duration::from_millis(120));
            let style = ProgressStyle::with_template("{spinner} {prefix} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            spinner.set_style(style);
            spinner.set_prefix(format!("round {round}:"));
            spinner.set_message(live_label(DetectionResult::unknown()));
            CaptureView {
                round,
                spinner: Some(spinner),
            }
        } else {
            eprintln!("==> round {}: show your hand", round);
            CaptureView {
                round,
                spinner: None,
            }
        }
    }
}

/// Live status for one open capture view.
pub struct CaptureView {
    round: u32,
    spinner: Option<ProgressBar>,
}

impl CaptureView {
    pub fn show_detection(&self, detection: DetectionResult) {
        let label = live_label(detection);
        match &self.spinner {
            Some(spinner) => spinner.set_message(label),
            None => eprintln!("    round {}: {}", self.round, label),
        }
    }

    pub fn finish(self, outcome: &RoundOutcome) {
        let message = format!("✔ round {}: {}", self.round, round_summary(outcome));
        match &self.spinner {
            Some(spinner) => spinner.finish_with_message(message),
            None => eprintln!("{message}"),
        }
    }

    pub fn abandon(self) {
        if let Some(spinner) = &self.spinner {
            spinner.abandon_with_message("capture closed");
        }
    }
}

/// Status text for the live detection.
pub fn live_label(detection: DetectionResult) -> String {
    if !detection.gesture.is_known() {
        return "Waiting for a clear gesture…".to_string();
    }
    format!(
        "Seeing {} ({}%)",
        detection.gesture,
        (detection.confidence * 100.0).round() as u32
    )
}

/// One-line description of a finished round.
pub fn round_summary(outcome: &RoundOutcome) -> String {
    format!(
        "you {} ({} vs {})",
        outcome.result.as_str().to_lowercase(),
        outcome.player_gesture,
        outcome.computer_gesture
    )
}
