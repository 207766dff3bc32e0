//! Live rock-paper-scissors kernel.
//!
//! This crate implements the live gesture-detection and round-resolution
//! pipeline of a casual rock-paper-scissors game.
//!
//! # Architecture
//!
//! ```text
//! FrameSource -> SamplingLoop -> GestureClassifier -> DetectionAggregator
//!                                                          | (commit)
//!                                                     RoundResolver -> history / UI
//! ```
//!
//! The classifier is deliberately not computer vision: it guesses a gesture
//! from how the encoded size of a still compares to recent stills, with a
//! time-sliced fallback when sizes do not vary enough.
//!
//! # Module Structure
//!
//! - `clock`, `timeline`: virtual time and the cooperative timer queue
//! - `frame`, `ingest`: captured stills and the sources that produce them
//! - `detect`: detection results, size sample window, size-band classifier
//! - `sampler`, `debounce`, `round`: the three stages of the pipeline
//! - `session`: wires the stages to a timeline for a presentation layer
//! - Core types: Gesture, GameResult, rule table

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod clock;
pub mod config;
pub mod debounce;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod round;
pub mod sampler;
pub mod session;
pub mod timeline;
pub mod ui;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::{DetectionAggregator, DetectionStreak, MIN_CONFIDENCE, REQUIRED_STREAK};
pub use detect::{
    DetectionResult, GestureClassifier, SizeBandClassifier, SizeSampleWindow, MAX_SIZE_SAMPLES,
};
pub use frame::{FrameInfo, StillFrame};
pub use ingest::{
    CameraConfig, CameraSource, Capture, CaptureCompleter, FrameSource, PendingCapture,
};
pub use round::{RoundHistory, RoundOutcome, RoundResolver, MAX_HISTORY};
pub use sampler::{SamplerStats, SamplingLoop, Tick};
pub use session::{GameSession, Scoreboard, SessionEvent};
pub use timeline::{PeriodicTask, Timeline, TimerId};

// -------------------- Gestures --------------------

/// A hand pose.
///
/// `Unknown` means both "no pose seen" and "the classifier declined to guess".
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    Rock,
    Paper,
    Scissors,
    #[default]
    Unknown,
}

/// The three playable gestures, in the order the opponent draws from.
pub const PLAYABLE: [Gesture; 3] = [Gesture::Rock, Gesture::Paper, Gesture::Scissors];

impl Gesture {
    pub fn as_str(self) -> &'static str {
        match self {
            Gesture::Rock => "rock",
            Gesture::Paper => "paper",
            Gesture::Scissors => "scissors",
            Gesture::Unknown => "unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != Gesture::Unknown
    }

    /// The gesture this one defeats, if any.
    pub fn beats(self) -> Option<Gesture> {
        match self {
            Gesture::Rock => Some(Gesture::Scissors),
            Gesture::Scissors => Some(Gesture::Paper),
            Gesture::Paper => Some(Gesture::Rock),
            Gesture::Unknown => None,
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -------------------- Rules --------------------

/// Outcome of a round from the player's point of view.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GameResult {
    Win,
    Lose,
    Draw,
}

impl GameResult {
    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::Win => "Win",
            GameResult::Lose => "Lose",
            GameResult::Draw => "Draw",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform draw over rock, paper and scissors.
pub fn random_gesture<R: Rng>(rng: &mut R) -> Gesture {
    PLAYABLE[rng.gen_range(0..PLAYABLE.len())]
}

/// Fixed rule table: equal gestures draw, rock > scissors > paper > rock.
pub fn resolve(player: Gesture, computer: Gesture) -> GameResult {
    if player == computer {
        GameResult::Draw
    } else if player.beats() == Some(computer) {
        GameResult::Win
    } else {
        GameResult::Lose
    }
}
