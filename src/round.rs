//! Round resolution.
//!
//! Committing a move engages two locks:
//! - the round lock (`ROUND_LOCK`, 600 ms): no other round may commit;
//! - the processing flag (`PROCESSING_HOLD`, 400 ms): the capture view may not
//!   be reopened.
//!
//! The resolver only holds the flags. Whoever owns the timeline schedules the
//! matching `release_lock` / `release_processing` calls.

use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

use crate::{random_gesture, resolve, GameResult, Gesture};

pub const ROUND_LOCK: Duration = Duration::from_millis(600);
pub const PROCESSING_HOLD: Duration = Duration::from_millis(400);
pub const MAX_HISTORY: usize = 5;

/// One resolved round. Never modified after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundOutcome {
    pub id: u64,
    pub player_gesture: Gesture,
    pub computer_gesture: Gesture,
    pub result: GameResult,
    /// Clock milliseconds at commit.
    pub timestamp_ms: u64,
}

/// Most-recent-first list of rounds, capped at `MAX_HISTORY`.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct RoundHistory {
    rounds: VecDeque<RoundOutcome>,
}

impl RoundHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: RoundOutcome) {
        self.rounds.push_front(outcome);
        self.rounds.truncate(MAX_HISTORY);
    }

    pub fn latest(&self) -> Option<&RoundOutcome> {
        self.rounds.front()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &RoundOutcome> {
        self.rounds.iter()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

/// Draws the computer's move, scores the round and records it.
pub struct RoundResolver<R: Rng> {
    rng: R,
    history: RoundHistory,
    lock_engaged: bool,
    processing: bool,
    next_id: u64,
}

impl<R: Rng> RoundResolver<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            history: RoundHistory::new(),
            lock_engaged: false,
            processing: false,
            next_id: 1,
        }
    }

    /// Commit the player's move.
    ///
    /// Returns `None` without side effects for `Unknown` or while the round
    /// lock is engaged. On success both locks are engaged.
    pub fn commit(&mut self, player: Gesture, now_ms: u64) -> Option<RoundOutcome> {
        if !player.is_known() || self.lock_engaged {
            return None;
        }
        self.lock_engaged = true;
        self.processing = true;

        let computer = random_gesture(&mut self.rng);
        let outcome = RoundOutcome {
            id: self.next_id,
            player_gesture: player,
            computer_gesture: computer,
            result: resolve(player, computer),
            timestamp_ms: now_ms,
        };
        self.next_id += 1;

        log::info!(
            "round #{}: {} vs {} -> {}",
            outcome.id,
            outcome.player_gesture,
            outcome.computer_gesture,
            outcome.result
        );
        self.history.record(outcome.clone());
        Some(outcome)
    }

    pub fn release_lock(&mut self) {
        self.lock_engaged = false;
    }

    pub fn release_processing(&mut self) {
        self.processing = false;
    }

    pub fn is_locked(&self) -> bool {
        self.lock_engaged
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// True when a new round may be committed.
    pub fn gate_open(&self) -> bool {
        !self.lock_engaged && !self.processing
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn resolver() -> RoundResolver<StdRng> {
        RoundResolver::new(StdRng::seed_from_u64(11))
    }

    #[test]
    fn unknown_gesture_is_ignored() {
        let mut r = resolver();
        assert!(r.commit(Gesture::Unknown, 0).is_none());
        assert!(!r.is_locked());
        assert!(r.history().is_empty());
    }

    #[test]
    fn commit_engages_both_locks_and_scores() {
        let mut r = resolver();
        let outcome = r.commit(Gesture::Paper, 1_000).expect("committed");
        assert_eq!(outcome.id, 1);
        assert_eq!(outcome.player_gesture, Gesture::Paper);
        assert!(outcome.computer_gesture.is_known());
        assert_eq!(
            outcome.result,
            resolve(Gesture::Paper, outcome.computer_gesture)
        );
        assert_eq!(outcome.timestamp_ms, 1_000);
        assert!(r.is_locked());
        assert!(r.is_processing());
        assert!(!r.gate_open());
    }

    #[test]
    fn locked_resolver_rejects_reentry() {
        let mut r = resolver();
        r.commit(Gesture::Rock, 0).unwrap();
        r.release_processing();
        assert!(r.commit(Gesture::Rock, 100).is_none());
        assert_eq!(r.history().len(), 1);

        r.release_lock();
        assert!(r.gate_open());
        assert_eq!(r.commit(Gesture::Rock, 700).map(|o| o.id), Some(2));
    }

    #[test]
    fn history_keeps_five_newest_first() {
        let mut r = resolver();
        for i in 0..8u64 {
            r.commit(Gesture::Scissors, i * 1_000).unwrap();
            r.release_lock();
            r.release_processing();
        }
        let ids: Vec<u64> = r.history().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![8, 7, 6, 5, 4]);
        assert_eq!(r.history().latest().map(|o| o.timestamp_ms), Some(7_000));
    }

    #[test]
    fn history_serializes_as_list() {
        let mut history = RoundHistory::new();
        history.record(RoundOutcome {
            id: 1,
            player_gesture: Gesture::Rock,
            computer_gesture: Gesture::Scissors,
            result: GameResult::Win,
            timestamp_ms: 5,
        });
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json[0]["player_gesture"], "rock");
        assert_eq!(json[0]["result"], "Win");
    }
}
