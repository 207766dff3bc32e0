//! Game session: the pipeline wired to a timeline.
//!
//! A presentation layer drives a `GameSession` by
//! 1. opening the capture view (`open_capture`),
//! 2. calling `advance` whenever the clock reaches `next_wakeup`,
//! 3. draining `SessionEvent`s to render the live detection and results.
//!
//! Committing a round closes the capture view. It may be reopened once the
//! processing hold has elapsed.

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::VecDeque;

use crate::clock::Clock;
use crate::debounce::{DetectionAggregator, DetectionStreak};
use crate::detect::{DetectionResult, GestureClassifier, SizeBandClassifier};
use crate::ingest::FrameSource;
use crate::round::{RoundHistory, RoundOutcome, RoundResolver, PROCESSING_HOLD, ROUND_LOCK};
use crate::sampler::{SamplerStats, SamplingLoop};
use crate::timeline::{PeriodicTask, Timeline, TimerId};
use crate::{GameResult, Gesture};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionTimer {
    SamplerTick,
    RoundLockRelease,
    ProcessingRelease,
}

/// Notifications for the presentation layer, in the order they happened.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// Every detection the sampler produced, qualifying or not.
    LiveDetection(DetectionResult),
    RoundCommitted(RoundOutcome),
}

/// Results over the whole session (history only keeps the newest rounds).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl Scoreboard {
    pub fn record(&mut self, result: GameResult) {
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Lose => self.losses += 1,
            GameResult::Draw => self.draws += 1,
        }
    }

    pub fn rounds(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

pub struct GameSession<S: FrameSource, C: Clock> {
    clock: C,
    source: S,
    classifier: Box<dyn GestureClassifier>,
    sampler: SamplingLoop,
    sampler_task: Option<PeriodicTask>,
    aggregator: DetectionAggregator,
    resolver: RoundResolver<StdRng>,
    timeline: Timeline<SessionTimer>,
    events: VecDeque<SessionEvent>,
    scoreboard: Scoreboard,
}

impl<S: FrameSource, C: Clock + Clone + 'static> GameSession<S, C> {
    /// Session with the size-band classifier. `rng_seed` fixes the computer's
    /// moves; `None` draws from entropy.
    pub fn new(source: S, clock: C, rng_seed: Option<u64>) -> Self {
        let classifier = Box::new(SizeBandClassifier::new(clock.clone()));
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_classifier(source, clock, classifier, rng)
    }
}

impl<S: FrameSource, C: Clock> GameSession<S, C> {
    pub fn with_classifier(
        source: S,
        clock: C,
        classifier: Box<dyn GestureClassifier>,
        rng: StdRng,
    ) -> Self {
        Self {
            clock,
            source,
            classifier,
            sampler: SamplingLoop::new(),
            sampler_task: None,
            aggregator: DetectionAggregator::new(),
            resolver: RoundResolver::new(rng),
            timeline: Timeline::new(),
            events: VecDeque::new(),
            scoreboard: Scoreboard::default(),
        }
    }

    /// Enter live-capture mode. The first sampler tick is due immediately.
    ///
    /// Fails while the previous round is still processing. Opening an already
    /// open view is a no-op.
    pub fn open_capture(&mut self) -> Result<()> {
        if self.resolver.is_processing() {
            bail!("previous round is still being processed");
        }
        if self.is_capturing() {
            return Ok(());
        }
        self.aggregator.reset();
        self.sampler.reset();
        let now = self.clock.now_ms();
        self.sampler_task = Some(PeriodicTask::start(
            &mut self.timeline,
            now,
            SessionTimer::SamplerTick,
        ));
        log::debug!("capture opened on {}", self.source.name());
        Ok(())
    }

    /// Leave live-capture mode. Cancels the pending sampler tick and drops any
    /// in-flight capture.
    pub fn close_capture(&mut self) {
        if let Some(mut task) = self.sampler_task.take() {
            task.cancel(&mut self.timeline);
            let stats = self.sampler.stats();
            log::debug!(
                "capture closed: ticks={} captures={} detections={} empty={} errors={}",
                stats.ticks,
                stats.captures_started,
                stats.detections,
                stats.empty_captures,
                stats.capture_errors
            );
        }
        self.sampler.reset();
    }

    pub fn is_capturing(&self) -> bool {
        self.sampler_task.is_some()
    }

    /// Feed one detection through the debouncer; commits a round when the
    /// streak is satisfied and the round gate is open.
    ///
    /// Detections arriving while the capture view is closed are dropped.
    pub fn on_detection(&mut self, detection: DetectionResult) -> Option<RoundOutcome> {
        if !self.is_capturing() {
            log::debug!("capture closed; dropping {} detection", detection.gesture);
            return None;
        }
        self.events.push_back(SessionEvent::LiveDetection(detection));
        let gesture = self
            .aggregator
            .on_detection(detection, self.resolver.gate_open())?;
        self.commit_round(gesture)
    }

    fn commit_round(&mut self, gesture: Gesture) -> Option<RoundOutcome> {
        let now = self.clock.now_ms();
        let outcome = self.resolver.commit(gesture, now)?;
        self.timeline
            .schedule(now, ROUND_LOCK, SessionTimer::RoundLockRelease);
        self.timeline
            .schedule(now, PROCESSING_HOLD, SessionTimer::ProcessingRelease);
        self.close_capture();
        self.aggregator.reset();
        self.scoreboard.record(outcome.result);
        self.events
            .push_back(SessionEvent::RoundCommitted(outcome.clone()));
        Some(outcome)
    }

    /// Fire every timer due at the clock's current time. Returns how many fired.
    pub fn advance(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut fired = 0;
        while let Some((id, timer)) = self.timeline.pop_due(now) {
            fired += 1;
            match timer {
                SessionTimer::SamplerTick => self.sampler_tick(id, now),
                SessionTimer::RoundLockRelease => {
                    self.resolver.release_lock();
                    log::debug!("round lock released");
                }
                SessionTimer::ProcessingRelease => {
                    self.resolver.release_processing();
                    log::debug!("round processing finished");
                }
            }
        }
        fired
    }

    fn sampler_tick(&mut self, id: TimerId, now: u64) {
        let accepted = self
            .sampler_task
            .as_mut()
            .is_some_and(|task| task.accept(id));
        if !accepted {
            return;
        }

        let tick = self
            .sampler
            .tick(&mut self.source, self.classifier.as_mut());
        if let Some(detection) = tick.detection {
            self.on_detection(detection);
        }

        // A commit above closes the capture view and drops the task.
        if let Some(task) = self.sampler_task.as_mut() {
            task.reschedule(
                &mut self.timeline,
                now,
                tick.next_delay,
                SessionTimer::SamplerTick,
            );
        }
    }

    /// Clock time of the next timer, if any.
    pub fn next_wakeup(&mut self) -> Option<u64> {
        self.timeline.next_due()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    pub fn live_detection(&self) -> DetectionResult {
        self.aggregator.live()
    }

    pub fn streak(&self) -> DetectionStreak {
        self.aggregator.streak()
    }

    pub fn history(&self) -> &RoundHistory {
        self.resolver.history()
    }

    pub fn last_round(&self) -> Option<&RoundOutcome> {
        self.resolver.history().latest()
    }

    pub fn is_processing(&self) -> bool {
        self.resolver.is_processing()
    }

    pub fn is_round_locked(&self) -> bool {
        self.resolver.is_locked()
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    pub fn sampler_stats(&self) -> &SamplerStats {
        self.sampler.stats()
    }

    pub fn is_frame_in_flight(&self) -> bool {
        self.sampler.is_frame_in_flight()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::ingest::Capture;

    struct NeverReady;

    impl FrameSource for NeverReady {
        fn name(&self) -> &str {
            "never-ready"
        }

        fn is_ready(&self) -> bool {
            false
        }

        fn capture_still(&mut self) -> Capture {
            Capture::Ready(Ok(None))
        }
    }

    fn session(clock: &ManualClock) -> GameSession<NeverReady, ManualClock> {
        GameSession::new(NeverReady, clock.clone(), Some(5))
    }

    #[test]
    fn open_capture_schedules_immediate_tick() {
        let clock = ManualClock::new(0);
        let mut s = session(&clock);
        assert_eq!(s.next_wakeup(), None);
        s.open_capture().unwrap();
        assert!(s.is_capturing());
        assert_eq!(s.next_wakeup(), Some(0));
        assert_eq!(s.advance(), 1);
        assert_eq!(s.next_wakeup(), Some(400));
    }

    #[test]
    fn close_capture_cancels_pending_tick() {
        let clock = ManualClock::new(0);
        let mut s = session(&clock);
        s.open_capture().unwrap();
        s.advance();
        s.close_capture();
        assert_eq!(s.next_wakeup(), None);
        clock.set(10_000);
        assert_eq!(s.advance(), 0);
        assert_eq!(s.sampler_stats().ticks, 0);
    }

    #[test]
    fn commit_closes_capture_and_blocks_reopen_until_processed() {
        let clock = ManualClock::new(1_000);
        let mut s = session(&clock);
        s.open_capture().unwrap();

        assert!(s.on_detection(DetectionResult::new(Gesture::Rock, 0.9)).is_none());
        let outcome = s
            .on_detection(DetectionResult::new(Gesture::Rock, 0.9))
            .expect("round committed");
        assert_eq!(outcome.player_gesture, Gesture::Rock);
        assert_eq!(outcome.timestamp_ms, 1_000);
        assert!(!s.is_capturing());
        assert!(s.is_processing());
        assert!(s.open_capture().is_err());
        assert_eq!(s.live_detection(), DetectionResult::unknown());

        clock.set(1_400);
        s.advance();
        assert!(!s.is_processing());
        assert!(s.is_round_locked());
        s.open_capture().unwrap();

        clock.set(1_600);
        s.advance();
        assert!(!s.is_round_locked());
        assert_eq!(s.scoreboard().rounds(), 1);
    }

    #[test]
    fn events_arrive_in_order() {
        let clock = ManualClock::new(0);
        let mut s = session(&clock);
        s.open_capture().unwrap();
        let d = DetectionResult::new(Gesture::Paper, 0.7);
        s.on_detection(d);
        s.on_detection(d);
        let events = s.drain_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], SessionEvent::LiveDetection(d));
        assert_eq!(events[1], SessionEvent::LiveDetection(d));
        assert!(matches!(&events[2], SessionEvent::RoundCommitted(o) if o.player_gesture == Gesture::Paper));
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn closed_session_ignores_detections() {
        let clock = ManualClock::new(0);
        let mut s = session(&clock);
        let d = DetectionResult::new(Gesture::Rock, 0.9);
        assert!(s.on_detection(d).is_none());
        assert!(s.on_detection(d).is_none());
        assert!(s.history().is_empty());
        assert_eq!(s.streak(), DetectionStreak::empty());
        assert_eq!(s.live_detection(), DetectionResult::unknown());
        assert!(s.drain_events().is_empty());

        // Closing again after a round drops stragglers too.
        s.open_capture().unwrap();
        s.on_detection(d);
        s.on_detection(d).expect("round committed");
        s.drain_events();
        assert!(s.on_detection(d).is_none());
        assert!(s.drain_events().is_empty());
        assert_eq!(s.history().len(), 1);
    }
}
