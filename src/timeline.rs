//! Cooperative timer queue.
//!
//! The pipeline has no threads of its own. Every suspension point (sampler
//! reschedule, round-lock release, processing release) is an entry on a
//! `Timeline`, and the owner fires due entries in `(due, insertion)` order.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

/// Identifier of a scheduled entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Entry<E> {
    due_ms: u64,
    id: TimerId,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.id == other.id
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    // Reversed: BinaryHeap is a max-heap, we want the earliest entry on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.id.0.cmp(&self.id.0))
    }
}

/// Single-consumer timer queue.
pub struct Timeline<E> {
    queue: BinaryHeap<Entry<E>>,
    cancelled: HashSet<TimerId>,
    next_id: u64,
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
            next_id: 0,
        }
    }

    /// Schedule `event` to fire `delay` after `now_ms`.
    pub fn schedule(&mut self, now_ms: u64, delay: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.push(Entry {
            due_ms: now_ms.saturating_add(delay.as_millis() as u64),
            id,
            event,
        });
        id
    }

    /// Cancel a pending entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let pending = self
            .queue
            .iter()
            .any(|entry| entry.id == id && !self.cancelled.contains(&id));
        if pending {
            self.cancelled.insert(id);
        }
        pending
    }

    /// Due time of the earliest live entry.
    pub fn next_due(&mut self) -> Option<u64> {
        self.discard_cancelled();
        self.queue.peek().map(|entry| entry.due_ms)
    }

    /// Pop the earliest entry if it is due at `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerId, E)> {
        self.discard_cancelled();
        if self.queue.peek()?.due_ms > now_ms {
            return None;
        }
        self.queue.pop().map(|entry| (entry.id, entry.event))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.queue
            .iter()
            .filter(|entry| !self.cancelled.contains(&entry.id))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn discard_cancelled(&mut self) {
        while let Some(top) = self.queue.peek() {
            if self.cancelled.remove(&top.id) {
                self.queue.pop();
            } else {
                break;
            }
        }
    }
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for a self-rescheduling task on a `Timeline`.
///
/// A task holds at most one pending tick. Each tick computes its own next
/// delay and hands it back through `reschedule`; `cancel` drops the pending
/// tick so nothing fires after the task ends.
#[derive(Debug, Default)]
pub struct PeriodicTask {
    pending: Option<TimerId>,
    active: bool,
}

impl PeriodicTask {
    /// Start the task with its first tick due immediately.
    pub fn start<E>(timeline: &mut Timeline<E>, now_ms: u64, tick: E) -> Self {
        let id = timeline.schedule(now_ms, Duration::ZERO, tick);
        Self {
            pending: Some(id),
            active: true,
        }
    }

    /// Returns true if `id` is this task's pending tick, and marks it consumed.
    pub fn accept(&mut self, id: TimerId) -> bool {
        if self.active && self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Queue the next tick. Replaces any tick still pending.
    pub fn reschedule<E>(
        &mut self,
        timeline: &mut Timeline<E>,
        now_ms: u64,
        delay: Duration,
        tick: E,
    ) {
        if !self.active {
            return;
        }
        if let Some(old) = self.pending.take() {
            timeline.cancel(old);
        }
        self.pending = Some(timeline.schedule(now_ms, delay, tick));
    }

    pub fn cancel<E>(&mut self, timeline: &mut Timeline<E>) {
        if let Some(id) = self.pending.take() {
            timeline.cancel(id);
        }
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_then_insertion_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(0, Duration::from_millis(600), "lock");
        timeline.schedule(0, Duration::from_millis(400), "processing");
        timeline.schedule(0, Duration::from_millis(400), "tick");

        assert_eq!(timeline.pop_due(399), None);
        assert_eq!(timeline.pop_due(400).map(|(_, e)| e), Some("processing"));
        assert_eq!(timeline.pop_due(400).map(|(_, e)| e), Some("tick"));
        assert_eq!(timeline.pop_due(599), None);
        assert_eq!(timeline.next_due(), Some(600));
        assert_eq!(timeline.pop_due(1_000).map(|(_, e)| e), Some("lock"));
        assert!(timeline.is_empty());
    }

    #[test]
    fn cancelled_entries_never_fire() {
        let mut timeline = Timeline::new();
        let id = timeline.schedule(0, Duration::from_millis(10), 1);
        timeline.schedule(0, Duration::from_millis(20), 2);
        assert!(timeline.cancel(id));
        assert!(!timeline.cancel(id));
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.next_due(), Some(20));
        assert_eq!(timeline.pop_due(100).map(|(_, e)| e), Some(2));
        assert_eq!(timeline.pop_due(100), None);
    }

    #[test]
    fn periodic_task_keeps_single_pending_tick() {
        let mut timeline = Timeline::new();
        let mut task = PeriodicTask::start(&mut timeline, 0, ());
        task.reschedule(&mut timeline, 0, Duration::from_millis(200), ());
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.next_due(), Some(200));

        let (id, ()) = timeline.pop_due(200).unwrap();
        assert!(task.accept(id));
        assert!(!task.accept(id));
    }

    #[test]
    fn cancelled_task_leaves_no_orphan_tick() {
        let mut timeline = Timeline::new();
        let mut task = PeriodicTask::start(&mut timeline, 0, ());
        let (id, ()) = timeline.pop_due(0).unwrap();
        assert!(task.accept(id));
        task.reschedule(&mut timeline, 0, Duration::from_millis(1_100), ());

        task.cancel(&mut timeline);
        assert!(!task.is_active());
        assert!(timeline.is_empty());

        task.reschedule(&mut timeline, 0, Duration::from_millis(400), ());
        assert!(timeline.is_empty());
    }
}
