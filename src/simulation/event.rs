//! Events and the time-ordered event queue
//!
//! The queue is a binary min-heap keyed by fire time with a monotone
//! sequence number breaking ties, so events scheduled at the same
//! second fire in insertion order. A popped event that turns out to be
//! blocked goes back in with its original key and lands at exactly the
//! position it held.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::types::{EntryRoadId, ExitRoadId};

/// What a scheduled event does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A new vehicle tries to enter the entry road
    Input(EntryRoadId),
    /// The head vehicle of the entry road tries to cross the
    /// intersection into its destination road
    Change(EntryRoadId),
    /// The exit road drains its head vehicle out of the system
    Output(ExitRoadId),
    /// The signal controller advances to the next phase
    Signal,
}

/// An event with its place in simulated time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub fire_time_s: u64,
    /// Stamped once at scheduling; never reassigned, so re-inserting a
    /// blocked event restores its exact queue position
    pub seq: u64,
    pub event: Event,
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Order flipped on purpose to turn the max-heap into a
        // min-heap; seq keeps ties stable.
        other
            .fire_time_s
            .cmp(&self.fire_time_s)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Time-ordered queue of pending events
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<ScheduledEvent>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` at `fire_time_s`, stamping the next sequence
    /// number
    pub fn schedule(&mut self, fire_time_s: u64, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledEvent {
            fire_time_s,
            seq,
            event,
        });
    }

    /// Put a previously popped event back without restamping
    pub fn reinsert(&mut self, event: ScheduledEvent) {
        self.heap.push(event);
    }

    /// The earliest pending event
    pub fn peek(&self) -> Option<&ScheduledEvent> {
        self.heap.peek()
    }

    /// Remove and return the earliest pending event
    pub fn pop(&mut self) -> Option<ScheduledEvent> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_time_order() {
        let mut queue = EventQueue::new();
        queue.schedule(30, Event::Signal);
        queue.schedule(10, Event::Input(EntryRoadId(0)));
        queue.schedule(20, Event::Output(ExitRoadId(0)));

        let times: Vec<u64> = std::iter::from_fn(|| queue.pop().map(|e| e.fire_time_s)).collect();
        assert_eq!(times, vec![10, 20, 30]);
    }

    #[test]
    fn equal_times_fire_in_insertion_order() {
        let mut queue = EventQueue::new();
        queue.schedule(5, Event::Input(EntryRoadId(0)));
        queue.schedule(5, Event::Input(EntryRoadId(1)));
        queue.schedule(5, Event::Input(EntryRoadId(2)));

        for expected in 0..3 {
            assert_eq!(
                queue.pop().unwrap().event,
                Event::Input(EntryRoadId(expected))
            );
        }
    }

    #[test]
    fn reinsert_restores_position() {
        let mut queue = EventQueue::new();
        queue.schedule(5, Event::Input(EntryRoadId(0)));
        queue.schedule(5, Event::Input(EntryRoadId(1)));
        queue.schedule(7, Event::Signal);

        // Pop the head, pretend it blocked, put it back: it must come
        // out first again, ahead of its same-second sibling.
        let blocked = queue.pop().unwrap();
        assert_eq!(blocked.event, Event::Input(EntryRoadId(0)));
        queue.reinsert(blocked);

        assert_eq!(queue.pop().unwrap().event, Event::Input(EntryRoadId(0)));
        assert_eq!(queue.pop().unwrap().event, Event::Input(EntryRoadId(1)));
        assert_eq!(queue.pop().unwrap().event, Event::Signal);
    }

    #[test]
    fn later_scheduling_at_same_time_goes_last() {
        let mut queue = EventQueue::new();
        queue.schedule(9, Event::Signal);
        queue.schedule(3, Event::Input(EntryRoadId(0)));
        // Scheduled after the signal but due at the same second as it.
        queue.schedule(9, Event::Change(EntryRoadId(0)));

        assert_eq!(queue.pop().unwrap().event, Event::Input(EntryRoadId(0)));
        assert_eq!(queue.pop().unwrap().event, Event::Signal);
        assert_eq!(queue.pop().unwrap().event, Event::Change(EntryRoadId(0)));
        assert!(queue.is_empty());
    }
}
