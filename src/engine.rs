//! Discrete-event engine (C3).
//!
//! A generic event queue ordered by `(time, insertion sequence)`, giving
//! deterministic FIFO tie-breaking between events scheduled for the same
//! instant. Owners of scheduled events are identified by a [`ProcessId`]
//! so a single pending event can be cancelled or synchronously
//! interrupted by its id rather than by re-deriving it from the queue.
//!
//! Grounded on the event-loop shape of `original_source/simRT/core/model.py`'s
//! `Simulator.run`, translated away from coroutine generators: a simpy
//! process suspends by `yield`ing and resumes in place when the engine
//! fires its event or raises an `Interrupt` into it. Rust has no stackful
//! coroutines to match that directly, so a pending event's payload is
//! handed back to the caller as a plain value, on a normal pop or on an
//! interrupt, rather than resuming a suspended call frame.

use crate::common::Time;
use std::collections::{BinaryHeap, HashMap};
use std::cmp::Reverse;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OrderKey {
    time: Time,
    seq: u64,
    event_id: u64,
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { Some(self.cmp(other)) }
}
impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.time, self.seq).cmp(&(other.time, other.seq))
    }
}

/// A generic, typed event queue. `E` is the event payload a particular
/// simulation dispatches on; the engine itself knows nothing about job
/// or task semantics.
pub struct Engine<E> {
    time: Time,
    next_seq: u64,
    next_event_id: u64,
    next_process_id: u64,
    queue: BinaryHeap<Reverse<OrderKey>>,
    entries: HashMap<u64, (ProcessId, E)>,
    pending_by_process: HashMap<u64, u64>,
}

impl<E> Default for Engine<E> {
    fn default() -> Self { Self::new() }
}

impl<E> Engine<E> {
    pub fn new() -> Self {
        Self {
            time: Time::zero(),
            next_seq: 0,
            next_event_id: 0,
            next_process_id: 0,
            queue: BinaryHeap::new(),
            entries: HashMap::new(),
            pending_by_process: HashMap::new(),
        }
    }

    pub fn now(&self) -> Time { self.time }

    pub fn new_process(&mut self) -> ProcessId {
        let id = self.next_process_id;
        self.next_process_id += 1;
        ProcessId(id)
    }

    /// Schedules `payload` to fire `delay` after the current time, owned
    /// by `process`. At most one pending event per process is tracked
    /// for cancellation/interruption purposes: scheduling a new one
    /// silently drops a still-pending earlier one for the same process,
    /// mirroring a job that can only be waiting on one thing at a time.
    pub fn schedule(&mut self, delay: Time, process: ProcessId, payload: E) -> EventId {
        if let Some(old) = self.pending_by_process.remove(&process.0) {
            self.entries.remove(&old);
        }

        let event_id = self.next_event_id;
        self.next_event_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        let time = self.time + delay;

        self.queue.push(Reverse(OrderKey { time, seq, event_id }));
        self.entries.insert(event_id, (process, payload));
        self.pending_by_process.insert(process.0, event_id);

        EventId(event_id)
    }

    /// Cancels a specific event by id, returning its payload if it was
    /// still pending.
    pub fn cancel(&mut self, event_id: EventId) -> Option<E> {
        let (process, payload) = self.entries.remove(&event_id.0)?;
        if self.pending_by_process.get(&process.0) == Some(&event_id.0) {
            self.pending_by_process.remove(&process.0);
        }
        Some(payload)
    }

    /// Synchronously interrupts `process`: cancels its one pending event
    /// and hands the payload back immediately, at the current virtual
    /// time, instead of at the time it was scheduled for.
    pub fn interrupt(&mut self, process: ProcessId) -> Option<E> {
        let event_id = self.pending_by_process.remove(&process.0)?;
        self.entries.remove(&event_id).map(|(_, payload)| payload)
    }

    pub fn has_pending(&self, process: ProcessId) -> bool {
        self.pending_by_process.contains_key(&process.0)
    }

    /// Drops heap slots at the top left stale by a cancellation or
    /// reschedule (their `event_id` no longer has a live entry), so a
    /// subsequent peek reflects the next event that would actually fire.
    fn discard_stale_top(&mut self) {
        while let Some(Reverse(key)) = self.queue.peek() {
            if self.entries.contains_key(&key.event_id) {
                break;
            }
            self.queue.pop();
        }
    }

    pub fn peek_next_time(&mut self) -> Option<Time> {
        self.discard_stale_top();
        self.queue.peek().map(|Reverse(key)| key.time)
    }

    /// Pops the next event, advancing virtual time to it, skipping over
    /// stale queue slots left behind by a cancellation or interrupt.
    /// Returns `None` once the queue is exhausted.
    pub fn pop_next(&mut self) -> Option<(ProcessId, E)> {
        loop {
            let Reverse(key) = self.queue.pop()?;
            let Some((process, payload)) = self.entries.remove(&key.event_id) else { continue };

            self.time = key.time;
            if self.pending_by_process.get(&process.0) == Some(&key.event_id) {
                self.pending_by_process.remove(&process.0);
            }
            return Some((process, payload));
        }
    }

    /// Pops the next event only if it is due at or before `until`,
    /// without consuming time past it. Used by a simulation run loop to
    /// stop draining the queue at a hard deadline (the hyper-period).
    /// Stale slots are discarded before the bound check, so a cancelled
    /// event sitting ahead of a live one past `until` can't make this
    /// return an event beyond the bound.
    pub fn pop_next_before(&mut self, until: Time) -> Option<(ProcessId, E)> {
        if self.peek_next_time()? > until {
            return None;
        }
        self.pop_next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_tie_break_on_equal_time() {
        let mut engine: Engine<u32> = Engine::new();
        let p0 = engine.new_process();
        let p1 = engine.new_process();
        engine.schedule(Time::new(5.0), p0, 100);
        engine.schedule(Time::new(5.0), p1, 200);

        assert_eq!(engine.pop_next(), Some((p0, 100)));
        assert_eq!(engine.pop_next(), Some((p1, 200)));
    }

    #[test]
    fn interrupt_preempts_pending_event() {
        let mut engine: Engine<&'static str> = Engine::new();
        let p0 = engine.new_process();
        engine.schedule(Time::new(10.0), p0, "timeout");

        assert_eq!(engine.interrupt(p0), Some("timeout"));
        assert!(!engine.has_pending(p0));
        assert_eq!(engine.pop_next(), None);
    }

    #[test]
    fn rescheduling_drops_previous_pending_event() {
        let mut engine: Engine<u32> = Engine::new();
        let p0 = engine.new_process();
        engine.schedule(Time::new(10.0), p0, 1);
        engine.schedule(Time::new(2.0), p0, 2);

        assert_eq!(engine.pop_next(), Some((p0, 2)));
        assert_eq!(engine.pop_next(), None);
    }

    /// Regression: a stale heap slot (left behind by a reschedule) sitting
    /// at the top with a time within the bound must not make
    /// `pop_next_before` return a live event that is actually past it.
    #[test]
    fn pop_next_before_does_not_cross_the_bound_because_of_a_stale_slot() {
        let mut engine: Engine<u32> = Engine::new();
        let p0 = engine.new_process();
        let p1 = engine.new_process();

        // Leaves a stale slot at t=3 in the heap once p0 is rescheduled.
        engine.schedule(Time::new(3.0), p0, 1);
        engine.schedule(Time::new(10.0), p1, 2);
        engine.schedule(Time::new(20.0), p0, 3);

        assert_eq!(engine.pop_next_before(Time::new(8.0)), None);
        assert_eq!(engine.now(), Time::zero(), "time must not advance past the bound");

        assert_eq!(engine.pop_next_before(Time::new(15.0)), Some((p1, 2)));
        assert_eq!(engine.now(), Time::new(10.0));
    }
}
