//! Preemptive speed-ranked resource (C4): a platform shared by competing
//! requests, where the `i`-th most urgent request is always running on
//! the `i`-th fastest free core.
//!
//! Grounded on `original_source/simRT/core/processor.py`'s
//! `ProcessorPlatform(simpy.Resource)`, whose `_do_put`/`_do_get`
//! re-sort the combined holder/waiter list by `(priority, arrival_time,
//! ¬preemptible)` and reassign cores by rank on every change. Here the
//! resort is a plain method returning the notifications a caller needs
//! to act on, rather than firing simpy events internally — the engine
//! and resource stay decoupled.

use crate::engine::ProcessId;
use crate::common::Time;
use crate::platform::{PlatformInfo, Speed};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Notification {
    /// Newly ranked within the platform's capacity; now runs at `speed`.
    Granted { speed: Speed },
    /// Still within capacity but now runs at a different core's speed.
    SpeedChanged { speed: Speed },
    /// Ranked outside the platform's capacity; no longer running.
    Preempted,
}

#[derive(Clone, Debug)]
struct ProcessorRequest {
    process: ProcessId,
    priority: Time,
    arrival_time: Time,
    preemptible: bool,
}

impl ProcessorRequest {
    /// `¬preempt` is the third key component (spec.md §3, §4.2): a
    /// preemptible arrival (`preemptible = true`) sorts *before* a
    /// non-preemptible one at an otherwise exact tie, so it is the one
    /// allowed to displace an equal-priority, equal-arrival holder.
    fn key(&self) -> (Time, Time, bool) {
        (self.priority, self.arrival_time, !self.preemptible)
    }
}

/// I1: `requests` is sorted by key immediately after every mutation.
/// I2: exactly `min(capacity, requests.len())` leading requests hold a
/// core; the rest wait.
/// I3: a request's rank changes iff it receives exactly one
/// notification from the mutation that caused the change.
/// I4: the sort key is a total order (`Time` and `bool` both are), so
/// the ranking is deterministic regardless of request insertion order.
pub struct ProcessorPlatform {
    platform: PlatformInfo,
    requests: Vec<ProcessorRequest>,
}

impl ProcessorPlatform {
    pub fn new(platform: PlatformInfo) -> Self {
        Self { platform, requests: Vec::new() }
    }

    pub fn platform(&self) -> &PlatformInfo { &self.platform }

    fn capacity(&self) -> usize { self.platform.capacity() }

    /// Adds a new request to the platform and re-ranks. The most urgent
    /// (smallest `priority`) requests win ties by earlier `arrival_time`,
    /// then by non-preemptible requests winning over preemptible ones.
    pub fn request(
        &mut self,
        process: ProcessId,
        priority: Time,
        arrival_time: Time,
        preemptible: bool,
    ) -> Vec<(ProcessId, Notification)> {
        let previous_ranks = self.current_ranks();
        self.requests.push(ProcessorRequest { process, priority, arrival_time, preemptible });
        self.resort(previous_ranks)
    }

    /// Removes `process`'s request (it finished its pending execution
    /// chunk, or abandoned the wait) and re-ranks the remainder.
    pub fn release(&mut self, process: ProcessId) -> Vec<(ProcessId, Notification)> {
        let previous_ranks = self.current_ranks();
        self.requests.retain(|r| r.process != process);
        self.resort(previous_ranks)
    }

    /// Snapshots which process held which rank *before* the pending
    /// mutation (a push or a retain). Must be taken before `requests` is
    /// touched: `retain` shifts every later index down by one per
    /// removed element, so computing this after the mutation would
    /// misattribute a promoted waiter's new index as a rank it already
    /// held, silently swallowing its `Granted` notification.
    fn current_ranks(&self) -> std::collections::HashMap<u64, usize> {
        let capacity = self.capacity();
        self.requests.iter()
            .enumerate()
            .filter(|(rank, _)| *rank < capacity)
            .map(|(rank, r)| (r.process.0, rank))
            .collect()
    }

    pub fn rank_of(&self, process: ProcessId) -> Option<usize> {
        self.requests.iter().position(|r| r.process == process)
    }

    pub fn speed_of(&self, process: ProcessId) -> Option<Speed> {
        let rank = self.rank_of(process)?;
        (rank < self.capacity()).then(|| self.platform.speed_list()[rank])
    }

    pub fn holders(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.requests.iter().take(self.capacity()).map(|r| r.process)
    }

    pub fn waiters(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.requests.iter().skip(self.capacity()).map(|r| r.process)
    }

    fn resort(&mut self, previous_ranks: std::collections::HashMap<u64, usize>) -> Vec<(ProcessId, Notification)> {
        let capacity = self.capacity();
        self.requests.sort_by(|a, b| a.key().cmp(&b.key()));

        let mut notifications = Vec::new();
        for (rank, req) in self.requests.iter().enumerate() {
            if rank < capacity {
                let speed = self.platform.speed_list()[rank];
                match previous_ranks.get(&req.process.0) {
                    Some(&old_rank) if old_rank == rank => {}
                    Some(_) => notifications.push((req.process, Notification::SpeedChanged { speed })),
                    None => notifications.push((req.process, Notification::Granted { speed })),
                }
            } else if previous_ranks.contains_key(&req.process.0) {
                notifications.push((req.process, Notification::Preempted));
            }
        }
        notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u64) -> ProcessId { ProcessId(n) }

    #[test]
    fn lower_priority_value_wins_faster_core() {
        let mut platform = ProcessorPlatform::new(PlatformInfo::new(vec![3.0, 2.0, 1.0]).unwrap());

        let n1 = platform.request(pid(0), Time::new(1.0), Time::zero(), true);
        assert_eq!(n1, vec![(pid(0), Notification::Granted { speed: 3.0 })]);

        let n2 = platform.request(pid(1), Time::new(2.0), Time::zero(), true);
        assert_eq!(n2, vec![(pid(1), Notification::Granted { speed: 2.0 })]);

        assert_eq!(platform.speed_of(pid(0)), Some(3.0));
        assert_eq!(platform.speed_of(pid(1)), Some(2.0));
    }

    #[test]
    fn higher_priority_arrival_preempts_lowest_ranked_holder() {
        let mut platform = ProcessorPlatform::new(PlatformInfo::new(vec![1.0]).unwrap());
        platform.request(pid(0), Time::new(5.0), Time::zero(), true);

        let notifications = platform.request(pid(1), Time::new(1.0), Time::new(1.0), true);
        assert!(notifications.contains(&(pid(0), Notification::Preempted)));
        assert!(notifications.contains(&(pid(1), Notification::Granted { speed: 1.0 })));
        assert_eq!(platform.rank_of(pid(0)), Some(1));
    }

    #[test]
    fn release_promotes_a_waiter() {
        let mut platform = ProcessorPlatform::new(PlatformInfo::new(vec![1.0]).unwrap());
        platform.request(pid(0), Time::new(1.0), Time::zero(), true);
        platform.request(pid(1), Time::new(2.0), Time::new(1.0), true);

        let notifications = platform.release(pid(0));
        assert_eq!(notifications, vec![(pid(1), Notification::Granted { speed: 1.0 })]);
    }

    #[test]
    fn preemptible_wins_tie_over_non_preemptible() {
        let mut platform = ProcessorPlatform::new(PlatformInfo::new(vec![1.0]).unwrap());
        platform.request(pid(0), Time::new(1.0), Time::zero(), true);
        let notifications = platform.request(pid(1), Time::new(1.0), Time::zero(), false);

        // pid1 ties pid0 on priority and arrival but arrives with
        // preempt=false, so it queues behind instead of displacing.
        assert!(notifications.is_empty());
        assert_eq!(platform.rank_of(pid(0)), Some(0));
        assert_eq!(platform.rank_of(pid(1)), Some(1));
    }

    #[test]
    fn release_notifies_a_waiter_whose_post_removal_index_coincides_with_its_new_rank() {
        // Regression for a bug where `previous_ranks` was computed after
        // `retain` already shifted indices. Releasing the *lowest*-ranked
        // holder (rank 2) leaves pid0/pid1 at their ranks untouched, so
        // the only real change is pid3's promotion from waiting (index 3)
        // into the freed rank 2 slot — exactly the index retain's removal
        // shifts it to, which the buggy computation misread as "already
        // held rank 2" and so dropped the `Granted` notification entirely.
        let mut platform = ProcessorPlatform::new(PlatformInfo::new(vec![3.0, 2.0, 1.0]).unwrap());
        platform.request(pid(0), Time::new(0.0), Time::zero(), true);
        platform.request(pid(1), Time::new(1.0), Time::zero(), true);
        platform.request(pid(2), Time::new(2.0), Time::zero(), true);
        let notifications = platform.request(pid(3), Time::new(3.0), Time::zero(), true);
        assert!(notifications.is_empty(), "pid3 only waits, nobody else's rank changes");
        assert_eq!(platform.rank_of(pid(3)), Some(3));

        let notifications = platform.release(pid(2));
        assert_eq!(notifications, vec![(pid(3), Notification::Granted { speed: 1.0 })]);
        assert_eq!(platform.rank_of(pid(3)), Some(2));
        assert_eq!(platform.rank_of(pid(0)), Some(0));
        assert_eq!(platform.rank_of(pid(1)), Some(1));
    }

    #[test]
    fn non_preemptible_new_arrival_does_not_displace_a_tied_holder() {
        let mut platform = ProcessorPlatform::new(PlatformInfo::new(vec![1.0]).unwrap());
        platform.request(pid(0), Time::new(1.0), Time::zero(), false);
        let notifications = platform.request(pid(1), Time::new(1.0), Time::zero(), true);

        // pid1 arrives preemptible, so on an exact tie it wins the slot
        // instead of pid0, which queues behind despite arriving first.
        assert!(notifications.contains(&(pid(0), Notification::Preempted)));
        assert!(notifications.contains(&(pid(1), Notification::Granted { speed: 1.0 })));
        assert_eq!(platform.rank_of(pid(1)), Some(0));
    }
}
