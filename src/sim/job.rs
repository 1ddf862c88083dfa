//! Job lifecycle (C5).
//!
//! Grounded on `original_source/simRT/core/job.py`'s `Job(simpy.Process)`:
//! a job alternates between running on a core at some speed and waiting
//! (released but not yet granted, or preempted), consuming `remaining`
//! at the rate of its current speed, until it either reaches zero
//! (completion) or its absolute deadline passes first (a miss). Here
//! the request/execute/preempt/resume generator loop becomes a plain
//! state machine driven by [`crate::sim::simulator::Simulator`] instead
//! of a coroutine, since notifications arrive from
//! [`crate::resource::ProcessorPlatform`] as synchronous return values.

use crate::common::Time;
use crate::engine::ProcessId;
use crate::platform::Speed;

/// Float noise tolerance below which remaining execution counts as
/// fully consumed. Needed because `remaining -= elapsed * speed`
/// accumulates the usual floating-point rounding over many segments.
pub const EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExecutionSpan {
    pub start: Time,
    pub end: Time,
    pub speed: Speed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum RunState {
    Waiting,
    Running { since: Time, speed: Speed },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JobOutcome {
    Completed,
    DeadlineMissed,
}

#[derive(Clone, Debug)]
pub struct Job {
    pub id: u64,
    pub task_id: u64,
    pub process: ProcessId,
    pub release_time: Time,
    pub absolute_deadline: Time,
    remaining: Time,
    run_state: RunState,
    pub execution_log: Vec<ExecutionSpan>,
    pub outcome: Option<JobOutcome>,
}

impl Job {
    pub fn new(id: u64, task_id: u64, process: ProcessId, release_time: Time, absolute_deadline: Time, wcet: Time) -> Self {
        Self {
            id,
            task_id,
            process,
            release_time,
            absolute_deadline,
            remaining: wcet,
            run_state: RunState::Waiting,
            execution_log: Vec::new(),
            outcome: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.outcome.is_none()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.run_state, RunState::Running { .. })
    }

    pub fn remaining_execution(&self) -> Time {
        self.remaining
    }

    fn close_running_span(&mut self, now: Time) {
        if let RunState::Running { since, speed } = self.run_state {
            let elapsed = (now - since).value();
            self.remaining = Time::new((self.remaining.value() - elapsed * speed).max(0.0));
            self.execution_log.push(ExecutionSpan { start: since, end: now, speed });
        }
    }

    /// Called when this job is newly granted a core, or keeps a core
    /// but at a different rank/speed. Either way the previous segment
    /// (if any) closes and a new one opens at `now`.
    pub fn on_speed_update(&mut self, now: Time, speed: Speed) {
        self.close_running_span(now);
        self.run_state = RunState::Running { since: now, speed };
    }

    /// Called when this job is ranked out of the platform's capacity.
    pub fn on_preempted(&mut self, now: Time) {
        self.close_running_span(now);
        self.run_state = RunState::Waiting;
    }

    /// Wall-clock time at which this job would finish if its current
    /// speed never changed again. `None` while waiting.
    pub fn time_to_completion(&self) -> Option<Time> {
        match self.run_state {
            RunState::Running { since, speed } if self.remaining.value() > EPSILON => {
                Some(since + self.remaining / speed)
            }
            RunState::Running { since, .. } => Some(since),
            RunState::Waiting => None,
        }
    }

    pub fn complete(&mut self, now: Time) {
        self.close_running_span(now);
        self.outcome = Some(JobOutcome::Completed);
    }

    pub fn mark_deadline_missed(&mut self, now: Time) {
        self.close_running_span(now);
        self.outcome = Some(JobOutcome::DeadlineMissed);
    }
}
