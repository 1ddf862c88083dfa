//! Task model (C2): an immutable periodic task descriptor and the
//! taskset-level quantities derived from it.
//!
//! Grounded on the teacher's `common.rs` (`RTTask`/`RTUtils`), adapted
//! from a single implicit task class to the spec's extensible
//! `TaskInfo{id, type, wcet, deadline, period}` with a `TaskKind` tag
//! open for extension (`original_source/simRT/core/task.py`'s
//! `GenericTask`/`PeriodicTask` split).

use crate::prelude::*;
use crate::error::EngineError;
use crate::platform::PlatformInfo;

pub mod prelude {
    pub use super::{TaskInfo, TaskKind, TaskSetUtils};
}

/// Tag distinguishing a task's release/execution model. Only
/// `Periodic` is implemented; the type is a sum-type kept open for
/// extension per spec.md §3, mirroring `GenericTask`'s subclassing in
/// the Python original.
#[derive(Clone, Copy, Debug)]
#[derive(PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum TaskKind {
    Periodic,
}

/// A periodic task descriptor. Value type: hashable, totally ordered by
/// `id`, immutable once constructed.
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct TaskInfo {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub wcet: Time,
    pub deadline: Time,
    pub period: Time,
}

impl TaskInfo {
    /// Validates and builds a `TaskInfo`. Rejects a non-positive
    /// `wcet`/`deadline`/`period`, a `deadline` outside `(0, period]`,
    /// and a `wcet` that couldn't meet its `deadline` even on the
    /// fastest core of `platform` (trivially infeasible, spec.md §3).
    pub fn new(
        id: u64,
        kind: TaskKind,
        wcet: Time,
        deadline: Time,
        period: Time,
        platform: &PlatformInfo,
    ) -> Result<Self, EngineError> {
        if !(wcet.value() > 0.0) {
            return Err(EngineError::validation("task wcet must be > 0"));
        }
        if !(period.value() > 0.0) {
            return Err(EngineError::validation("task period must be > 0"));
        }
        if !(deadline.value() > 0.0) || deadline > period {
            return Err(EngineError::validation("task deadline must be in (0, period]"));
        }
        if wcet.value() > platform.fastest() * deadline.value() {
            return Err(EngineError::validation(
                "task wcet exceeds what the fastest core could execute by its deadline",
            ));
        }

        Ok(Self { id, kind, wcet, deadline, period })
    }

    pub fn utilization(&self) -> RTBandwidth {
        self.wcet.value() / self.period.value()
    }

    pub fn density(&self) -> RTBandwidth {
        self.wcet.value() / self.deadline.value()
    }

    pub fn has_implicit_deadline(&self) -> bool {
        self.deadline == self.period
    }
}

impl PartialEq for TaskInfo {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}
impl Eq for TaskInfo {}

impl PartialOrd for TaskInfo {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for TaskInfo {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
impl std::hash::Hash for TaskInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Taskset-level derived quantities, ported from the teacher's
/// `RTUtils`.
pub struct TaskSetUtils;

impl TaskSetUtils {
    pub fn implicit_deadlines(taskset: &[TaskInfo]) -> bool {
        taskset.iter().all(TaskInfo::has_implicit_deadline)
    }

    pub fn total_utilization(taskset: &[TaskInfo]) -> RTBandwidth {
        taskset.iter().map(TaskInfo::utilization).sum()
    }

    pub fn largest_density(taskset: &[TaskInfo]) -> RTBandwidth {
        taskset.iter()
            .map(|task| ordered_float::OrderedFloat(task.density()))
            .max()
            .map(|max| max.0)
            .unwrap_or(0.0)
    }

    /// `lcm` of `ceil(period)` over the taskset: the exact point at
    /// which a periodic schedule under G-EDF repeats.
    pub fn hyperperiod(taskset: &[TaskInfo]) -> Time {
        let hyperperiod = taskset.iter()
            .map(|task| task.period.ceil())
            .fold(1u64, num::integer::lcm);

        Time::from(hyperperiod)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> PlatformInfo {
        PlatformInfo::new(vec![1.0]).unwrap()
    }

    #[test]
    fn derived_quantities() {
        let task = TaskInfo::new(2, TaskKind::Periodic, Time::new(10.0), Time::new(15.0), Time::new(20.0), &platform()).unwrap();
        assert_eq!(task.utilization(), 10.0 / 20.0);
        assert_eq!(task.density(), 10.0 / 15.0);
        assert!(!task.has_implicit_deadline());
    }

    #[test]
    fn rejects_infeasible_wcet() {
        let slow = PlatformInfo::new(vec![0.5]).unwrap();
        let err = TaskInfo::new(0, TaskKind::Periodic, Time::new(10.0), Time::new(10.0), Time::new(10.0), &slow);
        assert!(err.is_err());
    }

    #[test]
    fn hyperperiod_is_lcm_of_ceiled_periods() {
        let taskset = vec![
            TaskInfo::new(0, TaskKind::Periodic, Time::new(25.0), Time::new(50.0), Time::new(50.0), &platform()).unwrap(),
            TaskInfo::new(1, TaskKind::Periodic, Time::new(30.0), Time::new(75.0), Time::new(75.0), &platform()).unwrap(),
        ];

        assert_eq!(TaskSetUtils::hyperperiod(&taskset).value(), 150.0);
    }
}
