//! Task/taskset factories (C10).
//!
//! `PeriodicTaskFactory`/`TasksetFactory` are grounded on
//! `original_source/simRT/generator/task_factory.py`'s
//! `AbstractTaskFactory.create_task` and
//! `original_source/simrt/generator/taskset_generator.py`'s
//! `TasksetFactory`. `TaskSubsetFactory` is grounded on the same file's
//! `TaskSubsetFactory._select_task`, a bisection over a sorted catalog
//! that picks whichever neighbor is nearest the remaining target
//! utilization — the Python original is missing an `elif` there and
//! silently falls through to the wrong branch on an exact catalog miss.
//! Reusing [`crate::utils::binary_search::binary_search_fn`] (an
//! exhaustive three-way match with no such gap) sidesteps the bug by
//! construction rather than reproducing it.

use crate::common::{RTBandwidth, Time};
use crate::error::EngineError;
use crate::generator::utilization::UtilizationAlgorithm;
use crate::platform::PlatformInfo;
use crate::task_model::{TaskInfo, TaskKind};
use crate::utils::binary_search::binary_search_fn;
use rand::Rng;

/// Builds a single periodic task from a target utilization, per
/// spec.md §4.8: the period is drawn uniformly from `period_bound`, the
/// wcet follows from `period * utilization`, and the deadline is either
/// the period itself (implicit-deadline) or a uniform draw in
/// `[ceil(wcet/fastest), ceil(period)]` guaranteeing the task is at
/// least feasible on the fastest core alone.
pub struct PeriodicTaskFactory {
    pub period_bound: (u64, u64),
    pub implicit_deadline: bool,
}

impl PeriodicTaskFactory {
    pub fn new(period_bound: (u64, u64), implicit_deadline: bool) -> Self {
        Self { period_bound, implicit_deadline }
    }

    pub fn create_task(
        &self,
        id: u64,
        utilization: RTBandwidth,
        platform: &PlatformInfo,
        rng: &mut impl Rng,
    ) -> Result<TaskInfo, EngineError> {
        let (lo, hi) = self.period_bound;
        if lo == 0 || lo > hi {
            return Err(EngineError::validation("period_bound must be a non-empty range of positive periods"));
        }

        let period = Time::from(rng.gen_range(lo..=hi));
        let wcet = Time::new(utilization * period.value());

        let deadline = if self.implicit_deadline {
            period
        } else {
            let feasible_lower = ((wcet.value() / platform.fastest()).ceil() as u64).max(1);
            let period_upper = period.ceil().max(feasible_lower);
            Time::from(rng.gen_range(feasible_lower..=period_upper))
        };

        TaskInfo::new(id, TaskKind::Periodic, wcet, deadline, period, platform)
    }
}

/// Builds a whole taskset of `n` periodic tasks whose utilizations are
/// drawn by `algorithm` to sum to a taskset utilization derived from a
/// normalized `system_utilization`, each wrapped into a task by a shared
/// [`PeriodicTaskFactory`].
pub struct TasksetFactory {
    pub period_bound: (u64, u64),
    pub implicit_deadline: bool,
    pub algorithm: UtilizationAlgorithm,
}

impl TasksetFactory {
    /// `system_utilization` must lie in `(0, 1]` (spec.md §7); `None`
    /// draws one uniformly from `(1e-10, 1]`, matching
    /// `original_source/simrt/generator/taskset_generator.py`'s
    /// `TasksetFactory.create_taskset`. The taskset-level target handed
    /// to `algorithm` is `system_utilization * platform.total_speed()`
    /// (`S_m` in spec notation), not `system_utilization` itself.
    pub fn create_taskset(
        &self,
        n: usize,
        system_utilization: Option<RTBandwidth>,
        platform: &PlatformInfo,
        rng: &mut impl Rng,
    ) -> Result<Vec<TaskInfo>, EngineError> {
        let system_utilization = match system_utilization {
            Some(u) if u > 0.0 && u <= 1.0 => u,
            Some(_) => return Err(EngineError::validation("system utilization must be in (0, 1]")),
            None => rng.gen_range(1e-10..=1.0),
        };

        let taskset_utilization = system_utilization * platform.total_speed();
        let utilizations = self.algorithm.generate(n, taskset_utilization, platform.fastest(), rng)?;
        let task_factory = PeriodicTaskFactory::new(self.period_bound, self.implicit_deadline);

        utilizations.into_iter()
            .enumerate()
            .map(|(id, utilization)| task_factory.create_task(id as u64, utilization, platform, rng))
            .collect()
    }
}

/// Greedily selects tasks out of a larger catalog, each chosen to be
/// nearest the utilization still needed to reach a target sum.
pub struct TaskSubsetFactory;

impl TaskSubsetFactory {
    /// `catalog` need not be sorted; the result is a subset (no
    /// duplicates, each drawn at most once) whose total utilization
    /// approaches `target_utilization` from the nearest available
    /// catalog entries.
    pub fn select_subset(catalog: &[TaskInfo], target_utilization: RTBandwidth) -> Vec<TaskInfo> {
        let mut pool: Vec<TaskInfo> = catalog.to_vec();
        pool.sort_by(|a, b| a.utilization().partial_cmp(&b.utilization()).expect("utilization is never NaN"));

        let mut selected = Vec::new();
        let mut remaining = target_utilization;

        while remaining > 0.0 && !pool.is_empty() {
            let index = Self::nearest_index(&pool, remaining);
            let task = pool.remove(index);
            remaining -= task.utilization();
            selected.push(task);
        }

        selected
    }

    fn nearest_index(pool: &[TaskInfo], target: RTBandwidth) -> usize {
        let (index, _) = binary_search_fn(
            (0, pool.len() - 1),
            |mid| (mid, pool[mid].utilization()),
            |&(_, utilization)| utilization.partial_cmp(&target).expect("utilization is never NaN"),
        );
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn periodic_task_factory_scales_wcet_by_utilization_with_implicit_deadline() {
        let platform = PlatformInfo::uniprocessor();
        let factory = PeriodicTaskFactory::new((20, 20), true);
        let mut rng = StdRng::seed_from_u64(0);
        let task = factory.create_task(0, 0.5, &platform, &mut rng).unwrap();
        assert_eq!(task.period.value(), 20.0);
        assert_eq!(task.wcet.value(), 10.0);
        assert_eq!(task.deadline, task.period);
    }

    #[test]
    fn constrained_deadline_task_stays_feasible_on_the_fastest_core() {
        let platform = PlatformInfo::uniprocessor();
        let factory = PeriodicTaskFactory::new((20, 20), false);
        let mut rng = StdRng::seed_from_u64(0);
        let task = factory.create_task(0, 0.5, &platform, &mut rng).unwrap();
        assert!(task.deadline.value() >= task.wcet.value() / platform.fastest());
        assert!(task.deadline <= task.period);
    }

    #[test]
    fn taskset_factory_produces_n_tasks_summing_to_system_utilization_times_total_speed() {
        let platform = PlatformInfo::new(vec![1.0, 1.0]).unwrap();
        let factory = TasksetFactory { period_bound: (100, 100), implicit_deadline: true, algorithm: UtilizationAlgorithm::UUniFast };
        let mut rng = StdRng::seed_from_u64(0);
        let taskset = factory.create_taskset(4, Some(0.5), &platform, &mut rng).unwrap();

        assert_eq!(taskset.len(), 4);
        let total: f64 = taskset.iter().map(TaskInfo::utilization).sum();
        assert!((total - 0.5 * platform.total_speed()).abs() < 1e-9);
    }

    #[test]
    fn taskset_factory_rejects_system_utilization_outside_unit_interval() {
        let platform = PlatformInfo::uniprocessor();
        let factory = TasksetFactory { period_bound: (100, 100), implicit_deadline: true, algorithm: UtilizationAlgorithm::UUniFast };
        let mut rng = StdRng::seed_from_u64(0);

        assert!(factory.create_taskset(4, Some(0.0), &platform, &mut rng).is_err());
        assert!(factory.create_taskset(4, Some(1.5), &platform, &mut rng).is_err());
        assert!(factory.create_taskset(4, Some(1.0), &platform, &mut rng).is_ok());
    }

    #[test]
    fn taskset_factory_without_a_system_utilization_draws_one_in_the_unit_interval() {
        let platform = PlatformInfo::new(vec![1.0, 1.0]).unwrap();
        let factory = TasksetFactory { period_bound: (100, 100), implicit_deadline: true, algorithm: UtilizationAlgorithm::UUniFast };
        let mut rng = StdRng::seed_from_u64(0);
        let taskset = factory.create_taskset(4, None, &platform, &mut rng).unwrap();

        let total: f64 = taskset.iter().map(TaskInfo::utilization).sum();
        assert!(total > 0.0 && total <= platform.total_speed());
    }

    #[test]
    fn subset_factory_picks_nearest_utilizations_without_duplicates() {
        let platform = PlatformInfo::uniprocessor();
        let catalog: Vec<TaskInfo> = [0.1, 0.2, 0.3, 0.4].iter().enumerate()
            .map(|(id, &u)| TaskInfo::new(id as u64, TaskKind::Periodic, Time::new(u * 10.0), Time::new(10.0), Time::new(10.0), &platform).unwrap())
            .collect();

        let subset = TaskSubsetFactory::select_subset(&catalog, 0.45);
        let ids: Vec<u64> = subset.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), ids.iter().collect::<std::collections::HashSet<_>>().len());
        assert!(!subset.is_empty());
    }
}
