//! Heterogeneous G-EDF demand-bound sufficient test (C8).
//!
//! Grounded on `original_source/simrt/utils/schedulability_test.py`'s
//! `GlobalEDFTest._DBF`/`_LOAD` (implicit-deadline fast path plus a
//! sampled general case) and `original_source/simRT/utils/schedulability.py`'s
//! `Schedulability.DBF`/`LOAD`/`G_EDF_sufficient_test`: the classic
//! identical-speed bound `U <= m - (m-1)*u_max` generalizes to a
//! heterogeneous platform as `LOAD <= mu - nu*phi_max`, where `mu`
//! discounts the platform's total speed by the worst per-core speed
//! ratio (`lambda_pi`) and `nu` counts how many of the slowest cores a
//! busy period can't rely on at all.

use crate::common::{RTBandwidth, Time};
use crate::error::EngineError;
use crate::platform::PlatformInfo;
use crate::task_model::{TaskInfo, TaskSetUtils};
use crate::utils::time_iterators::time_range_iterator_w_step;

/// Demand placed by a single task within a window of length `delta`
/// starting at its first release. Before the first deadline a window
/// can catch at most the one job already released, so the demand is
/// just its `wcet`; from the first deadline on, each further `period`
/// adds one more full job.
pub fn demand_bound_function(task: &TaskInfo, delta: Time) -> Time {
    if delta < task.deadline {
        return task.wcet;
    }

    let jobs_in_window = ((delta - task.deadline).value() / task.period.value()).floor() + 1.0;
    task.wcet * jobs_in_window
}

/// Aggregate demand density of `taskset` over a window of length `delta`.
pub fn load(taskset: &[TaskInfo], delta: Time) -> RTBandwidth {
    if delta.value() <= 0.0 {
        return 0.0;
    }

    let demand: Time = taskset.iter().map(|task| demand_bound_function(task, delta)).sum();
    demand.value() / delta.value()
}

/// `lambda_pi`: the worst ratio, over every core but the slowest, of
/// the combined speed of all slower cores to that core's own speed.
/// Speeds are taken from `platform.speed_list()`, already sorted
/// non-increasing.
fn lambda_pi(speeds: &[f64]) -> RTBandwidth {
    (0..speeds.len() - 1)
        .map(|i| speeds[i + 1..].iter().sum::<f64>() / speeds[i])
        .fold(f64::MIN, f64::max)
}

/// `mu`: the platform's total speed discounted by the worst-case speed
/// ratio scaled by the heaviest task density.
fn mu(speeds: &[f64], phi_max: RTBandwidth) -> RTBandwidth {
    let s_m: f64 = speeds.iter().sum();
    s_m - lambda_pi(speeds) * phi_max
}

/// `nu`: the number of trailing (slowest) cores whose combined speed
/// falls short of `mu`, i.e. cores a busy-period argument can't count
/// on being available. `0` if every suffix sum already meets `mu`.
fn nu(speeds: &[f64], mu: RTBandwidth) -> usize {
    (0..speeds.len())
        .filter(|&i| speeds[i..].iter().sum::<f64>() < mu)
        .map(|i| i + 1)
        .max()
        .unwrap_or(0)
}

/// Samples `[1, hyperperiod]` at `ceil(hyperperiod * sampling_rate)`
/// steps (minimum 1) and returns the worst-case (maximum) `load`
/// observed, which is what the sufficient test compares against the
/// platform's capacity.
pub fn worst_case_load(taskset: &[TaskInfo], hyperperiod: Time, sampling_rate: Time) -> RTBandwidth {
    let step = Time::new((hyperperiod.value() * sampling_rate.value()).ceil().max(1.0));

    time_range_iterator_w_step(Time::new(1.0), hyperperiod, step)
        .map(|delta| load(taskset, delta))
        .fold(0.0, f64::max)
}

/// Sufficient (not necessary) schedulability test for global EDF on a
/// heterogeneous multiprocessor platform (spec.md §4.6). `true` means
/// the taskset is guaranteed schedulable; `false` means the test was
/// inconclusive, not that the taskset is unschedulable. Only defined
/// for `|speeds| >= 2`: on a single core the density bound collapses
/// and the source treats the call as a validation error rather than a
/// (vacuous) test.
pub fn global_edf_sufficient_test(
    taskset: &[TaskInfo],
    platform: &PlatformInfo,
    sampling_rate: Time,
) -> Result<bool, EngineError> {
    if !platform.is_multicore() {
        return Err(EngineError::validation(
            "the heterogeneous G-EDF sufficient test requires at least two cores",
        ));
    }

    let speeds = platform.speed_list();
    let phi_max = TaskSetUtils::largest_density(taskset);
    let mu = mu(speeds, phi_max);
    let nu = nu(speeds, mu);

    let worst_load = if TaskSetUtils::implicit_deadlines(taskset) {
        TaskSetUtils::total_utilization(taskset)
    } else {
        worst_case_load(taskset, TaskSetUtils::hyperperiod(taskset), sampling_rate)
    };

    Ok(mu - nu as f64 * phi_max >= worst_load)
}
