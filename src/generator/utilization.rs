//! Utilization-vector generators (C9).
//!
//! Grounded on `original_source/simRT/generator/task_factory.py`'s
//! `UtilizationGenerationAlgorithm` (`UUniFast`, `UScaling`, `UFitting`,
//! `generate_uniform_utilizations`), each wrapped in a `while True`
//! rejection loop there that redraws whenever a generated utilization
//! exceeds the fastest core's speed. Here that loop is a bounded retry
//! rather than an unbounded one, surfacing a configuration error if a
//! `u_max` too small for `n`/`total_utilization` makes every draw
//! rejected.

use crate::common::RTBandwidth;
use crate::error::EngineError;
use rand::Rng;

const MAX_ATTEMPTS: u32 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum UtilizationAlgorithm {
    UUniFast,
    UScaling,
    UFitting,
    /// `generate_uniform_utilizations`: `n` independent `Uniform(0, u_max)`
    /// draws with no target sum, used to seed `TaskSubsetFactory`'s
    /// catalog rather than to hit a requested system utilization.
    Uniform,
}

impl UtilizationAlgorithm {
    /// Generates `n` per-task utilizations, none exceeding `u_max` (the
    /// fastest core's speed: no single task could ever be schedulable
    /// above it). Every variant but [`Self::Uniform`] additionally sums
    /// to `total_utilization`; `Uniform` draws each task independently
    /// and ignores `total_utilization` entirely.
    pub fn generate(
        &self,
        n: usize,
        total_utilization: RTBandwidth,
        u_max: RTBandwidth,
        rng: &mut impl Rng,
    ) -> Result<Vec<RTBandwidth>, EngineError> {
        if n == 0 {
            return Err(EngineError::validation("cannot generate utilizations for zero tasks"));
        }
        if u_max <= 0.0 {
            return Err(EngineError::validation("u_max must be > 0"));
        }

        if matches!(self, Self::Uniform) {
            return Ok((0..n).map(|_| rng.gen_range(0.0..u_max)).collect());
        }

        if total_utilization <= 0.0 {
            return Err(EngineError::validation("total utilization must be > 0"));
        }
        if total_utilization > n as f64 * u_max {
            return Err(EngineError::validation(
                "target utilization is unreachable with this many tasks and this u_max",
            ));
        }

        for _ in 0..MAX_ATTEMPTS {
            let candidate = match self {
                Self::UUniFast => Self::uunifast(n, total_utilization, rng),
                Self::UScaling => Self::uscaling(n, total_utilization, rng),
                Self::UFitting => Self::ufitting(n, total_utilization, u_max, rng),
                Self::Uniform => unreachable!("returned above"),
            };

            if candidate.iter().all(|&u| u > 0.0 && u <= u_max) {
                return Ok(candidate);
            }
        }

        Err(EngineError::validation(
            "failed to draw a utilization vector respecting u_max after repeated sampling",
        ))
    }

    /// Bini & Buttazzo's UUniFast: repeatedly peels a random fraction
    /// off the remaining budget so the per-task shares are unbiased
    /// across the simplex, rather than uniform-then-normalized.
    fn uunifast(n: usize, total: RTBandwidth, rng: &mut impl Rng) -> Vec<RTBandwidth> {
        let mut utilizations = Vec::with_capacity(n);
        let mut sum_u = total;

        for i in 1..n {
            let next = sum_u * rng.gen::<f64>().powf(1.0 / (n - i) as f64);
            utilizations.push(sum_u - next);
            sum_u = next;
        }
        utilizations.push(sum_u);
        utilizations
    }

    /// Draws `n` uniform values and scales them to sum to `total`.
    fn uscaling(n: usize, total: RTBandwidth, rng: &mut impl Rng) -> Vec<RTBandwidth> {
        let raw: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
        let sum: f64 = raw.iter().sum();
        raw.into_iter().map(|u| u / sum * total).collect()
    }

    /// Fits each task's utilization to the remaining budget in turn,
    /// clamped to `u_max`, leaving the last task to absorb whatever
    /// remains (itself still subject to the caller's `u_max` check).
    fn ufitting(n: usize, total: RTBandwidth, u_max: RTBandwidth, rng: &mut impl Rng) -> Vec<RTBandwidth> {
        let mut utilizations = Vec::with_capacity(n);
        let mut remaining = total;

        for i in 0..n {
            let tasks_left = (n - i) as f64;
            if i == n - 1 {
                utilizations.push(remaining);
            } else {
                let upper = u_max.min(remaining - (tasks_left - 1.0) * 1e-6);
                let share = rng.gen_range(1e-6..upper.max(1e-6));
                utilizations.push(share);
                remaining -= share;
            }
        }
        utilizations
    }
}
