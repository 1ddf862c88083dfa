//! Custom Iterators for Time ranges, used by the demand-bound test's Δ
//! sampling (C8 §4.6: a stepped range over `[1, H]`).

use crate::prelude::*;

pub fn time_range_iterator(start: Time, end: Time) -> impl Iterator<Item = Time> {
    (start.value().ceil() as u64 ..= end.value().floor() as u64)
        .map(|step| Time::from(step))
}

pub fn time_range_iterator_w_step(start: Time, end: Time, step: Time) -> impl Iterator<Item = Time> {
    let step_size = step.value().max(1.0) as u64;

    (start.value().ceil() as u64 ..= end.value().floor() as u64)
        .step_by(step_size as usize)
        .map(|step| Time::from(step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_range_includes_endpoints() {
        let values: Vec<f64> = time_range_iterator_w_step(Time::new(1.0), Time::new(10.0), Time::new(3.0))
            .map(|t| t.value())
            .collect();
        assert_eq!(values, vec![1.0, 4.0, 7.0, 10.0]);
    }
}
