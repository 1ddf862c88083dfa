//! End-to-end reproduction of spec.md §8 scenario 4 ("heterogeneous
//! preemption"): four processes request platform `[3, 2, 1]` at `t=0`
//! with priorities `1,2,1,0` and durations `10,20,10,30`. Drives the
//! event engine, the speed-ranked resource and the job lifecycle
//! together directly (no periodic task driver involved, since these
//! are one-shot requests rather than task releases), matching
//! `original_source/tests/test_processor.py`'s `test_ProcessorPlatform`
//! trace.

use simrt_engine::common::Time;
use simrt_engine::engine::{Engine, ProcessId};
use simrt_engine::platform::PlatformInfo;
use simrt_engine::resource::{Notification, ProcessorPlatform};
use simrt_engine::sim::job::Job;

const EPSILON: f64 = 1e-9;

fn reschedule(engine: &mut Engine<()>, job: &Job, process: ProcessId) {
    engine.interrupt(process);
    if let Some(completion) = job.time_to_completion() {
        let now = engine.now();
        engine.schedule(completion - now, process, ());
    }
}

fn apply_notifications(
    jobs: &mut [Job],
    engine: &mut Engine<()>,
    notifications: Vec<(ProcessId, Notification)>,
) {
    let now = engine.now();
    for (process, notification) in notifications {
        let job = &mut jobs[process.0 as usize];
        match notification {
            Notification::Granted { speed } | Notification::SpeedChanged { speed } => {
                job.on_speed_update(now, speed);
            }
            Notification::Preempted => job.on_preempted(now),
        }
        reschedule(engine, &jobs[process.0 as usize], process);
    }
}

#[test]
fn four_processes_complete_in_the_order_and_times_of_the_original_trace() {
    let platform = PlatformInfo::new(vec![3.0, 2.0, 1.0]).unwrap();
    let mut resource = ProcessorPlatform::new(platform);
    let mut engine: Engine<()> = Engine::new();

    // P0..P3, priorities 1,2,1,0, durations 10,20,10,30; a generous
    // absolute deadline since this scenario never checks for a miss.
    let priorities = [1.0, 2.0, 1.0, 0.0];
    let durations = [10.0, 20.0, 10.0, 30.0];
    let far_deadline = Time::new(1000.0);

    let mut jobs: Vec<Job> = (0..4)
        .map(|i| {
            let process = engine.new_process();
            assert_eq!(process.0, i as u64, "process ids are allocated in request order");
            Job::new(i as u64, 0, process, Time::zero(), far_deadline, Time::new(durations[i]))
        })
        .collect();

    // Issue all four requests at t=0, in process order: P0, P1, P2, P3.
    for i in 0..4 {
        let process = jobs[i].process;
        let notifications = resource.request(process, Time::new(priorities[i]), Time::zero(), true);
        apply_notifications(&mut jobs, &mut engine, notifications);
    }

    assert_eq!(resource.speed_of(ProcessId(3)), Some(3.0), "P3 (priority 0) holds the fastest core");
    assert_eq!(resource.speed_of(ProcessId(0)), Some(2.0), "P0 (priority 1, arrived first among ties) holds the second");
    assert_eq!(resource.speed_of(ProcessId(2)), Some(1.0), "P2 (priority 1, tied with P0) holds the slowest");
    assert_eq!(resource.speed_of(ProcessId(1)), None, "P1 (priority 2, weakest) is preempted/waiting");

    let mut completion_order = Vec::new();

    while let Some((process, ())) = engine.pop_next() {
        let now = engine.now();
        let i = process.0 as usize;
        if !jobs[i].is_active() {
            continue;
        }
        assert!(
            jobs[i].time_to_completion().is_some_and(|completion| (completion - now).value().abs() < EPSILON),
            "a fired completion check must land exactly at the job's own completion time"
        );

        jobs[i].complete(now);
        completion_order.push((i, now.value()));

        let notifications = resource.release(process);
        apply_notifications(&mut jobs, &mut engine, notifications);
    }

    assert_eq!(completion_order.len(), 4, "all four processes must complete");

    let expected: [(usize, f64); 4] = [(0, 5.0), (2, 7.5), (3, 10.0), (1, 10.0 + 12.5 / 3.0)];
    for ((actual_id, actual_time), (expected_id, expected_time)) in completion_order.iter().zip(expected.iter()) {
        assert_eq!(actual_id, expected_id, "completion order must match the original trace");
        assert!(
            (actual_time - expected_time).abs() < 1e-6,
            "P{actual_id} expected to complete at {expected_time}, got {actual_time}"
        );
    }
}
