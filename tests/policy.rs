//! Policy behaviors: quantum splitting, alternation, hot swapping.

use schedsim::{Burst, BurstKind, CoreId, Engine, Pid, Policy, Process, ProcessId};

mod common;

fn cpu(duration: u64) -> Burst {
    Burst {
        kind: BurstKind::Cpu,
        duration,
        resource_usage: 1.0,
    }
}

/// Running-slot occupant of core 0 after each step, until completion.
fn occupancy(engine: &mut Engine) -> Vec<Option<ProcessId>> {
    let mut samples = Vec::new();
    while !engine.complete() {
        engine.step();
        samples.push(engine.core(CoreId(0)).running());
        assert!(samples.len() < 10_000, "simulation did not terminate");
    }
    samples
}

/// Longest run of consecutive samples holding the same process.
fn longest_stretch(samples: &[Option<ProcessId>]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;
    for &sample in samples {
        if sample.is_some() && sample == previous {
            current += 1;
        } else {
            current = usize::from(sample.is_some());
        }
        previous = sample;
        longest = longest.max(current);
    }
    longest
}

/// A 7-tick burst under quantum 3 is consumed as slices of 3, 3, and 1.
#[test]
fn round_robin_splits_a_long_burst_into_quantum_slices() {
    common::setup();
    let mut engine = Engine::with_cores(Policy::RoundRobin { quantum: 3 }, 1);
    let id = engine.emplace_process(Process::new("C", Pid(1), 0, vec![cpu(7)]));

    let samples = occupancy(&mut engine);
    // All 7 CPU ticks delivered; one extra tick for the admission schedule.
    assert_eq!(engine.timer(), 8);
    assert_eq!(engine.finished(), &[id]);
    assert_eq!(engine.process(id).finish_time(), Some(7));
    // The slot never goes idle while work remains.
    assert!(samples[..samples.len() - 1].iter().all(|s| s.is_some()));
}

/// Two equal runners under Round Robin alternate every quantum; neither
/// holds the core for more than `q` consecutive ticks.
#[test]
fn round_robin_alternates_between_equal_runners() {
    common::setup();
    let mut engine = Engine::with_cores(Policy::RoundRobin { quantum: 3 }, 1);
    let a = engine.emplace_process(Process::new("A", Pid(1), 0, vec![cpu(7)]));
    let b = engine.emplace_process(Process::new("B", Pid(2), 0, vec![cpu(7)]));

    let samples = occupancy(&mut engine);
    assert_eq!(engine.timer(), 15); // 14 CPU ticks + the admission tick
    assert!(longest_stretch(&samples) <= 3);

    // Both ran, interleaved: first slice is A's, second is B's.
    assert_eq!(samples[0], Some(a));
    assert!(samples.contains(&Some(b)));
    assert_eq!(engine.finished(), &[a, b]);
}

/// FCFS never splits: the first arrival keeps the core until its whole
/// burst drains.
#[test]
fn fcfs_runs_each_process_to_burst_completion() {
    common::setup();
    let mut engine = Engine::with_cores(Policy::Fcfs, 1);
    let a = engine.emplace_process(Process::new("A", Pid(1), 0, vec![cpu(7)]));
    let b = engine.emplace_process(Process::new("B", Pid(2), 0, vec![cpu(7)]));

    let samples = occupancy(&mut engine);
    assert_eq!(engine.timer(), 15);
    assert_eq!(longest_stretch(&samples), 7);
    assert_eq!(engine.finished(), &[a, b]);
    assert_eq!(engine.process(a).finish_time(), Some(7));
    assert_eq!(engine.process(b).finish_time(), Some(14));
}

/// Quantum exactly equal to the burst length does not split.
#[test]
fn quantum_equal_to_burst_is_not_split() {
    common::setup();
    let mut engine = Engine::with_cores(Policy::RoundRobin { quantum: 5 }, 1);
    let id = engine.emplace_process(Process::new("A", Pid(1), 0, vec![cpu(5)]));

    run(&mut engine);
    assert_eq!(engine.timer(), 6);
    assert_eq!(engine.process(id).finish_time(), Some(5));
}

/// Re-installing the current policy is a no-op.
#[test]
fn switching_to_the_same_policy_changes_nothing() {
    common::setup();
    let mut engine = Engine::with_cores(Policy::RoundRobin { quantum: 4 }, 2);
    engine.emplace_process(Process::new("A", Pid(1), 0, vec![cpu(9)]));
    engine.step();

    let before_running = engine.core(CoreId(0)).running();
    let before_ready: Vec<_> = engine.core(CoreId(0)).ready().collect();

    engine.switch_policy(Policy::RoundRobin { quantum: 4 });
    engine.switch_policy(Policy::RoundRobin { quantum: 4 });

    assert_eq!(engine.policy(), Policy::RoundRobin { quantum: 4 });
    assert_eq!(engine.core(CoreId(0)).running(), before_running);
    assert_eq!(engine.core(CoreId(0)).ready().collect::<Vec<_>>(), before_ready);
}

/// Switching policies mid-run neither reshuffles queues nor loses work: a
/// single busy core still takes total-work + 1 ticks.
#[test]
fn hot_swap_preserves_queues_and_work() {
    common::setup();
    let mut engine = Engine::with_cores(Policy::Fcfs, 1);
    let a = engine.emplace_process(Process::new("A", Pid(1), 0, vec![cpu(10)]));
    let b = engine.emplace_process(Process::new("B", Pid(2), 0, vec![cpu(10)]));

    engine.step();
    engine.step();
    let ready_before: Vec<_> = engine.core(CoreId(0)).ready().collect();
    engine.switch_policy(Policy::RoundRobin { quantum: 2 });
    assert_eq!(
        engine.core(CoreId(0)).ready().collect::<Vec<_>>(),
        ready_before
    );

    run(&mut engine);
    assert_eq!(engine.timer(), 21); // 20 CPU ticks + the admission tick
    assert_eq!(engine.finished().len(), 2);
    let total: u64 = [a, b]
        .iter()
        .map(|&id| engine.process(id).turnaround_time().unwrap())
        .sum();
    assert!(total >= 20);
}

fn run(engine: &mut Engine) {
    let mut steps = 0;
    while !engine.complete() {
        engine.step();
        steps += 1;
        assert!(steps < 10_000, "simulation did not terminate");
    }
}
