//! Aggregate metrics derived from engine snapshots.
//!
//! Everything here is a pure read of the engine's public state. Averages
//! count only finished processes that actually carry the relevant stamp: a
//! process that drained without ever reaching a CPU burst contributes to
//! neither side of the waiting-time mean.

use crate::engine::Engine;
use crate::types::Tick;

/// Point-in-time aggregates sampled from an engine between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    /// Mean of `start_time - arrival` over finished processes, in ticks.
    pub avg_waiting_time: Tick,
    /// Mean of `finish_time - arrival` over finished processes, in ticks.
    pub avg_turnaround_time: Tick,
    /// Mean per-core utilization in `[0, 1]`.
    pub avg_cpu_usage: f64,
    /// Finished processes per elapsed tick, cumulative.
    pub throughput: f64,
}

impl Metrics {
    /// Sample the current aggregates.
    pub fn sample(engine: &Engine) -> Self {
        Metrics {
            avg_waiting_time: average_waiting_time(engine),
            avg_turnaround_time: average_turnaround_time(engine),
            avg_cpu_usage: average_cpu_usage(engine),
            throughput: engine.throughput(),
        }
    }
}

/// Mean waiting time across finished processes that have a start stamp.
pub fn average_waiting_time(engine: &Engine) -> Tick {
    mean(engine
        .finished()
        .iter()
        .filter_map(|&id| engine.process(id).waiting_time()))
}

/// Mean turnaround time across finished processes that have a finish stamp.
pub fn average_turnaround_time(engine: &Engine) -> Tick {
    mean(engine
        .finished()
        .iter()
        .filter_map(|&id| engine.process(id).turnaround_time()))
}

/// Mean utilization across all cores, idle cores included.
pub fn average_cpu_usage(engine: &Engine) -> f64 {
    let total: f64 = engine.cores().iter().map(|c| c.cpu_usage() as f64).sum();
    total / engine.nr_cores() as f64
}

fn mean(values: impl Iterator<Item = Tick>) -> Tick {
    let (mut sum, mut count) = (0u64, 0u64);
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        0
    } else {
        sum / count
    }
}

/// Running maxima of the per-tick averages, recorded by an observer.
///
/// The engine exposes only instantaneous aggregates; peak values are the
/// observer's business. Call [`MetricsTracker::observe`] once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsTracker {
    max_waiting_time: Tick,
    max_turnaround_time: Tick,
    max_throughput: f64,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the engine's current aggregates into the running maxima.
    pub fn observe(&mut self, engine: &Engine) {
        self.max_waiting_time = self.max_waiting_time.max(average_waiting_time(engine));
        self.max_turnaround_time = self
            .max_turnaround_time
            .max(average_turnaround_time(engine));
        self.max_throughput = self.max_throughput.max(engine.throughput());
    }

    pub fn max_waiting_time(&self) -> Tick {
        self.max_waiting_time
    }

    pub fn max_turnaround_time(&self) -> Tick {
        self.max_turnaround_time
    }

    pub fn max_throughput(&self) -> f64 {
        self.max_throughput
    }

    /// Forget all maxima, e.g. across an engine restart.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
