//! Tick-driven simulation engine.
//!
//! This is the core of the simulator. It owns the process arena, the
//! per-core queues and running slots, and advances the whole population by
//! exactly one tick per [`Engine::step`] call under the installed policy.
//!
//! Within a tick each core goes through the same phases in order: admit
//! arrivals, advance the waiting (IO) queue, advance the running slot,
//! schedule, sample utilization. Cores are processed in index order. After
//! all cores, throughput is refreshed and the timer increments. Observers
//! that read between `step` calls always see a consistent snapshot.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::policy::Policy;
use crate::process::{BurstKind, Process};
use crate::types::{CoreId, ProcessId, Tick, MAX_CORES};

/// User-configurable bounds consumed by randomized process spawning.
///
/// These survive [`Engine::restart`]; scripts set them through constant
/// definitions before spawning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Largest pid drawable (inclusive).
    pub max_processes: u64,
    /// Largest number of bursts per spawned process (inclusive).
    pub max_events_per_process: u64,
    /// Largest single burst duration in ticks (inclusive).
    pub max_single_event_duration: u64,
    /// Latest arrival tick drawable (inclusive).
    pub max_arrival_time: u64,
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds {
            max_processes: u64::MAX,
            max_events_per_process: u64::MAX,
            max_single_event_duration: u64::MAX,
            max_arrival_time: u64::MAX,
        }
    }
}

/// Per-core state: the three pipeline queues, the running slot, and the
/// utilization sample taken at the end of the core's phase sequence.
#[derive(Debug, Default)]
pub struct Core {
    pub(crate) arrivals: VecDeque<ProcessId>,
    pub(crate) ready: VecDeque<ProcessId>,
    pub(crate) waiting: VecDeque<ProcessId>,
    pub(crate) running: Option<ProcessId>,
    pub(crate) cpu_usage: f32,
}

impl Core {
    /// Processes parked until their arrival tick.
    pub fn arrivals(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.arrivals.iter().copied()
    }

    /// Processes fronting a CPU burst, awaiting the running slot.
    pub fn ready(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.ready.iter().copied()
    }

    /// Processes fronting an IO burst.
    pub fn waiting(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.waiting.iter().copied()
    }

    /// The process occupying this core, if any.
    pub fn running(&self) -> Option<ProcessId> {
        self.running
    }

    /// Utilization sampled after the last scheduling phase: the running
    /// process's front-burst resource usage, or 0 when idle.
    pub fn cpu_usage(&self) -> f32 {
        self.cpu_usage
    }

    fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
            && self.ready.is_empty()
            && self.waiting.is_empty()
            && self.running.is_none()
    }

    fn clear(&mut self) {
        self.arrivals.clear();
        self.ready.clear();
        self.waiting.clear();
        self.running = None;
        self.cpu_usage = 0.0;
    }
}

/// The multi-core scheduler simulation.
pub struct Engine {
    policy: Policy,
    timer: Tick,
    arena: Vec<Process>,
    cores: Vec<Core>,
    finished: Vec<ProcessId>,
    throughput: f64,
    next_core: usize,
    bounds: Bounds,
}

impl Engine {
    /// Empty engine with the default core count.
    pub fn new(policy: Policy) -> Self {
        Self::with_cores(policy, MAX_CORES)
    }

    /// Empty engine with `nr_cores` cores (`1..=MAX_CORES`).
    pub fn with_cores(policy: Policy, nr_cores: usize) -> Self {
        assert!(
            (1..=MAX_CORES).contains(&nr_cores),
            "core count {nr_cores} out of range 1..={MAX_CORES}"
        );
        Engine {
            policy,
            timer: 0,
            arena: Vec::new(),
            cores: (0..nr_cores).map(|_| Core::default()).collect(),
            finished: Vec::new(),
            throughput: 0.0,
            next_core: 0,
            bounds: Bounds::default(),
        }
    }

    /// Insert a process, assigning it to cores round-robin.
    ///
    /// The process sits in its core's arrival queue until the timer reaches
    /// its arrival tick; validation (pid uniqueness, non-empty burst list)
    /// happens at admission, not here.
    pub fn emplace_process(&mut self, process: Process) -> ProcessId {
        let id = ProcessId(self.arena.len());
        debug!(
            pid = process.pid().0,
            arrival = process.arrival(),
            core = self.next_core,
            "process emplaced"
        );
        self.arena.push(process);
        self.cores[self.next_core].arrivals.push_back(id);
        self.next_core = (self.next_core + 1) % self.cores.len();
        id
    }

    /// True when every queue and running slot is empty.
    pub fn complete(&self) -> bool {
        self.cores.iter().all(Core::is_empty)
    }

    /// Advance the simulation by exactly one tick.
    pub fn step(&mut self) {
        for core_idx in 0..self.cores.len() {
            self.admit_arrivals(core_idx);
            self.advance_waiting(core_idx);
            self.advance_running(core_idx);
            self.schedule(core_idx);

            let core = &mut self.cores[core_idx];
            core.cpu_usage = match core.running {
                Some(id) => self.arena[id.0]
                    .current_burst()
                    .map(|b| b.resource_usage)
                    .unwrap_or(0.0),
                None => 0.0,
            };
        }

        self.throughput = if self.timer == 0 {
            0.0
        } else {
            self.finished.len() as f64 / self.timer as f64
        };
        self.timer += 1;
    }

    /// Reset to the just-constructed state. Bounds and policy persist.
    pub fn restart(&mut self) {
        self.timer = 0;
        self.arena.clear();
        self.finished.clear();
        self.throughput = 0.0;
        self.next_core = 0;
        for core in &mut self.cores {
            core.clear();
        }
    }

    /// Install a new policy for subsequent ticks. Queues are untouched.
    pub fn switch_policy(&mut self, policy: Policy) {
        if policy != self.policy {
            info!(from = %self.policy, to = %policy, "policy switched");
        }
        self.policy = policy;
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn timer(&self) -> Tick {
        self.timer
    }

    /// Cumulative throughput: finished count over elapsed ticks.
    pub fn throughput(&self) -> f64 {
        self.throughput
    }

    pub fn nr_cores(&self) -> usize {
        self.cores.len()
    }

    pub fn core(&self, id: CoreId) -> &Core {
        &self.cores[id.0 as usize]
    }

    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// Handles of completed processes, in completion order.
    pub fn finished(&self) -> &[ProcessId] {
        &self.finished
    }

    /// Borrow a process record by handle.
    pub fn process(&self, id: ProcessId) -> &Process {
        &self.arena[id.0]
    }

    /// All process records ever inserted since the last restart.
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.arena.iter()
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn bounds_mut(&mut self) -> &mut Bounds {
        &mut self.bounds
    }

    /// Phase 1: move every process whose arrival tick is now out of the
    /// arrival queue and into ready or waiting, by its front burst kind.
    ///
    /// Rejected processes (duplicate pid on this core, empty burst list) are
    /// dropped with a diagnostic; the scan always moves past them.
    fn admit_arrivals(&mut self, core_idx: usize) {
        let pending = self.cores[core_idx].arrivals.len();
        for _ in 0..pending {
            let Some(id) = self.cores[core_idx].arrivals.pop_front() else {
                break;
            };

            if self.arena[id.0].arrival() != self.timer {
                self.cores[core_idx].arrivals.push_back(id);
                continue;
            }

            let pid = self.arena[id.0].pid();
            if !self.pid_is_unique(core_idx, pid) {
                warn!(
                    name = self.arena[id.0].name(),
                    pid = pid.0,
                    core = core_idx,
                    "pid already in use on this core, dropping process"
                );
                continue;
            }

            if self.arena[id.0].bursts.is_empty() {
                warn!(
                    name = self.arena[id.0].name(),
                    pid = pid.0,
                    core = core_idx,
                    "process has no bursts, dropping"
                );
                continue;
            }

            self.dispatch(core_idx, id);
        }
    }

    /// Phase 2: burn one IO tick for every waiting process. Drained bursts
    /// pop; emptied processes finish; the rest re-dispatch by their new
    /// front. Dispatches are deferred until the scan is done so the tick's
    /// effects are atomic.
    fn advance_waiting(&mut self, core_idx: usize) {
        let waiting = std::mem::take(&mut self.cores[core_idx].waiting);
        let mut to_dispatch = Vec::new();

        for id in waiting {
            let process = &mut self.arena[id.0];
            debug_assert!(
                matches!(process.current_burst(), Some(b) if b.kind == BurstKind::Io),
                "waiting process must front an IO burst"
            );

            let Some(burst) = process.bursts.front_mut() else {
                continue;
            };
            burst.duration -= 1;
            if burst.duration > 0 {
                self.cores[core_idx].waiting.push_back(id);
                continue;
            }

            process.bursts.pop_front();
            if process.bursts.is_empty() {
                self.finish(core_idx, id);
            } else {
                to_dispatch.push(id);
            }
        }

        for id in to_dispatch {
            self.dispatch(core_idx, id);
        }
    }

    /// Phase 3: burn one CPU tick in the running slot. A drained burst
    /// pops; the process then either finishes or re-dispatches, and the
    /// slot clears either way.
    fn advance_running(&mut self, core_idx: usize) {
        let Some(id) = self.cores[core_idx].running else {
            return;
        };

        let process = &mut self.arena[id.0];
        debug_assert!(
            matches!(process.current_burst(), Some(b) if b.kind == BurstKind::Cpu),
            "running process must front a CPU burst"
        );

        let Some(burst) = process.bursts.front_mut() else {
            self.cores[core_idx].running = None;
            return;
        };
        burst.duration -= 1;
        if burst.duration > 0 {
            return;
        }

        process.bursts.pop_front();
        self.cores[core_idx].running = None;
        if process.bursts.is_empty() {
            self.finish(core_idx, id);
        } else {
            self.dispatch(core_idx, id);
        }
    }

    /// Phase 4: let the policy fill an empty running slot from the ready
    /// queue (possibly splitting the front burst under Round Robin).
    fn schedule(&mut self, core_idx: usize) {
        if self.cores[core_idx].running.is_some() {
            return;
        }

        let policy = self.policy;
        let core = &mut self.cores[core_idx];
        if let Some(id) = policy.select(&mut core.ready, &mut self.arena) {
            debug!(
                pid = self.arena[id.0].pid().0,
                core = core_idx,
                timer = self.timer,
                "scheduled"
            );
            self.cores[core_idx].running = Some(id);
        }
    }

    /// Route a process by its front burst kind: CPU to ready (stamping the
    /// first-start time), IO to waiting.
    fn dispatch(&mut self, core_idx: usize, id: ProcessId) {
        let now = self.timer;
        let process = &mut self.arena[id.0];
        debug_assert!(!process.bursts.is_empty(), "dispatch needs a front burst");

        match process.current_burst().map(|b| b.kind) {
            Some(BurstKind::Cpu) => {
                process.mark_started(now);
                self.cores[core_idx].ready.push_back(id);
            }
            Some(BurstKind::Io) => {
                self.cores[core_idx].waiting.push_back(id);
            }
            None => {}
        }
    }

    fn finish(&mut self, core_idx: usize, id: ProcessId) {
        let now = self.timer;
        let process = &mut self.arena[id.0];
        process.mark_finished(now);
        info!(
            name = process.name(),
            pid = process.pid().0,
            core = core_idx,
            timer = now,
            "process finished"
        );
        self.finished.push(id);
    }

    /// A pid may appear at most once across a core's pipeline queues and
    /// running slot. Checked at admission.
    fn pid_is_unique(&self, core_idx: usize, pid: crate::types::Pid) -> bool {
        let core = &self.cores[core_idx];
        let clashes = |id: &ProcessId| self.arena[id.0].pid() == pid;

        !core.ready.iter().any(|id| clashes(id))
            && !core.waiting.iter().any(|id| clashes(id))
            && !core.running.iter().any(clashes)
    }
}
