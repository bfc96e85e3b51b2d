//! Scheduling policies.
//!
//! A policy is the selection discipline a core applies when its running slot
//! is empty. Policies are a closed enum dispatched in one place, which keeps
//! the engine non-generic and lets the driver hot-swap disciplines between
//! ticks without reshuffling any queue.

use std::collections::VecDeque;
use std::fmt;

use crate::process::{Burst, BurstKind, Process};
use crate::types::{ProcessId, Tick};

/// Default Round-Robin quantum, in ticks.
pub const DEFAULT_QUANTUM: Tick = 5;

/// The selection discipline applied to a core's ready queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// First-come-first-served: run the head of the ready queue until its
    /// CPU burst drains.
    Fcfs,
    /// Round Robin: run the head for at most `quantum` ticks, splitting a
    /// longer front burst so the remainder re-queues.
    RoundRobin { quantum: Tick },
}

impl Policy {
    /// Round Robin with the default quantum.
    pub fn round_robin() -> Self {
        Policy::RoundRobin {
            quantum: DEFAULT_QUANTUM,
        }
    }

    /// Stable tag used in telemetry and report headers.
    pub fn tag(&self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::RoundRobin { .. } => "RoundRobin",
        }
    }

    /// Pick the next process for an idle core.
    ///
    /// Takes the head of the ready queue. Round Robin additionally splits a
    /// front burst longer than the quantum: the queued burst keeps the
    /// remainder and a fresh CPU burst of exactly `quantum` ticks (same
    /// resource usage) is pushed to the front, so the slot runs for the
    /// quantum and the rest of the burst returns to the ready queue later.
    pub(crate) fn select(
        &self,
        ready: &mut VecDeque<ProcessId>,
        arena: &mut [Process],
    ) -> Option<ProcessId> {
        let id = ready.pop_front()?;

        if let Policy::RoundRobin { quantum } = *self {
            let bursts = &mut arena[id.0].bursts;
            debug_assert!(
                matches!(bursts.front(), Some(b) if b.kind == BurstKind::Cpu),
                "ready process must front a CPU burst"
            );
            if let Some(front) = bursts.front_mut() {
                if front.duration > quantum {
                    front.duration -= quantum;
                    let resource_usage = front.resource_usage;
                    bursts.push_front(Burst {
                        kind: BurstKind::Cpu,
                        duration: quantum,
                        resource_usage,
                    });
                }
            }
        }

        Some(id)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Fcfs => write!(f, "FCFS"),
            Policy::RoundRobin { quantum } => write!(f, "RoundRobin(q={quantum})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pid;

    fn one_burst_process(duration: Tick) -> Process {
        Process::new(
            "p",
            Pid(1),
            0,
            vec![Burst {
                kind: BurstKind::Cpu,
                duration,
                resource_usage: 0.25,
            }],
        )
    }

    #[test]
    fn fcfs_takes_head_without_splitting() {
        let mut arena = vec![one_burst_process(12)];
        let mut ready = VecDeque::from([ProcessId(0)]);

        let picked = Policy::Fcfs.select(&mut ready, &mut arena);
        assert_eq!(picked, Some(ProcessId(0)));
        assert!(ready.is_empty());
        assert_eq!(arena[0].bursts.len(), 1);
        assert_eq!(arena[0].bursts[0].duration, 12);
    }

    #[test]
    fn round_robin_splits_long_bursts() {
        let mut arena = vec![one_burst_process(12)];
        let mut ready = VecDeque::from([ProcessId(0)]);

        let policy = Policy::RoundRobin { quantum: 5 };
        let picked = policy.select(&mut ready, &mut arena);
        assert_eq!(picked, Some(ProcessId(0)));

        // Front slice of exactly one quantum, remainder behind it.
        assert_eq!(arena[0].bursts.len(), 2);
        assert_eq!(arena[0].bursts[0].duration, 5);
        assert_eq!(arena[0].bursts[1].duration, 7);
        assert_eq!(arena[0].bursts[0].kind, BurstKind::Cpu);
        assert_eq!(
            arena[0].bursts[0].resource_usage,
            arena[0].bursts[1].resource_usage
        );
    }

    #[test]
    fn round_robin_leaves_short_bursts_alone() {
        for duration in [1, 4, 5] {
            let mut arena = vec![one_burst_process(duration)];
            let mut ready = VecDeque::from([ProcessId(0)]);

            let policy = Policy::RoundRobin { quantum: 5 };
            policy.select(&mut ready, &mut arena);
            assert_eq!(arena[0].bursts.len(), 1, "duration {duration} was split");
            assert_eq!(arena[0].bursts[0].duration, duration);
        }
    }

    #[test]
    fn empty_ready_queue_selects_nothing() {
        let mut arena: Vec<Process> = Vec::new();
        let mut ready = VecDeque::new();
        assert_eq!(Policy::Fcfs.select(&mut ready, &mut arena), None);
        assert_eq!(
            Policy::round_robin().select(&mut ready, &mut arena),
            None
        );
    }
}
