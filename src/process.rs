//! Process model for the simulator.
//!
//! Each simulated process carries an ordered queue of CPU/IO bursts. The
//! front burst is the one currently being worked; the engine decrements its
//! duration in place and pops it when it drains.

use std::collections::VecDeque;
use std::fmt;

use crate::types::{Pid, Tick};

/// What a burst occupies: a core, or the IO subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstKind {
    Cpu,
    Io,
}

impl BurstKind {
    /// Parse a scenario tag (`Cpu`, `Io`, any casing) into a kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("cpu") {
            Some(BurstKind::Cpu)
        } else if tag.eq_ignore_ascii_case("io") {
            Some(BurstKind::Io)
        } else {
            None
        }
    }
}

impl fmt::Display for BurstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurstKind::Cpu => write!(f, "Cpu"),
            BurstKind::Io => write!(f, "Io"),
        }
    }
}

/// A contiguous run of CPU or IO work.
///
/// `duration` is strictly positive when the burst is queued; the engine
/// mutates it in place. `resource_usage` is the fraction of the core the
/// burst occupies while running, in `[0.01, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    pub kind: BurstKind,
    pub duration: Tick,
    pub resource_usage: f32,
}

/// A simulated process: identity, arrival tick, burst queue, and the two
/// bookkeeping stamps used by the waiting/turnaround statistics.
#[derive(Debug, Clone)]
pub struct Process {
    name: String,
    pid: Pid,
    arrival: Tick,
    pub(crate) bursts: VecDeque<Burst>,
    pub(crate) start_time: Option<Tick>,
    pub(crate) finish_time: Option<Tick>,
}

impl Process {
    pub fn new(
        name: impl Into<String>,
        pid: Pid,
        arrival: Tick,
        bursts: impl Into<VecDeque<Burst>>,
    ) -> Self {
        Process {
            name: name.into(),
            pid,
            arrival,
            bursts: bursts.into(),
            start_time: None,
            finish_time: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn arrival(&self) -> Tick {
        self.arrival
    }

    /// The burst currently being worked, if any.
    pub fn current_burst(&self) -> Option<&Burst> {
        self.bursts.front()
    }

    /// Remaining bursts, front first.
    pub fn bursts(&self) -> impl Iterator<Item = &Burst> {
        self.bursts.iter()
    }

    /// Tick at which the process first entered the CPU ready path.
    pub fn start_time(&self) -> Option<Tick> {
        self.start_time
    }

    /// Tick at which the last burst drained.
    pub fn finish_time(&self) -> Option<Tick> {
        self.finish_time
    }

    /// Ticks spent waiting before first reaching a core.
    pub fn waiting_time(&self) -> Option<Tick> {
        self.start_time.map(|start| start - self.arrival)
    }

    /// Ticks from arrival to completion.
    pub fn turnaround_time(&self) -> Option<Tick> {
        self.finish_time.map(|finish| finish - self.arrival)
    }

    /// Stamp the first CPU-ready entry. First write wins.
    pub(crate) fn mark_started(&mut self, now: Tick) {
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
    }

    /// Stamp completion. First write wins.
    pub(crate) fn mark_finished(&mut self, now: Tick) {
        if self.finish_time.is_none() {
            self.finish_time = Some(now);
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pid={} arrival={} bursts=[",
            self.name, self.pid, self.arrival
        )?;
        for (i, burst) in self.bursts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {})", burst.kind, burst.duration)?;
        }
        write!(f, "]")
    }
}
