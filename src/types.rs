//! Newtype wrappers and type aliases for domain concepts.
//!
//! Newtypes for identifiers (pids, core indexes, arena handles) prevent
//! silent type confusion. Type aliases for quantities (ticks) provide
//! self-documenting code without the boilerplate of arithmetic traits.

use std::fmt;

/// Process identifier, as declared by the scenario script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub u64);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a simulated core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoreId(pub u32);

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle into the engine's process arena.
///
/// Queues store these instead of owning process records; moving a process
/// between queues moves a handle. Handles are only meaningful for the engine
/// instance that issued them and are invalidated by `restart()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub(crate) usize);

/// Simulated time in integer ticks.
pub type Tick = u64;

/// Upper bound on the number of simulated cores.
pub const MAX_CORES: usize = 9;
