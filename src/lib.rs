//! schedsim - Tick-driven multi-core CPU scheduler simulator.
//!
//! A population of synthetic processes, each an ordered sequence of CPU and
//! IO bursts, runs through a multi-core engine under a pluggable scheduling
//! policy. Workloads are declared in a small scenario language.
//!
//! # Architecture
//!
//! - **Engine**: tick-driven state machine owning the process arena and the
//!   per-core arrival/ready/waiting/running pipelines
//! - **Policies**: FCFS and Round Robin (with quantum burst splitting)
//! - **Scenario language**: lexer, recursive-descent parser into a flat
//!   arena AST, and a tree-walking evaluator that feeds the engine
//! - **Metrics**: aggregates derived from engine snapshots, plus a flat
//!   `key = value` report format consumed by the comparator
//!
//! # Usage
//!
//! ```rust
//! use schedsim::{evaluate_script, Engine, Policy};
//!
//! let mut engine = Engine::with_cores(Policy::round_robin(), 2);
//! evaluate_script(
//!     r#"spawn_process("A", 1, 0, [(Cpu, 10), (Io, 3), (Cpu, 5)])"#,
//!     &mut engine,
//! )
//! .unwrap();
//!
//! while !engine.complete() {
//!     engine.step();
//! }
//! assert_eq!(engine.finished().len(), 1);
//! ```

pub mod ast;
pub mod engine;
pub mod lexer;
pub mod metrics;
pub mod parser;
pub mod policy;
pub mod process;
pub mod report;
pub mod scenario;
pub mod token;
pub mod types;

// Re-export the main public types for convenience.
pub use engine::{Bounds, Core, Engine};
pub use metrics::{Metrics, MetricsTracker};
pub use policy::{Policy, DEFAULT_QUANTUM};
pub use process::{Burst, BurstKind, Process};
pub use report::{MetricsFile, Report, ReportError};
pub use scenario::{evaluate_script, EvalError, Evaluator, ScriptError, Value};
pub use types::{CoreId, Pid, ProcessId, Tick, MAX_CORES};
