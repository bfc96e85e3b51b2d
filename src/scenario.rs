//! Scenario evaluation: walking the AST into engine mutations.
//!
//! The evaluator is the only producer of engine input. It interprets the
//! parsed scenario tree statement by statement, binding constants to engine
//! bounds and dispatching the spawn built-ins. Values are transient: the
//! language has no user variables, so identifiers evaluate to their own
//! lexeme (used as event-kind tags inside tuples) and every statement is
//! evaluated for its side effects.
//!
//! Randomness lives here and only here. `spawn_process` draws per-burst
//! resource usage; `spawn_random_process` draws the whole process. The
//! engine itself is deterministic given its inputs.

use std::collections::VecDeque;

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::ast::{Ast, ExprKind, ExpressionId};
use crate::engine::Engine;
use crate::lexer::{lex, LexError};
use crate::parser::{parse, ParseError};
use crate::process::{Burst, BurstKind, Process};
use crate::token::Token;
use crate::types::Pid;

/// A transient evaluation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<'src> {
    Str(&'src str),
    Number(u64),
    List(Vec<Value<'src>>),
    Unit,
}

impl<'src> Value<'src> {
    fn as_str(&self) -> Option<&'src str> {
        match self {
            Value::Str(s) => Some(*s),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<u64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_list(&self) -> Option<&[Value<'src>]> {
        match self {
            Value::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }
}

/// An evaluation failure. Any of these aborts the script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unknown builtin `{name}`")]
    UnknownBuiltin { name: String },

    #[error(
        "invalid constant `{name}`; available constants are: max_processes, \
         max_events_per_process, max_single_event_duration, max_arrival_time"
    )]
    UnknownConstant { name: String },

    #[error("constant `{name}` must be bound to a number")]
    ConstantNotNumber { name: String },

    #[error("builtin `{builtin}` expects {expected} arguments, {got} were provided")]
    ArgumentCount {
        builtin: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("mismatched type for argument #{index} of builtin `{builtin}`: expected {expected}")]
    ArgumentType {
        builtin: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("failed to parse number {lexeme:?}")]
    BadNumber { lexeme: String },

    #[error("unknown event kind `{tag}`; expected `Cpu` or `Io`")]
    UnknownEventKind { tag: String },

    #[error("event duration must be at least 1")]
    ZeroDuration,

    #[error("pid space exhausted: every pid in 0..={max} has been drawn")]
    PidSpaceExhausted { max: u64 },
}

/// Any failure between source text and a populated engine.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Lex, parse, and evaluate a scenario script into `engine`.
///
/// On error the engine may hold processes spawned by statements that ran
/// before the failure; callers that need a clean slate should `restart()`.
pub fn evaluate_script(source: &str, engine: &mut Engine) -> Result<(), ScriptError> {
    let tokens = lex(source)?;
    let ast = parse(&tokens)?;
    Evaluator::new(&ast, engine).run()?;
    Ok(())
}

const BUILTINS: &[&str] = &["spawn_process", "spawn_random_process"];

/// Tree-walking evaluator holding the engine it mutates.
pub struct Evaluator<'a, 'src> {
    ast: &'a Ast<'src>,
    engine: &'a mut Engine,
    /// Pids already produced by `spawn_random_process` in this evaluation.
    drawn_pids: Vec<u64>,
}

impl<'a, 'src> Evaluator<'a, 'src> {
    pub fn new(ast: &'a Ast<'src>, engine: &'a mut Engine) -> Self {
        Evaluator {
            ast,
            engine,
            drawn_pids: Vec::new(),
        }
    }

    /// Evaluate every statement in order.
    pub fn run(mut self) -> Result<(), EvalError> {
        for statement in &self.ast.statements {
            self.eval_expression(statement.expression)?;
        }
        Ok(())
    }

    fn eval_expression(&mut self, id: ExpressionId) -> Result<Value<'src>, EvalError> {
        match &self.ast.expression(id).kind {
            ExprKind::StringLiteral { literal } => Ok(Value::Str(literal.lexeme)),

            ExprKind::Variable { name } => Ok(Value::Str(name.lexeme)),

            ExprKind::Number { number } => Ok(Value::Number(parse_number(*number)?)),

            ExprKind::List { elements } | ExprKind::Tuple { elements } => {
                let elements = elements.clone();
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expression(element)?);
                }
                Ok(Value::List(values))
            }

            ExprKind::Range { start, end } => Ok(Value::List(vec![
                Value::Number(parse_number(*start)?),
                Value::Number(parse_number(*end)?),
            ])),

            ExprKind::For { range, body } => {
                let (start, end) = match &self.ast.expression(*range).kind {
                    ExprKind::Range { start, end } => {
                        (parse_number(*start)?, parse_number(*end)?)
                    }
                    _ => unreachable!("for-loop range is always a range node"),
                };

                let body = body.clone();
                for _ in start..end {
                    for &expression in &body {
                        self.eval_expression(expression)?;
                    }
                }
                Ok(Value::Unit)
            }

            ExprKind::Constant { name, value } => {
                self.bind_constant(*name, *value)?;
                Ok(Value::Unit)
            }

            ExprKind::Call { callee, arguments } => {
                let arguments = arguments.clone();
                if !BUILTINS.contains(&callee.lexeme) {
                    return Err(EvalError::UnknownBuiltin {
                        name: callee.lexeme.to_string(),
                    });
                }
                match callee.lexeme {
                    "spawn_process" => self.spawn_process(&arguments),
                    _ => self.spawn_random_process(&arguments),
                }
            }
        }
    }

    fn bind_constant(&mut self, name: Token<'src>, value: ExpressionId) -> Result<(), EvalError> {
        let ExprKind::Number { number } = &self.ast.expression(value).kind else {
            return Err(EvalError::ConstantNotNumber {
                name: name.lexeme.to_string(),
            });
        };
        let bound = parse_number(*number)?;

        let bounds = self.engine.bounds_mut();
        match name.lexeme {
            "max_processes" => bounds.max_processes = bound,
            "max_events_per_process" => bounds.max_events_per_process = bound,
            "max_single_event_duration" => bounds.max_single_event_duration = bound,
            "max_arrival_time" => bounds.max_arrival_time = bound,
            other => {
                return Err(EvalError::UnknownConstant {
                    name: other.to_string(),
                })
            }
        }
        debug!(constant = name.lexeme, value = bound, "bound set");
        Ok(())
    }

    /// `spawn_process(name: string, pid: int, arrival: int, events: [(kind, duration)])`
    fn spawn_process(&mut self, arguments: &[ExpressionId]) -> Result<Value<'src>, EvalError> {
        const NAME: &str = "spawn_process";
        if arguments.len() != 4 {
            return Err(EvalError::ArgumentCount {
                builtin: NAME,
                expected: 4,
                got: arguments.len(),
            });
        }

        let name = self
            .eval_expression(arguments[0])?
            .as_str()
            .ok_or(EvalError::ArgumentType {
                builtin: NAME,
                index: 0,
                expected: "type `string`",
            })?;
        let pid = self
            .eval_expression(arguments[1])?
            .as_number()
            .ok_or(EvalError::ArgumentType {
                builtin: NAME,
                index: 1,
                expected: "type `int`",
            })?;
        let arrival = self
            .eval_expression(arguments[2])?
            .as_number()
            .ok_or(EvalError::ArgumentType {
                builtin: NAME,
                index: 2,
                expected: "type `int`",
            })?;
        let events_value = self.eval_expression(arguments[3])?;
        let bursts = events_as_bursts(&events_value)?;

        self.engine
            .emplace_process(Process::new(name, Pid(pid), arrival, bursts));
        Ok(Value::Unit)
    }

    /// `spawn_random_process()` — draws a fresh process within the bounds.
    fn spawn_random_process(
        &mut self,
        arguments: &[ExpressionId],
    ) -> Result<Value<'src>, EvalError> {
        const NAME: &str = "spawn_random_process";
        if !arguments.is_empty() {
            return Err(EvalError::ArgumentCount {
                builtin: NAME,
                expected: 0,
                got: arguments.len(),
            });
        }

        let bounds = *self.engine.bounds();
        let mut rng = rand::rng();

        // Pids are drawn without replacement across this evaluation.
        if self.drawn_pids.len() as u128 > bounds.max_processes as u128 {
            return Err(EvalError::PidSpaceExhausted {
                max: bounds.max_processes,
            });
        }
        let mut pid = rng.random_range(0..=bounds.max_processes);
        while self.drawn_pids.contains(&pid) {
            pid = rng.random_range(0..=bounds.max_processes);
        }
        self.drawn_pids.push(pid);

        let arrival = rng.random_range(0..=bounds.max_arrival_time);

        // A bound of zero bursts yields an empty process, which the engine
        // rejects at admission with a diagnostic.
        let burst_count = if bounds.max_events_per_process == 0 {
            0
        } else {
            rng.random_range(1..=bounds.max_events_per_process)
        };
        let mut bursts = VecDeque::new();
        for _ in 0..burst_count {
            let kind = if rng.random::<bool>() {
                BurstKind::Cpu
            } else {
                BurstKind::Io
            };
            bursts.push_back(Burst {
                kind,
                duration: rng.random_range(1..=bounds.max_single_event_duration.max(1)),
                resource_usage: random_usage(&mut rng),
            });
        }

        debug!(pid, arrival, bursts = bursts.len(), "random process drawn");
        self.engine
            .emplace_process(Process::new("Process", Pid(pid), arrival, bursts));
        Ok(Value::Unit)
    }
}

/// Interpret an evaluated `events` argument as a burst queue.
fn events_as_bursts(value: &Value<'_>) -> Result<VecDeque<Burst>, EvalError> {
    const NAME: &str = "spawn_process";
    const EXPECTED: &str = "type `List<(event kind, duration)>`, \
                            e.g. [(Cpu, 10), (Io, 3)]";
    let type_error = EvalError::ArgumentType {
        builtin: NAME,
        index: 3,
        expected: EXPECTED,
    };

    let list = value.as_list().ok_or_else(|| type_error.clone())?;

    let mut rng = rand::rng();
    let mut bursts = VecDeque::with_capacity(list.len());
    for tuple in list {
        let pair = tuple.as_list().ok_or_else(|| type_error.clone())?;
        let [tag, duration] = pair else {
            return Err(type_error.clone());
        };

        let tag = tag.as_str().ok_or_else(|| type_error.clone())?;
        let duration = duration.as_number().ok_or_else(|| type_error.clone())?;

        let kind = BurstKind::from_tag(tag).ok_or_else(|| EvalError::UnknownEventKind {
            tag: tag.to_string(),
        })?;
        if duration == 0 {
            return Err(EvalError::ZeroDuration);
        }

        bursts.push_back(Burst {
            kind,
            duration,
            resource_usage: random_usage(&mut rng),
        });
    }

    Ok(bursts)
}

/// Uniform resource usage in `[0.01, 1.0]`.
fn random_usage(rng: &mut impl Rng) -> f32 {
    rng.random::<f32>().max(0.01)
}

fn parse_number(token: Token<'_>) -> Result<u64, EvalError> {
    token.lexeme.parse::<u64>().map_err(|_| EvalError::BadNumber {
        lexeme: token.lexeme.to_string(),
    })
}
