//! Metrics report files.
//!
//! A finished run can be exported as a flat `key = value` file (`.met`): a
//! two-line header (`timer`, `schedule_policy`), one literal `separator`
//! line, then the six aggregate metrics. Times are integers; throughput
//! values carry two fractional digits. The comparator parses these files
//! back and refuses to compare files whose key sets differ.

use std::fmt::Write as _;

use thiserror::Error;

use crate::engine::Engine;
use crate::metrics::{self, MetricsTracker};
use crate::types::Tick;

/// Keys for which a smaller value is the better result.
const LOWER_IS_BETTER: &[&str] = &[
    "avg_waiting_time",
    "max_waiting_time",
    "avg_turnaround_time",
    "max_turnaround_time",
    "timer",
];

/// True when a smaller value of `key` beats a larger one.
pub fn lower_is_better(key: &str) -> bool {
    LOWER_IS_BETTER.contains(&key)
}

/// A snapshot of everything that goes into a `.met` file.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub timer: Tick,
    pub schedule_policy: String,
    pub avg_waiting_time: Tick,
    pub max_waiting_time: Tick,
    pub avg_turnaround_time: Tick,
    pub max_turnaround_time: Tick,
    pub avg_throughput: f64,
    pub max_throughput: f64,
}

impl Report {
    /// Capture a report from the engine plus the observer's running maxima.
    pub fn capture(engine: &Engine, tracker: &MetricsTracker) -> Self {
        Report {
            timer: engine.timer(),
            schedule_policy: engine.policy().tag().to_string(),
            avg_waiting_time: metrics::average_waiting_time(engine),
            max_waiting_time: tracker.max_waiting_time(),
            avg_turnaround_time: metrics::average_turnaround_time(engine),
            max_turnaround_time: tracker.max_turnaround_time(),
            avg_throughput: engine.throughput(),
            max_throughput: tracker.max_throughput(),
        }
    }

    /// Render the `.met` file content.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "timer = {}", self.timer);
        let _ = writeln!(out, "schedule_policy = {}", self.schedule_policy);
        let _ = writeln!(out, "separator");
        let _ = writeln!(out, "avg_waiting_time = {}", self.avg_waiting_time);
        let _ = writeln!(out, "max_waiting_time = {}", self.max_waiting_time);
        let _ = writeln!(out, "avg_turnaround_time = {}", self.avg_turnaround_time);
        let _ = writeln!(out, "max_turnaround_time = {}", self.max_turnaround_time);
        let _ = writeln!(out, "avg_throughput = {:.2}", self.avg_throughput);
        let _ = writeln!(out, "max_throughput = {:.2}", self.max_throughput);
        out
    }
}

/// Errors raised while reading a metrics file back.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("line {line}: expected `key = value`, got {text:?}")]
    Malformed { line: usize, text: String },

    #[error("metric files carry different key sets; regenerate them")]
    KeySetMismatch,
}

/// A parsed metrics file: ordered `key = value` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsFile {
    entries: Vec<(String, String)>,
}

impl MetricsFile {
    /// Parse `.met` content. `separator` and blank lines are skipped; any
    /// other line must have the `key = value` shape.
    pub fn parse(content: &str) -> Result<Self, ReportError> {
        let mut entries = Vec::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line == "separator" {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ReportError::Malformed {
                    line: idx + 1,
                    text: raw.to_string(),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ReportError::Malformed {
                    line: idx + 1,
                    text: raw.to_string(),
                });
            }
            entries.push((key.to_string(), value.trim().to_string()));
        }
        Ok(MetricsFile { entries })
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Key sets must match (order-insensitively) for files to be comparable.
    pub fn same_keys(&self, other: &MetricsFile) -> bool {
        let mut ours: Vec<&str> = self.entries.iter().map(|(k, _)| k.as_str()).collect();
        let mut theirs: Vec<&str> = other.entries.iter().map(|(k, _)| k.as_str()).collect();
        ours.sort_unstable();
        theirs.sort_unstable();
        ours == theirs
    }
}

/// How one file's value for a key ranks against the other files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    /// Best value among the compared files for this key.
    Best,
    /// Beaten by at least one other file.
    Worse,
    /// Not numeric, or tied across all files.
    Even,
}

/// Rank each file's value for `key`. Non-numeric values rank [`Rank::Even`].
pub fn rank_values(key: &str, values: &[&str]) -> Vec<Rank> {
    let numbers: Vec<Option<f64>> = values.iter().map(|v| v.parse::<f64>().ok()).collect();
    if numbers.iter().any(Option::is_none) {
        return vec![Rank::Even; values.len()];
    }

    let numbers: Vec<f64> = numbers.into_iter().flatten().collect();
    let best = if lower_is_better(key) {
        numbers.iter().cloned().fold(f64::INFINITY, f64::min)
    } else {
        numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    };

    if numbers.iter().all(|&n| n == best) {
        return vec![Rank::Even; values.len()];
    }

    numbers
        .iter()
        .map(|&n| if n == best { Rank::Best } else { Rank::Worse })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        Report {
            timer: 42,
            schedule_policy: "RoundRobin".to_string(),
            avg_waiting_time: 3,
            max_waiting_time: 9,
            avg_turnaround_time: 11,
            max_turnaround_time: 20,
            avg_throughput: 0.5,
            max_throughput: 1.0,
        }
    }

    #[test]
    fn render_then_parse_preserves_entries() {
        let rendered = sample_report().render();
        let parsed = MetricsFile::parse(&rendered).unwrap();

        assert_eq!(parsed.value("timer"), Some("42"));
        assert_eq!(parsed.value("schedule_policy"), Some("RoundRobin"));
        assert_eq!(parsed.value("avg_waiting_time"), Some("3"));
        assert_eq!(parsed.value("avg_throughput"), Some("0.50"));
        assert_eq!(parsed.value("max_throughput"), Some("1.00"));
        assert_eq!(parsed.entries().len(), 8);
    }

    #[test]
    fn separator_and_blank_lines_are_skipped() {
        let parsed = MetricsFile::parse("timer = 1\n\nseparator\n  \navg_waiting_time=2\n").unwrap();
        assert_eq!(parsed.entries().len(), 2);
        assert_eq!(parsed.value("avg_waiting_time"), Some("2"));
    }

    #[test]
    fn malformed_line_is_an_error() {
        let err = MetricsFile::parse("timer = 1\ngarbage\n").unwrap_err();
        assert!(matches!(err, ReportError::Malformed { line: 2, .. }));
    }

    #[test]
    fn key_set_comparison_ignores_order() {
        let a = MetricsFile::parse("x = 1\ny = 2\n").unwrap();
        let b = MetricsFile::parse("y = 5\nx = 9\n").unwrap();
        let c = MetricsFile::parse("x = 1\nz = 2\n").unwrap();
        assert!(a.same_keys(&b));
        assert!(!a.same_keys(&c));
    }

    #[test]
    fn ranking_respects_direction() {
        assert_eq!(
            rank_values("avg_waiting_time", &["3", "5"]),
            vec![Rank::Best, Rank::Worse]
        );
        assert_eq!(
            rank_values("avg_throughput", &["0.30", "0.50"]),
            vec![Rank::Worse, Rank::Best]
        );
        assert_eq!(
            rank_values("schedule_policy", &["FCFS", "RoundRobin"]),
            vec![Rank::Even, Rank::Even]
        );
        assert_eq!(
            rank_values("timer", &["7", "7"]),
            vec![Rank::Even, Rank::Even]
        );
    }
}
