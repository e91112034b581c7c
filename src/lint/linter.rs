//! Per-chart finding accumulator.

use std::path::PathBuf;

use super::message::{Message, Severity};

/// Accumulates findings for exactly one chart. Written by a single logical
/// flow; read-only once that chart's rule groups have run.
#[derive(Debug, Clone)]
pub struct Linter {
    pub chart_dir: PathBuf,
    pub messages: Vec<Message>,
}

impl Linter {
    #[must_use]
    pub fn new(chart_dir: impl Into<PathBuf>) -> Self {
        Self {
            chart_dir: chart_dir.into(),
            messages: Vec::new(),
        }
    }

    /// Record a rule outcome: a failed rule appends one Message at the
    /// given severity. Returns whether the rule passed, so callers can
    /// gate dependent rules.
    pub fn run_linter_rule(
        &mut self,
        severity: Severity,
        path: &str,
        result: Result<(), String>,
    ) -> bool {
        match result {
            Ok(()) => true,
            Err(cause) => {
                self.messages.push(Message::new(severity, path, cause));
                false
            }
        }
    }

    #[must_use]
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }
}

#[cfg(test)]
#[path = "linter_tests.rs"]
mod tests;
