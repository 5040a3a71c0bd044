//! Per-unit results of a batch stage.
//!
//! A stage never stops at a failing package; it records what happened to
//! each one and moves on. The report is what tests and callers inspect.

use std::fmt;

/// What happened to one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The unit completed; the message says what was done.
    Done(String),
    /// Nothing to do for this unit.
    Skipped(String),
    /// The unit failed; later units still ran.
    Failed(String),
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Done(msg) => write!(f, "done: {msg}"),
            Outcome::Skipped(msg) => write!(f, "skipped: {msg}"),
            Outcome::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Outcome of one named unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub id: String,
    pub outcome: Outcome,
}

/// Ordered outcomes of a whole stage run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub units: Vec<UnitReport>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome and log it.
    pub fn record(&mut self, id: impl Into<String>, outcome: Outcome) {
        let id = id.into();
        match &outcome {
            Outcome::Done(msg) => tracing::info!("{}: {}", id, msg),
            Outcome::Skipped(msg) => tracing::info!("{}: skipped ({})", id, msg),
            Outcome::Failed(msg) => tracing::warn!("{}: failed: {}", id, msg),
        }
        self.units.push(UnitReport { id, outcome });
    }

    /// Record a skip that points at a problem in the workspace, such as a
    /// package without a usable version, and log it as a warning.
    pub fn record_warning(&mut self, id: impl Into<String>, reason: impl Into<String>) {
        let id = id.into();
        let reason = reason.into();
        tracing::warn!("{}: skipped ({})", id, reason);
        self.units.push(UnitReport {
            id,
            outcome: Outcome::Skipped(reason),
        });
    }

    pub fn get(&self, id: &str) -> Option<&Outcome> {
        self.units
            .iter()
            .find(|unit| unit.id == id)
            .map(|unit| &unit.outcome)
    }

    pub fn done(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|unit| unit.outcome.is_done())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|unit| unit.outcome.is_skipped())
    }

    pub fn failed(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|unit| unit.outcome.is_failed())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    /// One-line tally for the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "{} done, {} skipped, {} failed",
            self.done().count(),
            self.skipped().count(),
            self.failed().count()
        )
    }
}
