/// Outcomes of a run and their textual report.
use std::{
    fmt,
    io::{self, Write},
};

use crate::{ResolveError, SetupError};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    /// The body panicked or returned an error.
    Failed(String),
    /// A fixture could not be produced.
    SetupError(SetupError),
    /// The fixtures could not be resolved: the test never ran.
    CollectionError(ResolveError),
    /// The body passed but a finalizer panicked.
    TeardownError { fixture: String, message: String },
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
    Error,
    Skipped,
}

impl Outcome {
    pub fn status(&self) -> Status {
        match self {
            Outcome::Passed => Status::Passed,
            Outcome::Failed(_) => Status::Failed,
            Outcome::SetupError(_)
            | Outcome::CollectionError(_)
            | Outcome::TeardownError { .. } => Status::Error,
            Outcome::Skipped => Status::Skipped,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    fn message(&self) -> Option<String> {
        match self {
            Outcome::Passed | Outcome::Skipped => None,
            Outcome::Failed(message) => Some(message.clone()),
            Outcome::SetupError(e) => Some(format!("setup error: {e}")),
            Outcome::CollectionError(e) => Some(format!("collection error: {e}")),
            Outcome::TeardownError { fixture, message } => Some(format!(
                "teardown error: fixture '{fixture}' finalizer failed: {message}"
            )),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Passed => "ok",
            Status::Failed => "FAILED",
            Status::Error => "ERROR",
            Status::Skipped => "skipped",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: String,
    pub outcome: Outcome,
}

/// A problem that is not tied to a single selected test: a file that could
/// not be collected or a session fixture that failed to tear down.
#[derive(Debug, Clone, PartialEq)]
pub struct RunError {
    pub origin: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub deselected: usize,
}

impl Summary {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "test result: {}. {} passed; {} failed; {} errors; {} skipped; {} deselected",
            if self.is_success() { "ok" } else { "FAILED" },
            self.passed,
            self.failed,
            self.errors,
            self.skipped,
            self.deselected
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    entries: Vec<Entry>,
    errors: Vec<RunError>,
    deselected: usize,
}

impl Report {
    pub(crate) fn new(deselected: usize) -> Self {
        Self {
            deselected,
            ..Default::default()
        }
    }

    pub(crate) fn push(&mut self, id: impl Into<String>, outcome: Outcome) {
        self.entries.push(Entry {
            id: id.into(),
            outcome,
        })
    }

    pub(crate) fn push_error(&mut self, origin: impl Into<String>, message: impl Into<String>) {
        self.errors.push(RunError {
            origin: origin.into(),
            message: message.into(),
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn errors(&self) -> &[RunError] {
        &self.errors
    }

    pub fn outcome(&self, id: &str) -> Option<&Outcome> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.outcome)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            errors: self.errors.len(),
            deselected: self.deselected,
            ..Default::default()
        };
        for entry in &self.entries {
            match entry.outcome.status() {
                Status::Passed => summary.passed += 1,
                Status::Failed => summary.failed += 1,
                Status::Error => summary.errors += 1,
                Status::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        self.summary().is_success()
    }

    fn write_section<'a>(
        out: &mut impl Write,
        title: &str,
        items: impl Iterator<Item = (&'a str, String)>,
    ) -> io::Result<()> {
        let mut items = items.peekable();
        if items.peek().is_none() {
            return Ok(());
        }
        writeln!(out, "\n{title}:")?;
        for (origin, message) in items {
            writeln!(out, "\n---- {origin} ----\n{message}")?;
        }
        Ok(())
    }

    fn write_details(&self, out: &mut impl Write) -> io::Result<()> {
        Self::write_section(
            out,
            "failures",
            self.entries
                .iter()
                .filter(|e| e.outcome.status() == Status::Failed)
                .filter_map(|e| e.outcome.message().map(|m| (e.id.as_str(), m))),
        )?;
        Self::write_section(
            out,
            "errors",
            self.errors
                .iter()
                .map(|e| (e.origin.as_str(), e.message.clone()))
                .chain(
                    self.entries
                        .iter()
                        .filter(|e| e.outcome.status() == Status::Error)
                        .filter_map(|e| e.outcome.message().map(|m| (e.id.as_str(), m))),
                ),
        )?;
        writeln!(out, "\n{}\n", self.summary())
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        let n = self.entries.len();
        write!(out, "collected {n} {}", if n == 1 { "test" } else { "tests" })?;
        if self.deselected > 0 {
            write!(out, " ({} deselected)", self.deselected)?;
        }
        writeln!(out)?;
        for entry in &self.entries {
            writeln!(out, "test {} ... {}", entry.id, entry.outcome.status())?;
        }
        self.write_details(out)
    }

    /// Like [`Report::render`] but without the line for every test.
    pub fn render_quiet(&self, out: &mut impl Write) -> io::Result<()> {
        self.write_details(out)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = Vec::new();
        self.render(&mut buffer).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buffer))
    }
}
