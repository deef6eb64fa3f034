//! Per-run conversion state: verbosity and collected diagnostics.
//!
//! One context is created by the CLI and passed by `&mut` through loading,
//! conversion and saving. Nothing here is global.

use std::fmt;

use crate::output::{plural, Printer};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Note,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A non-fatal observation made during conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Machine-readable code (e.g. "palspr::list::short-line").
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn note(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConversionContext {
    pub verbosity: u8,
    printer: Printer,
    diagnostics: Vec<Diagnostic>,
}

impl ConversionContext {
    pub fn new(verbosity: u8, printer: Printer) -> Self {
        Self {
            verbosity,
            printer,
            diagnostics: Vec::new(),
        }
    }

    pub fn printer(&self) -> &Printer {
        &self.printer
    }

    /// Status line shown only with `-v`.
    pub fn verbose(&self, verb: &str, message: &str) {
        if self.verbosity > 0 {
            self.printer.info(verb, message);
        }
    }

    /// Status line that is always shown.
    pub fn status(&self, verb: &str, message: &str) {
        self.printer.status(verb, message);
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn warn(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.push(Diagnostic::warning(code, message));
    }

    pub fn note(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.push(Diagnostic::note(code, message));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Print every collected diagnostic, then a summary line.
    ///
    /// Notes are only printed with `-v`.
    pub fn report(&self) {
        for d in &self.diagnostics {
            match d.severity {
                Severity::Warning => self.printer.warning(
                    "Warning",
                    &format!("{} {}", d.message, self.printer.dim(&format!("[{}]", d.code))),
                ),
                Severity::Note if self.verbosity > 0 => self.printer.info(
                    "Note",
                    &format!("{} {}", d.message, self.printer.dim(&format!("[{}]", d.code))),
                ),
                Severity::Note => {}
            }
        }
        let warnings = self.warning_count();
        if warnings > 0 {
            self.printer
                .warning("Finished", &format!("with {}", plural(warnings, "warning", "warnings")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_diagnostics() {
        let mut ctx = ConversionContext::new(0, Printer::plain());
        ctx.warn("palspr::palette::clamped", "2 channels clamped");
        ctx.note("palspr::list::short-line", "crop defaults used");

        assert_eq!(ctx.diagnostics().len(), 2);
        assert_eq!(ctx.warning_count(), 1);
        assert_eq!(ctx.diagnostics()[0].severity, Severity::Warning);
        assert_eq!(ctx.diagnostics()[1].code, "palspr::list::short-line");
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut a = ConversionContext::new(1, Printer::plain());
        let b = ConversionContext::new(0, Printer::plain());
        a.warn("x", "y");
        assert_eq!(a.warning_count(), 1);
        assert_eq!(b.warning_count(), 0);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Note.to_string(), "note");
    }
}
