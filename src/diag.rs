//! Diagnostics sink. The parsers report their steps and any internal
//! invariant violations through a caller-supplied sink rather than a
//! global logger, so embedders decide where output goes.

use std::fmt;

/// Record of an internal invariant violation. Always indicates a bug
/// in the analyses or the parser, never a malformed input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuruMeditation {
    /// What went wrong.
    pub message: String,
    /// Source file that detected the violation.
    pub file: &'static str,
    /// Source line that detected the violation.
    pub line: u32,
}

impl GuruMeditation {
    /// Creates a record for the given location.
    pub fn new(message: impl Into<String>, file: &'static str, line: u32) -> Self {
        GuruMeditation {
            message: message.into(),
            file,
            line,
        }
    }
}

impl fmt::Display for GuruMeditation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "guru meditation: {} ({}:{})",
            self.message, self.file, self.line
        )
    }
}

impl std::error::Error for GuruMeditation {}

/// Sink for parser progress and invariant violations.
pub trait Diagnostics {
    /// Called when an internal invariant is violated, right before the
    /// parse aborts.
    fn guru_meditation(&mut self, message: &str, file: &'static str, line: u32);

    /// Called when the shift-reduce parser pushes a token.
    fn shift(&mut self, _value: &[u8]) {}

    /// Called when the shift-reduce parser reduces `span` stack
    /// symbols to the named rule.
    fn reduce(&mut self, _rule: &[u8], _span: usize) {}

    /// Free-form progress note.
    fn note(&mut self, _message: &str) {}
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {
    fn guru_meditation(&mut self, _message: &str, _file: &'static str, _line: u32) {}
}

/// Sink that forwards to the `log` facade: steps at trace level,
/// meditations at error level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn guru_meditation(&mut self, message: &str, file: &'static str, line: u32) {
        log::error!("guru meditation: {message} ({file}:{line})");
    }

    fn shift(&mut self, value: &[u8]) {
        log::trace!("shift {:?}", String::from_utf8_lossy(value));
    }

    fn reduce(&mut self, rule: &[u8], span: usize) {
        log::trace!("reduce {} <- {span} symbols", String::from_utf8_lossy(rule));
    }

    fn note(&mut self, message: &str) {
        log::trace!("{message}");
    }
}
