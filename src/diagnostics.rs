//! The diagnostics sink that resolution failures are reported to.
use crate::validation::{DiagnosticCode, ResolutionError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A structured report of one resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The category of the failure.
    pub code: DiagnosticCode,
    /// The derivation expression, as declared.
    pub expression: String,
    /// A human-readable message explaining the failure.
    pub message: String,
}

impl From<&ResolutionError> for Diagnostic {
    fn from(error: &ResolutionError) -> Self {
        Self {
            code: error.code(),
            expression: error.expression().to_string(),
            message: error.to_string(),
        }
    }
}

/// Receives every resolution failure.
///
/// Returning `None` means the caller's policy suppresses the diagnostic; the
/// resolution still fails either way.
pub trait DiagnosticsSink {
    fn report(&mut self, error: &ResolutionError) -> Option<Diagnostic>;
}

/// Keeps every reported diagnostic whose code is not suppressed.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    suppressed: HashSet<DiagnosticCode>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self { Self::default() }

    pub fn suppressing(codes: impl IntoIterator<Item = DiagnosticCode>) -> Self {
        Self { suppressed: codes.into_iter().collect(), diagnostics: Vec::new() }
    }
}

impl DiagnosticsSink for CollectingSink {
    fn report(&mut self, error: &ResolutionError) -> Option<Diagnostic> {
        if self.suppressed.contains(&error.code()) {
            return None;
        }
        let diagnostic = Diagnostic::from(error);
        self.diagnostics.push(diagnostic.clone());
        Some(diagnostic)
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl DiagnosticsSink for SilentSink {
    fn report(&mut self, _error: &ResolutionError) -> Option<Diagnostic> {
        None
    }
}
