//! Error sinks.

use std::panic::Location;

use parking_lot::Mutex;
use tracing::error;

use kdispatch_core::backend::ErrorSink;
use kdispatch_core::error::DispatchError;

/// An error as received by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    /// Source file that raised the error.
    pub file: &'static str,
    /// Line within `file`.
    pub line: u32,
    /// The error itself.
    pub error: DispatchError,
}

/// Sink that keeps every reported error.
#[derive(Debug, Default)]
pub struct CollectingErrorSink {
    errors: Mutex<Vec<ReportedError>>,
}

impl CollectingErrorSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors reported so far, oldest first.
    pub fn errors(&self) -> Vec<ReportedError> {
        self.errors.lock().clone()
    }

    /// Number of errors reported so far.
    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    /// Whether nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }
}

impl ErrorSink for CollectingErrorSink {
    fn register_error(&self, location: &'static Location<'static>, error: &DispatchError) {
        self.errors.lock().push(ReportedError {
            file: location.file(),
            line: location.line(),
            error: error.clone(),
        });
    }
}

/// Sink that forwards every report to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn register_error(&self, location: &'static Location<'static>, error: &DispatchError) {
        error!(%location, "Kernel dispatch error: {}", error);
    }
}
