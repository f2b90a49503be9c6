//! Diagnostics sink that reports through tracing

use super::traits::DiagnosticsSink;

/// Records non-fatal failures as `tracing` error events
#[derive(Debug, Default, Clone)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn log_non_fatal_crash(&self, error: &anyhow::Error) {
        tracing::error!(error = ?error, "Non-fatal crash: {error:#}");
    }
}
