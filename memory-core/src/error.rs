//! Error taxonomy for the evaluation and memory subsystems.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. The
//! variants mirror the propagation policy: configuration and integrity
//! failures abort a run, parse and grading failures are scoped to the
//! call that produced them, and [`Error::Recoverable`] is the marker
//! used by callers that intentionally continue past a single failed
//! question or turn.

/// Result type alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the grader, memory coordinator, harness, and
/// self-improvement runner.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing credentials, unknown level id, or an invalid bundle name.
    /// Always aborts the run.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A grader or subprocess response could not be parsed as the
    /// expected structured payload.
    #[error("parse error: {0}")]
    Parse(String),

    /// An agent subprocess exited with a non-zero status.
    #[error("agent subprocess failed (phase={phase}, exit_code={exit_code:?}): {stderr}")]
    AgentPhaseFailure {
        /// `"learning"` or `"testing"`.
        phase: String,
        /// Process exit code, if the process produced one.
        exit_code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// A session-scoping check failed in the memory coordinator. Never
    /// recovered locally; the caller must abort.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    /// The grader's LLM call itself raised. Propagated to the caller,
    /// never silently converted to a zero score.
    #[error("grading error: {0}")]
    Grading(String),

    /// A per-question grading failure or per-turn learn failure that the
    /// caller has decided to log and continue past.
    #[error("recoverable error: {0}")]
    Recoverable(String),

    /// A storage backend operation failed: a failed transaction, a
    /// corrupted record, or a backend-level I/O error below the
    /// [`crate::memory::StorageBackend`] trait boundary.
    #[error("storage error: {0}")]
    Storage(String),

    /// Transport-level failure reaching the grader LLM endpoint.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON (de)serialization failure outside the grader's own parsing
    /// pipeline (e.g. persisting artifacts).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem I/O failure writing or reading run artifacts.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Configuration and integrity errors abort the run; everything
    /// else is scoped to the call that produced it.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::IntegrityViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_and_integrity_are_fatal() {
        assert!(Error::Configuration("missing key".into()).is_fatal());
        assert!(Error::IntegrityViolation("session leak".into()).is_fatal());
    }

    #[test]
    fn parse_and_recoverable_are_not_fatal() {
        assert!(!Error::Parse("bad json".into()).is_fatal());
        assert!(!Error::Recoverable("skipped turn".into()).is_fatal());
        assert!(!Error::Grading("llm down".into()).is_fatal());
    }

    #[test]
    fn agent_phase_failure_display_includes_phase_and_stderr() {
        let err = Error::AgentPhaseFailure {
            phase: "learning".into(),
            exit_code: Some(1),
            stderr: "traceback".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("learning"));
        assert!(msg.contains("traceback"));
    }
}
