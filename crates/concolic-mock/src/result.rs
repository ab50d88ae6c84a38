//! Result and error types for concolic mocking.

use thiserror::Error;

/// Result type for mock provider and campaign operations
pub type MockResult<T> = Result<T, MockError>;

/// How far an error propagates through a campaign
///
/// Case-local errors fail the test case that raised them and the campaign
/// keeps scheduling other cases. Fatal errors point at a bug in the
/// interception layer and are surfaced to the driver as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Only the current test case is lost
    CaseLocal,
    /// The interception layer produced data that cannot be trusted
    Fatal,
}

/// Errors that can occur while mocking or exploring
#[derive(Debug, Error)]
pub enum MockError {
    /// The requested type has no interception point
    #[error("Cannot mock {type_name}: {reason}")]
    UnmockableTarget {
        /// Type that was requested
        type_name: String,
        /// Why no interception mechanism applies
        reason: String,
    },

    /// The resolver returned a value that contradicts the recorded path
    #[error("Resolution of {variable} is inconsistent: {message}")]
    ResolutionInconsistency {
        /// Symbolic variable being resolved
        variable: String,
        /// What was violated
        message: String,
    },

    /// A method that the target does not declare was invoked on a mock
    #[error("{type_name} has no interceptable method `{method}`")]
    UnknownMethod {
        /// Mocked type
        type_name: String,
        /// Requested method
        method: String,
    },

    /// Wrong number of arguments for a mocked method
    #[error("`{method}` expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// Method name
        method: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// A test case panicked on a worker thread
    #[error("Test case {case} panicked")]
    CasePanicked {
        /// Test case name
        case: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MockError {
    /// Create an unmockable-target error
    #[must_use]
    pub fn unmockable(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnmockableTarget {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a resolution-inconsistency error
    #[must_use]
    pub fn inconsistent(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResolutionInconsistency {
            variable: variable.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify how far this error propagates
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::ResolutionInconsistency { .. } => Severity::Fatal,
            _ => Severity::CaseLocal,
        }
    }

    /// Whether this is an unmockable-target error
    #[must_use]
    pub fn is_unmockable(&self) -> bool {
        matches!(self, Self::UnmockableTarget { .. })
    }
}
