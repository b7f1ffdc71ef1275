//! Result and error types for demoapp-probe.

use thiserror::Error;

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the app under test
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Waiting for an element exceeded its deadline
    #[error("Timed out after {ms}ms waiting for {locator}")]
    Timeout {
        /// Locator that never became ready
        locator: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// The driver reported that no element matched
    #[error("No such element: {locator}")]
    NoSuchElement {
        /// Locator that matched nothing
        locator: String,
    },

    /// Any other error returned by the WebDriver endpoint
    #[error("WebDriver error {status} ({error}): {message}")]
    WebDriver {
        /// HTTP status code
        status: u16,
        /// W3C error code, e.g. "stale element reference"
        error: String,
        /// Server supplied message
        message: String,
    },

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Android SDK or adb not usable
    #[error("Android environment problem: {notes}")]
    EnvironmentNotReady {
        /// Diagnostic notes collected by the check
        notes: String,
    },

    /// Product index outside the currently visible list
    #[error("Product index out of range: {index} (total: {total})")]
    IndexOutOfRange {
        /// Requested 0-based index
        index: usize,
        /// Number of products available
        total: usize,
    },

    /// Not enough product titles even after scrolling
    #[error("Product index out of range: requires {required}, but found {found}")]
    InsufficientProducts {
        /// Titles needed
        required: usize,
        /// Titles collected
        found: usize,
    },

    /// Scenario assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Step executed without its prerequisites
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument passed to a step or page method
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML config error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
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

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether the error means "the element did not show up in time".
    ///
    /// Step fallbacks (e.g. login through the menu) trigger on these.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::NoSuchElement { .. } => true,
            Self::WebDriver { error, .. } => error == "timeout",
            _ => false,
        }
    }

    /// Whether the automation session is gone (deleted, crashed or unreachable).
    ///
    /// Title heuristics treat lookup failures as "nothing found" except for these.
    #[must_use]
    pub fn is_session_lost(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect(),
            Self::WebDriver { error, .. } => error == "invalid session id",
            _ => false,
        }
    }
}
