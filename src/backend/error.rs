//! Error types for backend operations.
//!
//! Follows the What/Why/Suggestion message pattern used across the project.

use thiserror::Error;

use crate::config::ConfigError;

/// Coarse classification of a [`BackendError`], used to pick troubleshooting text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Connection parameters are missing or placeholders; no request was sent.
    Configuration,
    /// The request never reached the backend.
    Network,
    /// The backend answered with an error.
    Rejected,
    /// The backend answered with something we could not read.
    Decode,
    /// The realtime channel could not be opened or was refused.
    Realtime,
}

/// Errors that can occur while talking to the catalog backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Connection parameters are unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request failed before a response was received.
    #[error(
        "cannot reach the backend while trying to {operation}: {message}\n  Suggestion: Check your network connection and that the project is active (not paused)"
    )]
    Network {
        /// What we were trying to do.
        operation: &'static str,
        /// Transport error text.
        message: String,
    },

    /// The backend refused the request.
    #[error(
        "backend rejected {operation} (HTTP {status}): {message}\n  Suggestion: Check that the 'resources' table exists and that the anon key may access it"
    )]
    Rejected {
        /// What we were trying to do.
        operation: &'static str,
        /// HTTP status code returned.
        status: u16,
        /// Backend-provided message, passed through unchanged.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("unexpected backend response while trying to {operation}: {message}")]
    Decode {
        /// What we were trying to do.
        operation: &'static str,
        /// Decoder error text.
        message: String,
    },

    /// The row targeted by an update does not exist.
    #[error(
        "resource not found: id {id}\n  Suggestion: The resource may have been deleted or the ID is incorrect"
    )]
    MissingRow {
        /// Identifier that matched nothing.
        id: String,
    },

    /// The change feed could not be opened.
    #[error("realtime channel unavailable: {message}")]
    Realtime {
        /// Transport or join error text.
        message: String,
    },
}

impl BackendError {
    /// Creates a `Network` error.
    #[must_use]
    pub fn network(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Network {
            operation,
            message: message.into(),
        }
    }

    /// Creates a `Rejected` error.
    #[must_use]
    pub fn rejected(operation: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            status,
            message: message.into(),
        }
    }

    /// Creates a `Decode` error.
    #[must_use]
    pub fn decode(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            operation,
            message: message.into(),
        }
    }

    /// Creates a `Realtime` error.
    #[must_use]
    pub fn realtime(message: impl Into<String>) -> Self {
        Self::Realtime {
            message: message.into(),
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub fn kind(&self) -> BackendErrorKind {
        match self {
            Self::Config(_) => BackendErrorKind::Configuration,
            Self::Network { .. } => BackendErrorKind::Network,
            Self::Rejected { .. } | Self::MissingRow { .. } => BackendErrorKind::Rejected,
            Self::Decode { .. } => BackendErrorKind::Decode,
            Self::Realtime { .. } => BackendErrorKind::Realtime,
        }
    }

    /// Returns true when the error was raised before any network call.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        self.kind() == BackendErrorKind::Configuration
    }
}
