//! Error types for the comparator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-facing classification of a failure.
///
/// Decides whether an error is reported to the user, logged, or ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed id or URL typed by the user.
    Input,
    /// Failed fetch or non-success response.
    Network,
    /// Image that could not be fetched or decoded.
    Asset,
    /// Preference store failure. Always ignored.
    Persistence,
    /// Anything else (stale responses, closed sessions, bugs).
    Internal,
}

/// A shared error type for the whole comparator.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ComparatorError {
    /// The user entered something that is neither a post id nor a usable URL
    #[error("{0}")]
    InvalidInput(String),

    /// A post or candidate the user asked for does not exist
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Failed request against a backend
    #[error("Network error: {message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Image that could not be fetched or decoded
    #[error("Failed to load image: {url}")]
    Asset { url: String, message: String },

    /// Preference store error
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Malformed persisted data
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem failure below the preference or config files
    #[error("IO error: {message}")]
    Io { message: String },

    /// A response arrived for a request that has since been superseded
    #[error("Stale response for '{0}'")]
    Stale(String),

    /// The session was closed while an operation was in flight
    #[error("Comparison session is closed")]
    SessionClosed,

    /// A broken assumption inside the comparator
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ComparatorError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Network {
            status,
            message: message.into(),
        }
    }

    pub fn asset(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Asset {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Maps the error onto the taxonomy that drives reporting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_) => ErrorCategory::Input,
            Self::NotFound { .. } | Self::Network { .. } => ErrorCategory::Network,
            Self::Asset { .. } => ErrorCategory::Asset,
            Self::Persistence(_) | Self::Io { .. } => ErrorCategory::Persistence,
            Self::Serialization { .. }
            | Self::Config(_)
            | Self::Stale(_)
            | Self::SessionClosed
            | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Text shown to the user when the failure came from an explicit action.
    ///
    /// Returns `None` for failures that must never reach the user.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::InvalidInput(message) => Some(message.clone()),
            Self::NotFound { entity_type, id } => {
                Some(format!("Failed to load {}: #{} not found", entity_type, id))
            }
            Self::Network { message, .. } => Some(format!("Failed to load post: {}", message)),
            Self::Asset { url, .. } => Some(format!("Failed to load image: {}", url)),
            Self::Persistence(_) | Self::Io { .. } | Self::Stale(_) | Self::SessionClosed => None,
            Self::Serialization { .. } | Self::Config(_) | Self::Internal(_) => {
                Some(self.to_string())
            }
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ComparatorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ComparatorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ComparatorError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ComparatorError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ComparatorError>`.
pub type Result<T> = std::result::Result<T, ComparatorError>;
