//! Unified error type for the production tracker.
//!
//! Domain failures (validation, stale ids, role checks, storage) are struct variants so
//! callers can match on them and turn them into user-facing messages. Library errors
//! convert transparently with `?`.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing input, including the off-day planning lock.
    #[error("{message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// An id did not resolve to a record.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Record kind, e.g. `"Entry"` or `"User"`
        kind: &'static str,
        /// The id that was looked up
        id: String,
    },

    /// The acting user's role may not perform the action.
    #[error("Role '{role}' is not allowed to {action}")]
    Permission {
        /// Role of the acting user
        role: String,
        /// What was attempted
        action: &'static str,
    },

    /// A store read or write failed or returned unreadable data.
    #[error("Persistence error: {message}")]
    Persistence {
        /// Description of the failure
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the failure
        message: String,
    },

    /// CSV report generation failed.
    #[error("Export error: {message}")]
    Export {
        /// Description of the failure
        message: String,
    },

    /// Database layer error (a persistence failure).
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON encoding or decoding error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Remote mirror HTTP error.
    #[error("Sync error: {0}")]
    Sync(#[from] reqwest::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while formatting a message.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Missing or invalid environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise framework error.
    #[error("Discord framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the error is caused by the user's input or role and should be shown
    /// to them as-is rather than reported as an internal failure.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::NotFound { .. } | Self::Permission { .. }
        )
    }

    /// Whether the error came from the storage layer.
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Persistence { .. } | Self::Database(_) | Self::Serialization(_)
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_classification() {
        assert!(Error::validation("bad").is_user_facing());
        assert!(
            Error::NotFound {
                kind: "Entry",
                id: "x".to_string()
            }
            .is_user_facing()
        );
        assert!(
            !Error::Persistence {
                message: "disk".to_string()
            }
            .is_user_facing()
        );
    }

    #[test]
    fn test_permission_message() {
        let err = Error::Permission {
            role: "operator".to_string(),
            action: "create plans",
        };
        assert_eq!(err.to_string(), "Role 'operator' is not allowed to create plans");
    }
}
