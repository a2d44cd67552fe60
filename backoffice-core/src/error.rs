//! Error types for grid operations

use crate::RecordId;
use thiserror::Error;

/// Failures reported by a [`crate::RemoteDataSource`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataSourceError {
    /// Transport failure, no response was received.
    #[error("Network error: {reason}")]
    Network { reason: String },

    /// Non-2xx response without a structured validation message.
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// 4xx response carrying a structured message.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// The body could not be decoded.
    #[error("Malformed response: {reason}")]
    Parse { reason: String },
}

impl DataSourceError {
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network {
            reason: reason.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    /// Message to show the user: the server-provided text when there is one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Server { message, .. } | Self::Validation { message }
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

/// Client-side validation failures from a record descriptor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Rejected grid transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Record {editing} is already being edited")]
    EditInProgress { editing: RecordId },

    #[error("No record is being edited")]
    NotEditing,

    #[error("Record {id} has a save in flight")]
    SaveInFlight { id: RecordId },

    #[error("Record {id} has a request in flight")]
    RowBusy { id: RecordId },

    #[error("Record {id} is not on the current page")]
    RowNotFound { id: RecordId },

    #[error("Unknown field: {key}")]
    UnknownField { key: String },

    #[error("Field {key} is read-only")]
    ReadOnlyField { key: String },

    #[error("Unknown filter: {name}")]
    UnknownFilter { name: String },

    #[error("Invalid value for filter {name}: {reason}")]
    InvalidFilter { name: String, reason: String },

    #[error("Unknown column: {key}")]
    UnknownColumn { key: String },

    #[error("{entity} records do not support {action}")]
    Unsupported {
        entity: &'static str,
        action: &'static str,
    },

    #[error("Create form is not open")]
    NoCreateForm,

    #[error("A create request is already in flight")]
    CreateInFlight,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type for grid transitions.
pub type GridResult<T> = Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = DataSourceError::validation("workflow_id does not exist");
        assert_eq!(err.user_message("Save failed"), "workflow_id does not exist");

        let err = DataSourceError::server(500, "database unavailable");
        assert_eq!(err.user_message("Save failed"), "database unavailable");
    }

    #[test]
    fn test_user_message_falls_back() {
        assert_eq!(
            DataSourceError::server(502, "  ").user_message("Save failed"),
            "Save failed"
        );
        assert_eq!(
            DataSourceError::network("connection refused").user_message("Save failed"),
            "Save failed"
        );
        assert_eq!(
            DataSourceError::parse("expected value").user_message("Load failed"),
            "Load failed"
        );
    }

    #[test]
    fn test_validation_error_converts_into_grid_error() {
        let err: GridError = ValidationError::RequiredFieldMissing {
            field: "name".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Required field missing: name");
    }
}
