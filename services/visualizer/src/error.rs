//! Request-scoped error types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::ErrorResponse;

/// Visualizer error types
#[derive(Debug, Error)]
pub enum VisualizerError {
    /// A requested group or measure column is unusable for the request
    #[error("Invalid column '{column}': {reason}")]
    InvalidColumn {
        /// Offending column name
        column: String,
        /// Why the column was rejected
        reason: String,
    },

    /// Unrecognized aggregation verb
    #[error("Invalid aggregation verb: '{0}'")]
    InvalidVerb(String),

    /// Dataset storage unreadable or malformed
    #[error("Dataset load failed: {0}")]
    DatasetLoad(String),
}

impl VisualizerError {
    /// Column absent from the table
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::InvalidColumn {
            column: column.into(),
            reason: "column not found in dataset".to_string(),
        }
    }

    /// Column present but holding values the verb cannot reduce
    pub fn non_numeric_column(column: impl Into<String>) -> Self {
        Self::InvalidColumn {
            column: column.into(),
            reason: "column is not numeric".to_string(),
        }
    }

    /// Stable error code exposed to clients
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidColumn { .. } => "INVALID_COLUMN",
            Self::InvalidVerb(_) => "INVALID_VERB",
            Self::DatasetLoad(_) => "DATASET_LOAD_FAILED",
        }
    }

    /// HTTP status the error maps to
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidColumn { .. } | Self::InvalidVerb(_) => StatusCode::BAD_REQUEST,
            Self::DatasetLoad(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<FxHashMap<String, String>> {
        match self {
            Self::InvalidColumn { column, .. } => {
                Some([("column".to_string(), column.clone())].into_iter().collect())
            }
            Self::InvalidVerb(verb) => {
                Some([("verb".to_string(), verb.clone())].into_iter().collect())
            }
            Self::DatasetLoad(_) => None,
        }
    }
}

impl From<csv::Error> for VisualizerError {
    fn from(err: csv::Error) -> Self {
        Self::DatasetLoad(err.to_string())
    }
}

impl IntoResponse for VisualizerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            VisualizerError::missing_column("petal").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            VisualizerError::InvalidVerb("avg".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            VisualizerError::DatasetLoad("gone".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_names_column() {
        let err = VisualizerError::non_numeric_column("species");
        assert_eq!(err.code(), "INVALID_COLUMN");
        assert!(err.to_string().contains("'species'"));
        assert!(err.to_string().contains("not numeric"));
    }
}
