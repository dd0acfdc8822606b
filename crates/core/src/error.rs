//! Table error taxonomy and the pure service error classifier.

use thiserror::Error;

/// Errors that can occur during table operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Maps a service error code to a [`TableError`].
///
/// `resource` names the table (or index) the request targeted and is used
/// in the message when the service does not provide one.
///
/// # Examples
///
/// ```
/// use cbdynamo_core::error::{classify_service_error, TableError};
///
/// let error = classify_service_error(Some("ResourceNotFoundException"), None, "messages");
/// assert!(matches!(error, TableError::NotFound(_)));
/// ```
pub fn classify_service_error(
    code: Option<&str>,
    message: Option<&str>,
    resource: &str,
) -> TableError {
    let detail = |fallback: &str| match message {
        Some(msg) if !msg.is_empty() => format!("{resource}: {msg}"),
        _ => format!("{resource}: {fallback}"),
    };

    match code {
        Some("ResourceNotFoundException") => {
            TableError::NotFound(detail("requested resource not found"))
        }
        Some("ValidationException") | Some("ParamValidationError") => {
            TableError::Validation(detail("invalid request parameters"))
        }
        Some("ProvisionedThroughputExceededException") => {
            TableError::RequestFailed(detail("Throughput exceeded, please retry"))
        }
        Some("RequestLimitExceeded") | Some("ThrottlingException") => {
            TableError::RequestFailed(detail("Request limit exceeded, please retry"))
        }
        Some("InternalServerError") => {
            TableError::RequestFailed(detail("DynamoDB internal server error"))
        }
        Some(other) => TableError::RequestFailed(detail(other)),
        None => TableError::RequestFailed(detail("unknown service error")),
    }
}
