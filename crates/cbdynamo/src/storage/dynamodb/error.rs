//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `TableError` from `cbdynamo_core`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use cbdynamo_core::error::classify_service_error;
use cbdynamo_core::TableError;

/// Map any operation's SDK error to TableError.
///
/// Requests that could not be built are validation errors, transport
/// failures are connection errors, and service errors are classified by
/// their error code.
pub fn map_sdk_error<E, R>(err: SdkError<E, R>, resource: &str) -> TableError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    match &err {
        SdkError::ConstructionFailure(_) => {
            TableError::Validation(format!("{resource}: {}", DisplayErrorContext(&err)))
        }
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            TableError::ConnectionFailed(format!("{resource}: {}", DisplayErrorContext(&err)))
        }
        _ => {
            let service = err.as_service_error();
            classify_service_error(
                service.and_then(|e| e.code()),
                service.and_then(|e| e.message()),
                resource,
            )
        }
    }
}

/// Map a request builder error to TableError.
pub fn map_build_error(err: impl std::fmt::Display) -> TableError {
    TableError::Validation(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::error::ConnectorError;
    use aws_sdk_dynamodb::operation::scan::ScanError;

    #[test]
    fn test_construction_failure_is_validation() {
        let err: SdkError<ScanError, ()> = SdkError::construction_failure("missing table name");

        let mapped = map_sdk_error(err, "messages");

        assert!(matches!(mapped, TableError::Validation(msg) if msg.starts_with("messages: ")));
    }

    #[test]
    fn test_timeout_is_connection_failed() {
        let err: SdkError<ScanError, ()> = SdkError::timeout_error("timed out");

        let mapped = map_sdk_error(err, "messages");

        assert!(matches!(
            mapped,
            TableError::ConnectionFailed(msg) if msg.starts_with("messages: ")
        ));
    }

    #[test]
    fn test_dispatch_failure_is_connection_failed() {
        let err: SdkError<ScanError, ()> =
            SdkError::dispatch_failure(ConnectorError::io("connection refused".into()));

        let mapped = map_sdk_error(err, "messages");

        assert!(matches!(
            mapped,
            TableError::ConnectionFailed(msg)
                if msg.starts_with("messages: ") && msg.contains("connection refused")
        ));
    }

    #[test]
    fn test_build_error_is_validation() {
        assert_eq!(
            map_build_error("key was not specified"),
            TableError::Validation("key was not specified".to_string())
        );
    }
}
