//! # AWS Error Classification
//!
//! Maps AWS SDK failures onto [`ErrorClass`] at the call site that produced
//! them.

use crate::error::ErrorClass;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::error::Error;
use std::fmt::Debug;

/// Service error codes that mean "try again later"
const RETRYABLE_CODES: &[&str] = &[
    "ThrottlingException",
    "Throttling",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "InternalServiceError",
    "InternalFailure",
    "InternalError",
    "ServiceUnavailable",
    "SlowDown",
    "RequestTimeout",
];

/// `GetSecretValue` failures that only concern the requested secret
///
/// `ResourceNotFoundException` covers secrets that have no value for
/// `AWSCURRENT`. `InvalidRequestException` is returned for secrets scheduled
/// for deletion. `DecryptionFailure` and `AccessDeniedException` come from a
/// per-secret KMS key or resource policy.
pub const FETCH_IGNORABLE_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "InvalidRequestException",
    "DecryptionFailure",
    "AccessDeniedException",
];

/// Classify a service error code
///
/// Codes listed in `ignorable` win over the retryable list. Unknown codes
/// are fatal.
#[must_use]
pub fn classify_code(code: Option<&str>, ignorable: &[&str]) -> ErrorClass {
    match code {
        Some(code) if ignorable.contains(&code) => ErrorClass::Ignorable,
        Some(code) if RETRYABLE_CODES.contains(&code) => ErrorClass::Retryable,
        _ => ErrorClass::Fatal,
    }
}

/// Classify any SDK error
///
/// Request construction failures (missing credentials or region) are fatal.
/// Timeouts, dispatch failures and unparseable responses are retryable.
/// Service errors are classified by their error code.
pub fn classify_sdk_error<E, R>(err: &SdkError<E, R>, ignorable: &[&str]) -> ErrorClass
where
    E: ProvideErrorMetadata,
{
    match err {
        SdkError::ConstructionFailure(_) => ErrorClass::Fatal,
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            ErrorClass::Retryable
        }
        _ => classify_code(
            err.as_service_error().and_then(|service| service.code()),
            ignorable,
        ),
    }
}

/// Full error chain as a single line
pub fn describe<E, R>(err: &SdkError<E, R>) -> String
where
    E: Error + 'static,
    R: Debug,
{
    DisplayErrorContext(err).to_string()
}
