use crate::runtime::schema::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal error codes surfaced to the orchestrating caller.
///
/// The set is fixed: callers key retry and rollback behavior off these
/// values, so handlers must map their faults onto one of them rather than
/// invent new codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    NotUpdatable,
    InvalidRequest,
    AccessDenied,
    InvalidCredentials,
    AlreadyExists,
    NotFound,
    ResourceConflict,
    Throttling,
    ServiceLimitExceeded,
    NotStabilized,
    GeneralServiceException,
    ServiceInternalError,
    NetworkFailure,
    InternalFailure,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Fault raised by a handler invocation.
///
/// Classification into an [`ErrorCode`] is a pure transformation on this
/// value ([`HandlerError::classify`]), so the processor's propagation logic
/// can be tested without any handler in the loop.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Fault the handler already mapped onto a terminal error code.
    #[error("{message}")]
    Declared { code: ErrorCode, message: String },

    /// Downstream service fault carrying an HTTP status family.
    #[error("downstream service error ({status}): {message}")]
    Service {
        status: u16,
        throttling: bool,
        message: String,
    },

    /// Anything the handler did not classify.
    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    pub fn declared<S: Into<String>>(code: ErrorCode, message: S) -> Self {
        HandlerError::Declared {
            code,
            message: message.into(),
        }
    }

    /// Creates a downstream service fault from an HTTP status.
    pub fn service<S: Into<String>>(status: u16, message: S) -> Self {
        HandlerError::Service {
            status,
            throttling: false,
            message: message.into(),
        }
    }

    /// Creates a downstream throttling fault regardless of status code.
    pub fn throttling<S: Into<String>>(message: S) -> Self {
        HandlerError::Service {
            status: 429,
            throttling: true,
            message: message.into(),
        }
    }

    /// Maps this fault to the terminal error code reported to the caller.
    ///
    /// Declared faults keep their code. Downstream faults classify by status
    /// family: 4xx is the caller's fault, 429 (or an explicit throttle
    /// signal) is back-pressure, 5xx is the service's fault, and anything
    /// outside those families is a general service exception. Unclassified
    /// faults are an internal failure of the provider.
    pub fn classify(&self) -> ErrorCode {
        match self {
            HandlerError::Declared { code, .. } => *code,
            HandlerError::Service {
                throttling: true, ..
            } => ErrorCode::Throttling,
            HandlerError::Service { status, .. } => match status {
                429 => ErrorCode::Throttling,
                400..=499 => ErrorCode::InvalidRequest,
                500..=599 => ErrorCode::ServiceInternalError,
                _ => ErrorCode::GeneralServiceException,
            },
            HandlerError::Other(_) => ErrorCode::InternalFailure,
        }
    }
}

/// Main error type for the request processor.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The inbound request is structurally unusable. Terminal and
    /// non-retryable; the handler is never invoked.
    #[error("malformed request: {0}")]
    Malformed(String),

    /// The raw desired-state payload failed schema validation.
    #[error("{}", .0.full_message())]
    Validation(#[from] ValidationError),

    /// The inbound payload could not be deserialized at all.
    #[error("failed to deserialize request: {0}")]
    Deserialization(String),

    /// The handler broke the invocation contract (e.g. IN_PROGRESS from a
    /// synchronous-only action).
    #[error("{0}")]
    Contract(String),

    /// Arming the continuation scheduler failed during hand-off.
    #[error("failed to arm continuation: {0}")]
    Scheduling(String),
}

impl ProcessorError {
    /// Terminal error code for the final report on this failure.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ProcessorError::Malformed(_)
            | ProcessorError::Validation(_)
            | ProcessorError::Deserialization(_) => ErrorCode::InvalidRequest,
            ProcessorError::Contract(_) => ErrorCode::InternalFailure,
            ProcessorError::Scheduling(_) => ErrorCode::ServiceInternalError,
        }
    }
}

/// Type alias for Result with ProcessorError
pub type Result<T> = std::result::Result<T, ProcessorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_faults_keep_their_code() {
        let fault = HandlerError::declared(ErrorCode::AlreadyExists, "bucket exists");
        assert_eq!(fault.classify(), ErrorCode::AlreadyExists);

        let fault = HandlerError::declared(ErrorCode::NotFound, "no such resource");
        assert_eq!(fault.classify(), ErrorCode::NotFound);
    }

    #[test]
    fn test_service_faults_classify_by_status_family() {
        assert_eq!(
            HandlerError::service(400, "bad field").classify(),
            ErrorCode::InvalidRequest
        );
        assert_eq!(
            HandlerError::service(403, "denied").classify(),
            ErrorCode::InvalidRequest
        );
        assert_eq!(
            HandlerError::service(429, "slow down").classify(),
            ErrorCode::Throttling
        );
        assert_eq!(
            HandlerError::service(500, "boom").classify(),
            ErrorCode::ServiceInternalError
        );
        assert_eq!(
            HandlerError::service(503, "unavailable").classify(),
            ErrorCode::ServiceInternalError
        );
        assert_eq!(
            HandlerError::service(302, "redirect").classify(),
            ErrorCode::GeneralServiceException
        );
    }

    #[test]
    fn test_explicit_throttle_signal_wins_over_status() {
        let fault = HandlerError::Service {
            status: 400,
            throttling: true,
            message: "rate exceeded".to_string(),
        };
        assert_eq!(fault.classify(), ErrorCode::Throttling);
    }

    #[test]
    fn test_unclassified_faults_are_internal() {
        assert_eq!(
            HandlerError::Other("wat".to_string()).classify(),
            ErrorCode::InternalFailure
        );
    }

    #[test]
    fn test_processor_error_codes() {
        assert_eq!(
            ProcessorError::Malformed("no endpoint".to_string()).error_code(),
            ErrorCode::InvalidRequest
        );
        assert_eq!(
            ProcessorError::Contract("READ returned IN_PROGRESS".to_string()).error_code(),
            ErrorCode::InternalFailure
        );
        assert_eq!(
            ProcessorError::Scheduling("putRule refused".to_string()).error_code(),
            ErrorCode::ServiceInternalError
        );
    }
}
