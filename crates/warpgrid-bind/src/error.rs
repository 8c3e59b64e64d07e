//! Error types for request binding.

use thiserror::Error;

/// Result type alias for binding operations.
pub type BindResult<T> = Result<T, BindError>;

/// Client-facing classification of a [`BindError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself is malformed; surface to the caller as a 400.
    BadRequest,
    /// The destination record is declared incorrectly; fix the schema.
    Internal,
}

impl ErrorClass {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorClass::BadRequest => 400,
            ErrorClass::Internal => 500,
        }
    }
}

/// Errors that can occur while binding a request into a record.
///
/// Every error aborts the bind immediately. Fields bound before the
/// failure keep their new values.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid binding target, expected a mutable reference to {expected}")]
    InvalidTarget { expected: &'static str },

    #[error("invalid binding annotation {annotation:?} for field {field}")]
    InvalidAnnotation { field: String, annotation: String },

    #[error("invalid param location {source_kind:?} for field {field}")]
    UnknownSourceKind { field: String, source_kind: String },

    #[error("failed decoding body: {0}")]
    PayloadDecode(#[from] base64::DecodeError),

    #[error("invalid request body: {0}")]
    PayloadParse(#[from] serde_json::Error),

    #[error("request body of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("{field} must be a valid integer")]
    NotAnInteger { field: String },

    #[error("{field} must be a valid, positive integer")]
    NotAPositiveInteger { field: String },

    #[error("{field} must be a valid floating point number")]
    NotANumber { field: String },

    #[error("{field} must be a valid RFC 3339 timestamp")]
    InvalidTimestamp { field: String },
}

impl BindError {
    pub fn class(&self) -> ErrorClass {
        match self {
            BindError::InvalidTarget { .. }
            | BindError::InvalidAnnotation { .. }
            | BindError::UnknownSourceKind { .. } => ErrorClass::Internal,
            BindError::PayloadDecode(_)
            | BindError::PayloadParse(_)
            | BindError::PayloadTooLarge { .. }
            | BindError::NotAnInteger { .. }
            | BindError::NotAPositiveInteger { .. }
            | BindError::NotANumber { .. }
            | BindError::InvalidTimestamp { .. } => ErrorClass::BadRequest,
        }
    }

    /// HTTP status the routing layer should answer with.
    pub fn status_code(&self) -> u16 {
        self.class().status_code()
    }

    /// True for errors caused by the record declaration rather than the request.
    pub fn is_configuration(&self) -> bool {
        self.class() == ErrorClass::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_errors_are_bad_requests() {
        let err = BindError::NotAnInteger {
            field: "size".into(),
        };
        assert_eq!(err.class(), ErrorClass::BadRequest);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "size must be a valid integer");
    }

    #[test]
    fn unsigned_message_mentions_positive() {
        let err = BindError::NotAPositiveInteger {
            field: "page".into(),
        };
        assert_eq!(err.to_string(), "page must be a valid, positive integer");
    }

    #[test]
    fn configuration_errors_are_internal() {
        let err = BindError::UnknownSourceKind {
            field: "id".into(),
            source_kind: "cookie".into(),
        };
        assert!(err.is_configuration());
        assert_eq!(err.status_code(), 500);
        assert_eq!(
            err.to_string(),
            "invalid param location \"cookie\" for field id"
        );
    }

    #[test]
    fn payload_parse_error_wraps_json_message() {
        let json_err = serde_json::from_slice::<u32>(b"{").unwrap_err();
        let err = BindError::from(json_err);
        assert_eq!(err.class(), ErrorClass::BadRequest);
        assert!(err.to_string().starts_with("invalid request body: "));
    }

    #[test]
    fn error_is_std_error() {
        let err = BindError::InvalidTarget { expected: "Input" };
        let _: &dyn std::error::Error = &err;
    }
}
