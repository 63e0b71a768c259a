//! Error taxonomy and classification.
//!
//! Every failure that crosses the core boundary is a [`DomainError`] carrying
//! one of a closed set of [`ErrorKind`]s. Provider crates distill their SDK
//! failures into [`ApiError`] values (code, HTTP status, request id, message)
//! and [`classify`] maps those — or any other error — onto the taxonomy.

use std::fmt;
use thiserror::Error;

/// Boxed error used for cause chains and classification input.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, DomainError>;

/// Closed classification taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Configuration,
    NotFound,
    Throttling,
    Permission,
    Timeout,
    Unknown,
}

impl ErrorKind {
    /// Transient kinds are the only ones the retry engine retries by default.
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::Throttling | ErrorKind::Timeout)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Configuration => "configuration",
            ErrorKind::NotFound => "not found",
            ErrorKind::Throttling => "throttling",
            ErrorKind::Permission => "permission",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Terminal error artifact surfaced to command callers.
///
/// `request_id` and the cause chain are advisory diagnostics; the classified
/// `kind` never depends on whether they are shown.
#[derive(Error, Debug)]
#[error("{operation}: {message}")]
pub struct DomainError {
    pub kind: ErrorKind,
    pub message: String,
    pub operation: String,
    pub resource_id: Option<String>,
    pub request_id: Option<String>,
    #[source]
    pub cause: Option<BoxError>,
}

impl DomainError {
    pub fn new(kind: ErrorKind, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            operation: operation.into(),
            resource_id: None,
            request_id: None,
            cause: None,
        }
    }

    pub fn configuration(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, operation, message)
    }

    pub fn validation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, operation, message)
    }

    pub fn timeout(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, operation, message)
    }

    pub fn with_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// Provider-neutral raw API failure, distilled from an SDK error before
/// classification. `message` is preserved verbatim.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ApiError {
    pub code: Option<String>,
    pub status: Option<u16>,
    pub request_id: Option<String>,
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: None,
            request_id: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

const NOT_FOUND_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "NotFoundException",
    "NoSuchBucket",
    "NoSuchKey",
    "NoSuchQueue",
    "QueueDoesNotExist",
];

const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "RequestThrottled",
    "RequestThrottledException",
    "TooManyRequestsException",
    "SlowDown",
    "EC2ThrottledException",
];

const PERMISSION_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "UnauthorizedOperation",
    "UnauthorizedAccess",
    "AuthFailure",
    "Forbidden",
];

const TIMEOUT_CODES: &[&str] = &["RequestTimeout", "RequestTimeoutException"];

fn code_matches(api: &ApiError, table: &[&str]) -> bool {
    api.code.as_deref().is_some_and(|c| table.contains(&c))
}

fn text_matches(api: &ApiError, needles: &[&str]) -> bool {
    let text = api.message.to_ascii_lowercase();
    needles.iter().any(|n| text.contains(n))
}

fn is_not_found(api: &ApiError) -> bool {
    code_matches(api, NOT_FOUND_CODES)
        // EC2 uses per-resource codes like InvalidInstanceID.NotFound
        || api.code.as_deref().is_some_and(|c| c.ends_with("NotFound"))
        || api.status == Some(404)
        || text_matches(api, &["not found", "does not exist", "no such"])
}

fn is_throttling(api: &ApiError) -> bool {
    code_matches(api, THROTTLING_CODES)
        || api.status == Some(429)
        || text_matches(api, &["throttl", "rate exceeded", "too many requests", "slow down"])
}

fn is_permission(api: &ApiError) -> bool {
    code_matches(api, PERMISSION_CODES)
        || matches!(api.status, Some(401) | Some(403))
        || text_matches(api, &["access denied", "not authorized", "unauthorized", "forbidden"])
}

fn is_timeout(api: &ApiError) -> bool {
    code_matches(api, TIMEOUT_CODES)
        || matches!(api.status, Some(408) | Some(504))
        || text_matches(api, &["timed out", "timeout"])
}

/// Decide the taxonomy kind for a raw API failure.
///
/// Evaluation order is fixed: NotFound, Throttling, Permission, Timeout,
/// then Unknown. Signals are taken from the error code first, then the HTTP
/// status, then case-insensitive message text.
pub fn kind_of(api: &ApiError) -> ErrorKind {
    if is_not_found(api) {
        ErrorKind::NotFound
    } else if is_throttling(api) {
        ErrorKind::Throttling
    } else if is_permission(api) {
        ErrorKind::Permission
    } else if is_timeout(api) {
        ErrorKind::Timeout
    } else {
        ErrorKind::Unknown
    }
}

/// Classify an arbitrary failure into a [`DomainError`].
///
/// An [`ApiError`] anywhere in the source chain drives the decision; a value
/// that is already a `DomainError` passes through unchanged. Anything
/// unrecognized collapses to `Unknown` with the original message preserved
/// verbatim. Never panics.
pub fn classify(raw: BoxError, operation: &str, resource_id: Option<&str>) -> DomainError {
    let raw = match raw.downcast::<DomainError>() {
        Ok(domain) => return *domain,
        Err(raw) => raw,
    };

    let (kind, message, request_id) = match find_api_error(raw.as_ref()) {
        Some(api) => (kind_of(api), api.message.clone(), api.request_id.clone()),
        None => {
            let text = raw.to_string();
            let probe = ApiError::new(text.clone());
            (kind_of(&probe), text, None)
        }
    };

    DomainError {
        kind,
        message,
        operation: operation.to_string(),
        resource_id: resource_id.map(str::to_owned),
        request_id,
        cause: Some(raw),
    }
}

fn find_api_error<'a>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a ApiError> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(api) = e.downcast_ref::<ApiError>() {
            return Some(api);
        }
        current = e.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(api: ApiError) -> BoxError {
        Box::new(api)
    }

    #[test]
    fn throttle_code_classifies_as_throttling() {
        let err = boxed(ApiError::new("Rate exceeded").with_code("ThrottlingException"));
        let domain = classify(err, "DescribeInstances", None);
        assert_eq!(domain.kind, ErrorKind::Throttling);
        assert_eq!(domain.message, "Rate exceeded");
    }

    #[test]
    fn not_found_wins_over_other_signals() {
        // A 404 with throttling-looking text must still be NotFound.
        let err = boxed(
            ApiError::new("resource throttled away")
                .with_code("InvalidInstanceID.NotFound")
                .with_status(404),
        );
        assert_eq!(classify(err, "op", None).kind, ErrorKind::NotFound);
    }

    #[test]
    fn status_signals_classify_without_codes() {
        let cases = [
            (404, ErrorKind::NotFound),
            (429, ErrorKind::Throttling),
            (403, ErrorKind::Permission),
            (401, ErrorKind::Permission),
            (408, ErrorKind::Timeout),
        ];
        for (status, expected) in cases {
            let err = boxed(ApiError::new("opaque").with_status(status));
            assert_eq!(classify(err, "op", None).kind, expected, "status {status}");
        }
    }

    #[test]
    fn message_text_is_a_fallback_signal() {
        let err = boxed(ApiError::new("User is not authorized to perform ec2:StopInstances"));
        assert_eq!(classify(err, "StopInstances", None).kind, ErrorKind::Permission);
    }

    #[test]
    fn unstructured_error_collapses_to_unknown_with_message_preserved() {
        let raw: BoxError = Box::new(std::io::Error::other("connection reset by peer"));
        let domain = classify(raw, "ListQueues", None);
        assert_eq!(domain.kind, ErrorKind::Unknown);
        assert_eq!(domain.message, "connection reset by peer");
    }

    #[test]
    fn api_error_is_found_through_the_source_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("wrapper")]
        struct Wrapper(#[source] ApiError);

        let raw: BoxError = Box::new(Wrapper(ApiError::new("denied").with_code("AccessDenied")));
        assert_eq!(classify(raw, "op", None).kind, ErrorKind::Permission);
    }

    #[test]
    fn domain_error_passes_through_unchanged() {
        let original = DomainError::timeout("deadline", "operation timed out after 5s");
        let classified = classify(Box::new(original), "outer-op", Some("i-123"));
        assert_eq!(classified.kind, ErrorKind::Timeout);
        // Passthrough keeps the original operation, not the reclassifying one.
        assert_eq!(classified.operation, "deadline");
        assert!(classified.resource_id.is_none());
    }

    #[test]
    fn resource_and_request_ids_are_attached() {
        let err = boxed(
            ApiError::new("The specified queue does not exist")
                .with_code("QueueDoesNotExist")
                .with_request_id("req-42"),
        );
        let domain = classify(err, "GetQueueUrl", Some("orders"));
        assert_eq!(domain.kind, ErrorKind::NotFound);
        assert_eq!(domain.resource_id.as_deref(), Some("orders"));
        assert_eq!(domain.request_id.as_deref(), Some("req-42"));
    }

    #[test]
    fn transient_kinds() {
        assert!(ErrorKind::Throttling.is_transient());
        assert!(ErrorKind::Timeout.is_transient());
        assert!(!ErrorKind::Permission.is_transient());
        assert!(!ErrorKind::Validation.is_transient());
        assert!(!ErrorKind::Unknown.is_transient());
    }
}
