//! Error taxonomy shared by every operation in the crate.

use thiserror::Error;

/// Failure talking to the storage service.
///
/// A backend call either yields its success payload or one of these; there
/// is no "unexpected response shape" left to inspect at runtime.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid backend response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl BackendError {
    /// HTTP status reported by the backend, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::Transport(e) => e.status().map(|s| s.as_u16()),
            BackendError::Decode(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} is required")]
    MissingArgument(&'static str),
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("content declared as {0} is not valid UTF-8")]
    InvalidText(String),
    #[error("file content exceeds the {limit} byte limit")]
    ContentTooLarge { limit: usize },
    #[error("file record {index} is missing `{field}`")]
    MalformedRecord { index: usize, field: &'static str },
    #[error("invalid file ID in URI: {0}")]
    MalformedUri(String),
    #[error("{context}: {source}")]
    Backend {
        context: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Wrap a backend failure with a description of what was being attempted.
    pub fn backend(context: &'static str) -> impl FnOnce(BackendError) -> Self {
        move |source| Error::Backend { context, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_keeps_cause_in_message() {
        let err = Error::backend("failed to stream file")(BackendError::Status {
            status: 404,
            body: "file not found".into(),
        });
        assert_eq!(
            err.to_string(),
            "failed to stream file: backend returned HTTP 404: file not found"
        );
        match err {
            Error::Backend { source, .. } => assert_eq!(source.status(), Some(404)),
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[test]
    fn encode_failure_keeps_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(cause);
        assert!(err.to_string().starts_with("failed to encode result: "));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn argument_errors_name_the_field() {
        assert_eq!(
            Error::MissingArgument("file_id").to_string(),
            "file_id is required"
        );
        assert_eq!(
            Error::invalid("limit", "expected a positive integer").to_string(),
            "invalid limit: expected a positive integer"
        );
    }
}
