//! Error types for boxauth
//!
//! Every failure path of the token lifecycle and response decoding
//! pipeline is normalized into [`SdkError`], so callers can pattern-match
//! on the outcome without knowing which stage produced it.

use std::fmt;

use thiserror::Error;

/// Main error type for boxauth operations
///
/// Errors are terminal: nothing inside this crate retries or substitutes a
/// default value after one of these is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SdkError {
    /// No response was obtained (DNS, connect, timeout, reset)
    #[error("Network failure: {0}")]
    Network(String),

    /// The server answered with a status outside `200..=299`
    #[error("HTTP status {status}: {}", body.as_deref().unwrap_or("<empty body>"))]
    HttpStatus {
        /// HTTP status code returned by the server
        status: u16,
        /// Raw response body, kept for diagnostics
        body: Option<String>,
    },

    /// The body was present but did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(DecodeError),

    /// A successful response carried no body where one was required
    #[error("Response body was empty")]
    EmptyBody,

    /// Free-form failure message
    #[error("{0}")]
    Custom(String),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SdkError {
    /// Returns the HTTP status code for [`SdkError::HttpStatus`] errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<DecodeError> for SdkError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

/// Classification of a decode failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// A required key was absent
    KeyNotFound,
    /// A value had the wrong type, or a required collection was empty
    TypeMismatch,
    /// The body was not well-formed JSON
    Malformed,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound => write!(f, "key not found"),
            Self::TypeMismatch => write!(f, "type mismatch"),
            Self::Malformed => write!(f, "malformed body"),
        }
    }
}

/// Details of a body that could not be decoded into the target type
///
/// `key` names the offending field when it can be derived and `path` is
/// the dotted location inside the document (`"."` for the root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// What went wrong
    pub kind: DecodeErrorKind,
    /// Offending key, when known
    pub key: Option<String>,
    /// Location of the failure inside the document
    pub path: String,
    /// Underlying decoder message
    pub message: String,
}

impl DecodeError {
    /// Builds a type-mismatch error for `key`, used when a required
    /// collection is empty.
    pub fn type_mismatch(key: &str) -> Self {
        Self {
            kind: DecodeErrorKind::TypeMismatch,
            key: Some(key.to_string()),
            path: key.to_string(),
            message: format!("expected at least one value for `{key}`"),
        }
    }

    /// Converts a path-tracking serde_json failure into a [`DecodeError`].
    pub fn from_path_error(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        let inner = err.into_inner();
        Self::classify(&inner, path)
    }

    /// Converts a serde_json failure raised outside a path-tracking
    /// decode (trailing bytes, for instance) into a [`DecodeError`].
    pub fn from_json_error(err: &serde_json::Error) -> Self {
        Self::classify(err, ".".to_string())
    }

    fn classify(err: &serde_json::Error, path: String) -> Self {
        use serde_json::error::Category;

        let message = err.to_string();
        let (kind, key) = match err.classify() {
            Category::Data if message.starts_with("missing field") => {
                (DecodeErrorKind::KeyNotFound, backticked(&message))
            }
            Category::Data => (DecodeErrorKind::TypeMismatch, last_segment(&path)),
            Category::Syntax | Category::Eof | Category::Io => (DecodeErrorKind::Malformed, None),
        };

        Self {
            kind,
            key,
            path,
            message,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} `{}` at {}: {}", self.kind, key, self.path, self.message),
            None => write!(f, "{} at {}: {}", self.kind, self.path, self.message),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Extracts the first `` `quoted` `` token from a serde message.
fn backticked(message: &str) -> Option<String> {
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    Some(message[start..start + len].to_string())
}

fn last_segment(path: &str) -> Option<String> {
    path.rsplit('.')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Result type alias for boxauth operations
pub type Result<T> = std::result::Result<T, SdkError>;
