use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Defines errors that can occur when talking to the portfolio backend.
///
/// The first three variants are the disjoint transport outcomes a caller needs
/// to tell apart when deciding whether a retry makes sense:
///
/// - [`PfolioError::Timeout`]: the request aborted locally, no response arrived
/// - [`PfolioError::Network`]: the transport never reached the server
/// - [`PfolioError::Api`]: the server answered with a non-2xx status
///
/// # Example: Handling Backend Errors
///
/// ```ignore
/// match client.list_skills().await {
///     Err(PfolioError::Timeout(after)) => {
///         tracing::warn!("Backend did not answer within {:?}", after);
///     }
///     Err(PfolioError::Api { status_code: 404, .. }) => {
///         tracing::error!("Skills endpoint missing, check the backend URL");
///     }
///     // ...
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PfolioError {
    /// Request exceeded its timeout and was aborted by the client.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Connection-level failure (DNS, refused connection, TLS, reset).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),
    /// The backend responded with a non-success status.
    #[error("Backend error (HTTP {status_code}): {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        /// HTTP status code (e.g., 400, 404, 503)
        status_code: u16,
        /// `message` or `error` field from a JSON error body, if present
        message: Option<String>,
        /// Truncated raw response body, kept for diagnostics
        body: String,
    },
    /// Response body did not match what the backend contract promised.
    #[error("Malformed response body: {0}")]
    Parse(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The caller cancelled the request or retry chain.
    #[error("Request cancelled")]
    Cancelled,
    /// Failed to build the HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Coarse classification of a [`PfolioError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    LocalTimeout,
    NetworkUnreachable,
    /// 4xx response
    ClientError,
    /// 5xx (or otherwise unexpected) response
    ServerError,
    Parse,
    InvalidInput,
    Cancelled,
    Internal,
}

impl PfolioError {
    /// Returns the coarse [`ErrorKind`] of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            PfolioError::Timeout(_) => ErrorKind::LocalTimeout,
            PfolioError::Network(_) => ErrorKind::NetworkUnreachable,
            PfolioError::Api { status_code, .. } if (400..500).contains(status_code) => {
                ErrorKind::ClientError
            }
            PfolioError::Api { .. } => ErrorKind::ServerError,
            PfolioError::Parse(_) => ErrorKind::Parse,
            PfolioError::InvalidInput(_) => ErrorKind::InvalidInput,
            PfolioError::Cancelled => ErrorKind::Cancelled,
            PfolioError::ClientBuild(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if the request was aborted locally by its timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, PfolioError::Timeout(_))
    }

    /// HTTP status code, if the backend answered at all.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            PfolioError::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Message supplied by the backend in a structured error body.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            PfolioError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if retrying the same request could plausibly succeed.
    ///
    /// Only local timeouts qualify. A hosted backend that is cold-starting
    /// answers eventually, while validation, auth and server errors come back
    /// the same on every attempt.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pfolio_client::PfolioError;
    /// use std::time::Duration;
    ///
    /// assert!(PfolioError::Timeout(Duration::from_secs(30)).is_retryable());
    ///
    /// let bad_request = PfolioError::Api {
    ///     status_code: 400,
    ///     message: Some("Skill name is required".to_string()),
    ///     body: String::new(),
    /// };
    /// assert!(!bad_request.is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.is_timeout()
    }
}
