//! Maps failures onto user-facing messages.
//!
//! [`classify`] is a pure function of the error shape. Rules are checked in a
//! fixed order: the "no response" cases first (a timeout has no status to
//! inspect), then specific status codes, then the generic fallback.

use crate::errors::{ErrorKind, PfolioError};
use serde::Serialize;

/// Broad category of a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    ColdStartTimeout,
    Connectivity,
    Validation,
    Unauthorized,
    Forbidden,
    EndpointNotFound,
    ServerError,
    ServiceUnavailable,
    Cancelled,
    Generic,
}

/// A category together with the message to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: MessageCategory,
    pub message: String,
}

impl Classification {
    fn new(category: MessageCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

const COLD_START_MESSAGE: &str = "Request timed out. The hosted backend may be starting up (this is normal for free hosting). Please wait about 30 seconds and try again.";
const CONNECTIVITY_MESSAGE: &str =
    "Unable to connect to the server. Please check your connection and that the backend is running.";
const VALIDATION_MESSAGE: &str = "The request was rejected. Please check the form and try again.";
const UNAUTHORIZED_MESSAGE: &str = "Invalid credentials. Please try again.";
const FORBIDDEN_MESSAGE: &str = "Access denied. Please log in again.";
const NOT_FOUND_MESSAGE: &str = "API endpoint not found. Please check the backend server.";
const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
const UNAVAILABLE_MESSAGE: &str =
    "Service unavailable. The hosted backend may be starting up, please try again shortly.";
const CANCELLED_MESSAGE: &str = "Request cancelled.";
const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Classifies `error`. First matching rule wins.
///
/// ```
/// use pfolio_client::PfolioError;
/// use pfolio_client::classify::{MessageCategory, classify};
///
/// let err = PfolioError::Api {
///     status_code: 404,
///     message: None,
///     body: "Not Found".to_string(),
/// };
/// assert_eq!(classify(&err).category, MessageCategory::EndpointNotFound);
/// ```
#[must_use]
pub fn classify(error: &PfolioError) -> Classification {
    use MessageCategory as C;

    match error {
        PfolioError::Timeout(_) => Classification::new(C::ColdStartTimeout, COLD_START_MESSAGE),
        PfolioError::Network(_) => Classification::new(C::Connectivity, CONNECTIVITY_MESSAGE),
        PfolioError::Api {
            status_code,
            message,
            ..
        } => {
            let server_message = message.as_deref();
            match status_code {
                400 => Classification::new(
                    C::Validation,
                    server_message.unwrap_or(VALIDATION_MESSAGE),
                ),
                401 => Classification::new(C::Unauthorized, UNAUTHORIZED_MESSAGE),
                403 => Classification::new(C::Forbidden, FORBIDDEN_MESSAGE),
                404 => Classification::new(C::EndpointNotFound, NOT_FOUND_MESSAGE),
                500 => Classification::new(C::ServerError, SERVER_ERROR_MESSAGE),
                503 => Classification::new(C::ServiceUnavailable, UNAVAILABLE_MESSAGE),
                other => Classification::new(
                    C::Generic,
                    server_message.map_or_else(
                        || format!("Request failed with status {other}. Please try again."),
                        String::from,
                    ),
                ),
            }
        }
        PfolioError::InvalidInput(message) => Classification::new(C::Validation, message.clone()),
        PfolioError::Cancelled => Classification::new(C::Cancelled, CANCELLED_MESSAGE),
        PfolioError::Parse(_) | PfolioError::ClientBuild(_) => {
            Classification::new(C::Generic, GENERIC_MESSAGE)
        }
    }
}

/// Shorthand for `classify(error).message`.
#[must_use]
pub fn user_message(error: &PfolioError) -> String {
    classify(error).message
}

/// Settled result of a single call, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOutcome {
    pub succeeded: bool,
    pub error_kind: Option<ErrorKind>,
    pub message: String,
}

impl RequestOutcome {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            error_kind: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_error(error: &PfolioError) -> Self {
        Self {
            succeeded: false,
            error_kind: Some(error.kind()),
            message: classify(error).message,
        }
    }

    /// Builds an outcome from a settled call, using `success_message` on `Ok`.
    #[must_use]
    pub fn from_result<T>(result: &Result<T, PfolioError>, success_message: &str) -> Self {
        match result {
            Ok(_) => Self::success(success_message),
            Err(e) => Self::from_error(e),
        }
    }
}
