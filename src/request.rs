//! Request and response shapes for [`crate::Client::send`].

use crate::errors::PfolioError;
use crate::http::error_helpers::format_json_parse_error;
use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartBody),
}

#[derive(Debug, Clone, PartialEq)]
enum PartContent {
    Json(Value),
    File {
        file_name: String,
        content_type: Option<String>,
        bytes: Bytes,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct MultipartPart {
    name: String,
    content: PartContent,
}

/// A multipart form made of JSON metadata parts and file parts.
///
/// Unlike `reqwest::multipart::Form` this is `Clone`, so a retry policy can
/// re-send the same form.
///
/// ```
/// use pfolio_client::MultipartBody;
/// use serde_json::json;
///
/// let body = MultipartBody::new()
///     .json_part("project", json!({"title": "Portfolio"}))
///     .file_part("image", "cover.png", Some("image/png"), vec![0x89, 0x50]);
/// assert_eq!(body.part_names(), vec!["project", "image"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartBody {
    parts: Vec<MultipartPart>,
}

impl MultipartBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a part sent with `Content-Type: application/json`.
    #[must_use]
    pub fn json_part(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            content: PartContent::Json(value),
        });
        self
    }

    /// Adds a file part.
    #[must_use]
    pub fn file_part(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            content: PartContent::File {
                file_name: file_name.into(),
                content_type: content_type.map(String::from),
                bytes: bytes.into(),
            },
        });
        self
    }

    #[must_use]
    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub(crate) fn to_form(&self) -> Result<reqwest::multipart::Form, PfolioError> {
        use reqwest::multipart::{Form, Part};

        let mut form = Form::new();
        for part in &self.parts {
            let built = match &part.content {
                PartContent::Json(value) => Part::text(value.to_string())
                    .mime_str("application/json")
                    .map_err(|e| {
                        PfolioError::InvalidInput(format!("Invalid part '{}': {}", part.name, e))
                    })?,
                PartContent::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let file = Part::bytes(bytes.to_vec()).file_name(file_name.clone());
                    match content_type {
                        Some(mime) => file.mime_str(mime).map_err(|e| {
                            PfolioError::InvalidInput(format!(
                                "Invalid content type '{}' for part '{}': {}",
                                mime, part.name, e
                            ))
                        })?,
                        None => file,
                    }
                }
            };
            form = form.part(part.name.clone(), built);
        }
        Ok(form)
    }

    /// Short description for wire logging; file contents are never printed.
    pub(crate) fn describe(&self) -> String {
        let parts: Vec<String> = self
            .parts
            .iter()
            .map(|p| match &p.content {
                PartContent::Json(value) => format!("{}={}", p.name, value),
                PartContent::File {
                    file_name, bytes, ..
                } => format!("{}=<file {} ({} bytes)>", p.name, file_name, bytes.len()),
            })
            .collect();
        format!("multipart[{}]", parts.join(", "))
    }
}

/// A single request against the backend.
///
/// ```
/// use pfolio_client::ApiRequest;
/// use std::time::Duration;
///
/// let request = ApiRequest::get("/skills/all").timeout(Duration::from_secs(5));
/// assert_eq!(request.path(), "/skills/all");
/// assert_eq!(request.timeout_override(), Some(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: RequestBody,
    timeout: Option<Duration>,
    headers: Vec<(String, String)>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            timeout: None,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Serializes `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] if `body` cannot be represented as JSON.
    pub fn json_body<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, PfolioError> {
        let value = serde_json::to_value(body)
            .map_err(|e| PfolioError::InvalidInput(format!("Unserializable request body: {e}")))?;
        Ok(self.json(value))
    }

    #[must_use]
    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = RequestBody::Multipart(body);
        self
    }

    /// Overrides the client's default timeout for this call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn body(&self) -> &RequestBody {
        &self.body
    }

    #[must_use]
    pub const fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// No body (or only whitespace), e.g. from a DELETE.
    Empty,
    Json(Value),
    /// Non-JSON text such as "Skill added successfully".
    Text(String),
}

impl ResponsePayload {
    /// Interprets a 2xx response body.
    ///
    /// An empty body is never parsed. A body that parses as JSON becomes
    /// [`ResponsePayload::Json`] unless it was explicitly sent as non-JSON
    /// text. Anything else is kept as text; the backend labels plain
    /// confirmation strings `application/json`, so a mislabelled body only
    /// fails once a caller asks for JSON through [`ResponsePayload::into_json`].
    pub(crate) fn from_body(content_type: Option<&str>, bytes: &[u8]) -> Result<Self, PfolioError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| PfolioError::Parse(format!("Response body is not valid UTF-8: {e}")))?;
        if text.trim().is_empty() {
            return Ok(Self::Empty);
        }

        let declared_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
        match serde_json::from_str::<Value>(text) {
            Ok(value) if declared_json || content_type.is_none() => Ok(Self::Json(value)),
            Err(e) if declared_json => {
                warn!(
                    "Body declared as JSON is not JSON, keeping it as text: {}",
                    format_json_parse_error(text, &e)
                );
                Ok(Self::Text(text.to_string()))
            }
            _ => Ok(Self::Text(text.to_string())),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the body as JSON; `None` for an empty body, a JSON string for text.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::Json(value) => Some(value),
            Self::Text(text) => Some(Value::String(text)),
        }
    }

    /// Returns the body as text. JSON strings are unwrapped, other JSON is re-serialized.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Json(Value::String(s)) | Self::Text(s) => s,
            Self::Json(value) => value.to_string(),
        }
    }

    /// Deserializes the body into `T`.
    ///
    /// `context` names what was expected and ends up in the error message.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::Parse`] if the body is empty (and `T` cannot be
    /// built from `null`), is not JSON, or does not match `T`.
    pub fn into_json<T: DeserializeOwned>(self, context: &str) -> Result<T, PfolioError> {
        match self {
            Self::Empty => serde_json::from_value(Value::Null).map_err(|_| {
                PfolioError::Parse(format!("Expected {context}, got an empty response"))
            }),
            Self::Json(value) => serde_json::from_value(value)
                .map_err(|e| PfolioError::Parse(format!("Unexpected shape for {context}: {e}"))),
            Self::Text(text) => serde_json::from_str(&text).map_err(|e| {
                PfolioError::Parse(format!(
                    "Expected {context}, {}",
                    format_json_parse_error(&text, &e)
                ))
            }),
        }
    }
}
