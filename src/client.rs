use crate::PfolioError;
use crate::config::{ClientConfig, ConfirmedRetryConfig, Hosting, Timeouts, WakeupConfig};
use crate::http::common::construct_url;
use crate::http::error_helpers::{check_response, transport_error};
use crate::http::loud_wire;
use crate::request::{ApiRequest, RequestBody, ResponsePayload};
use reqwest::Client as ReqwestClient;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Client for the portfolio backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) config: Arc<ClientConfig>,
    /// Validated base URL without a trailing slash
    pub(crate) base_url: String,
    #[allow(clippy::struct_field_names)]
    pub(crate) http_client: ReqwestClient,
}

/// Builder for `Client` instances.
///
/// # Example
///
/// ```
/// use pfolio_client::Client;
/// use std::time::Duration;
///
/// let client = Client::builder("https://pfolio-backend.onrender.com")
///     .connect_timeout(Duration::from_secs(10))
///     .wakeup_grace_period(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert!(client.is_hosted());
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Replaces all per-call timeout presets.
    #[must_use]
    pub const fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.config.timeouts = timeouts;
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is the maximum time to wait for establishing a connection to the server.
    /// If not set, uses reqwest's default.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Replaces the wake-up retry settings.
    #[must_use]
    pub fn wakeup(mut self, wakeup: WakeupConfig) -> Self {
        self.config.wakeup = wakeup;
        self
    }

    /// Sets how long to wait after a wake-up probe before retrying.
    #[must_use]
    pub const fn wakeup_grace_period(mut self, grace_period: Duration) -> Self {
        self.config.wakeup.grace_period = grace_period;
        self
    }

    /// Replaces the user-confirmed retry settings.
    #[must_use]
    pub const fn confirmed_retry(mut self, confirmed_retry: ConfirmedRetryConfig) -> Self {
        self.config.confirmed_retry = confirmed_retry;
        self
    }

    /// Overrides hosted/local detection.
    #[must_use]
    pub const fn hosting(mut self, hosting: Hosting) -> Self {
        self.config.hosting = hosting;
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// Builds the `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] for a bad base URL or header, and
    /// [`PfolioError::ClientBuild`] if the HTTP client cannot be initialized.
    pub fn build(self) -> Result<Client, PfolioError> {
        Client::from_config(self.config)
    }
}

impl Client {
    /// Creates a new builder targeting `base_url`.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            config: ClientConfig::new(base_url),
        }
    }

    /// Creates a client with default settings.
    ///
    /// # Errors
    ///
    /// See [`ClientBuilder::build`].
    pub fn new(base_url: impl Into<String>) -> Result<Self, PfolioError> {
        Self::builder(base_url).build()
    }

    /// Creates a client from environment variables (see [`crate::config`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds malformed values.
    pub fn from_env() -> Result<Self, PfolioError> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Creates a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// See [`ClientBuilder::build`].
    pub fn from_config(config: ClientConfig) -> Result<Self, PfolioError> {
        let base_url = config.normalized_base_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                PfolioError::InvalidInput(format!("Invalid header name '{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                PfolioError::InvalidInput(format!(
                    "Invalid value for header '{}': {e}",
                    name.as_str()
                ))
            })?;
            headers.insert(name, value);
        }

        let mut builder = ReqwestClient::builder().default_headers(headers);
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| PfolioError::ClientBuild(e.to_string()))?;

        debug!("Client configured for {base_url}");

        Ok(Self {
            config: Arc::new(config),
            base_url,
            http_client,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `request` and returns the response body.
    ///
    /// # Errors
    ///
    /// - [`PfolioError::InvalidInput`] for an empty path (no I/O happens)
    /// - [`PfolioError::Timeout`] if the call exceeds its timeout
    /// - [`PfolioError::Network`] if the backend could not be reached
    /// - [`PfolioError::Api`] for a non-2xx status
    /// - [`PfolioError::Parse`] if a JSON body is malformed
    pub async fn send(&self, request: ApiRequest) -> Result<ResponsePayload, PfolioError> {
        self.execute(request).await
    }

    /// Like [`Client::send`], but resolves to [`PfolioError::Cancelled`] as
    /// soon as `cancel` fires.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn send_with_cancel(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ResponsePayload, PfolioError> {
        let path = request.path().to_string();
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Request to {path} cancelled");
                Err(PfolioError::Cancelled)
            }
            result = self.execute(request) => result,
        }
    }

    /// Sends `request` and deserializes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// See [`Client::send`]; a body that does not match `T` is [`PfolioError::Parse`].
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, PfolioError> {
        let path = request.path().to_string();
        let payload = self.send(request).await?;
        payload.into_json(&path).inspect_err(|e| {
            warn!("Backend contract mismatch on {path}: {e}");
        })
    }

    /// Sends `request` and returns the body as text (empty for no body).
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn fetch_text(&self, request: ApiRequest) -> Result<String, PfolioError> {
        Ok(self.send(request).await?.into_text())
    }

    /// Sends `request` and discards the body.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn fetch_unit(&self, request: ApiRequest) -> Result<(), PfolioError> {
        self.send(request).await.map(|_| ())
    }

    async fn execute(&self, request: ApiRequest) -> Result<ResponsePayload, PfolioError> {
        let url = construct_url(&self.base_url, request.path())?;
        let timeout = request
            .timeout_override()
            .unwrap_or(self.config.timeouts.standard);
        let method = request.method().clone();

        let request_id = loud_wire::next_request_id();
        let body_preview = match request.body() {
            RequestBody::Empty => None,
            RequestBody::Json(value) => Some(value.to_string()),
            RequestBody::Multipart(form) => Some(form.describe()),
        };
        loud_wire::log_request(request_id, method.as_str(), &url, body_preview.as_deref());
        debug!("{} {} (timeout {:?})", method, url, timeout);

        let mut builder = self.http_client.request(method.clone(), &url).timeout(timeout);
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(form.to_form()?),
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = transport_error(e, timeout);
                loud_wire::log_failure(request_id, &error.to_string());
                debug!("{} {} failed: {}", method, url, error);
                return Err(error);
            }
        };

        let status = response.status().as_u16();
        loud_wire::log_response_status(request_id, status);

        let response = check_response(response).await.inspect_err(|e| {
            debug!("{} {} rejected: {}", method, url, e);
        })?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        loud_wire::log_response_body(request_id, &String::from_utf8_lossy(&bytes));

        ResponsePayload::from_body(content_type.as_deref(), &bytes).inspect_err(|e| {
            warn!("Malformed response from {} {}: {}", method, url, e);
        })
    }
}
