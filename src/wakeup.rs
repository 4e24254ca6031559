//! Wake-up retry policy for cold-starting hosted backends.
//!
//! A request that times out against a sleeping backend is retried once: the
//! policy fires a liveness probe at the health endpoint, waits a grace period
//! so the backend can finish booting, and then re-runs the original request.
//! Only local timeouts trigger this path. Network failures and HTTP error
//! statuses propagate untouched on the first attempt.
//!
//! # Example
//!
//! ```no_run
//! use pfolio_client::{ApiRequest, Client};
//!
//! # async fn demo() -> Result<(), pfolio_client::PfolioError> {
//! let client = Client::new("https://pfolio-backend.onrender.com")?;
//! let skills = client
//!     .with_wakeup(|| client.fetch::<serde_json::Value>(ApiRequest::get("/skills/all")))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::Client;
use crate::config::WakeupConfig;
use crate::errors::PfolioError;
use crate::http::loud_wire;
use crate::request::ApiRequest;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Something that can tell whether a backend is hosted and nudge it awake.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Whether the target is a hosted backend that may be asleep.
    fn is_hosted(&self) -> bool;

    /// Fires a liveness probe. Returns `true` if the backend answered.
    ///
    /// The wake-up policy ignores the result; the request itself is the
    /// only thing that decides success.
    async fn probe(&self) -> bool;
}

#[async_trait]
impl LivenessProbe for Client {
    fn is_hosted(&self) -> bool {
        Client::is_hosted(self)
    }

    async fn probe(&self) -> bool {
        self.wake_up_backend().await
    }
}

impl Client {
    /// Sends a GET to the configured health path to wake a sleeping backend.
    ///
    /// Uses the probe timeout from [`WakeupConfig`] and bypasses intermediary
    /// caches. Never fails: the outcome is logged and returned as a flag.
    pub async fn wake_up_backend(&self) -> bool {
        let wakeup = &self.config.wakeup;
        let request = ApiRequest::get(wakeup.health_path.as_str())
            .timeout(wakeup.probe_timeout)
            .header("Cache-Control", "no-cache");

        info!("Waking up backend at {}", self.base_url);
        match self.send(request).await {
            Ok(_) => {
                info!("Backend answered the liveness probe");
                true
            }
            Err(e) => {
                debug!("Liveness probe failed: {e}");
                false
            }
        }
    }

    /// Runs `request_fn` under this client's [`WakeupPolicy`].
    ///
    /// # Errors
    ///
    /// Returns the last error from `request_fn` once the retry budget is spent,
    /// or the first non-timeout error unchanged.
    pub async fn with_wakeup<T, F, Fut>(&self, request_fn: F) -> Result<T, PfolioError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, PfolioError>> + Send,
    {
        self.with_wakeup_cancellable(&CancellationToken::new(), request_fn)
            .await
    }

    /// Like [`Client::with_wakeup`], but aborts with [`PfolioError::Cancelled`]
    /// when `cancel` fires, including during the probe and the grace period.
    ///
    /// # Errors
    ///
    /// See [`Client::with_wakeup`].
    pub async fn with_wakeup_cancellable<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        request_fn: F,
    ) -> Result<T, PfolioError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, PfolioError>> + Send,
    {
        WakeupPolicy::from_config(&self.config.wakeup)
            .run(self, cancel, request_fn)
            .await
    }
}

/// Retry-after-probe policy applied to timed-out requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeupPolicy {
    pub grace_period: Duration,
    pub max_retries: u32,
}

impl Default for WakeupPolicy {
    fn default() -> Self {
        Self::from_config(&WakeupConfig::default())
    }
}

impl WakeupPolicy {
    #[must_use]
    pub fn from_config(config: &WakeupConfig) -> Self {
        Self {
            grace_period: config.grace_period,
            max_retries: config.max_retries,
        }
    }

    /// Runs `request_fn`, retrying on local timeout while budget remains.
    ///
    /// Hosted backends are probed before each retry; local ones are not, but
    /// still get the grace period.
    ///
    /// # Errors
    ///
    /// - [`PfolioError::Cancelled`] if `cancel` fires
    /// - the final timeout once `max_retries` retries have been used
    /// - any non-timeout error, unchanged and without retrying
    pub async fn run<T, F, Fut>(
        &self,
        probe: &dyn LivenessProbe,
        cancel: &CancellationToken,
        mut request_fn: F,
    ) -> Result<T, PfolioError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, PfolioError>> + Send,
    {
        let mut retries_left = self.max_retries;
        let chain_id = loud_wire::next_request_id();

        loop {
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => Err(PfolioError::Cancelled),
                result = request_fn() => result,
            };

            match result {
                Err(error) if error.is_timeout() && retries_left > 0 => {
                    retries_left -= 1;
                    warn!("{error}; backend may be cold-starting, retrying");
                    let hosted = probe.is_hosted();
                    loud_wire::log_retry(
                        chain_id,
                        &format!(
                            "wake-up retry (probe: {hosted}, grace: {:?})",
                            self.grace_period
                        ),
                    );

                    if hosted {
                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => return Err(PfolioError::Cancelled),
                            awake = probe.probe() => debug!("Probe finished (awake: {awake})"),
                        }
                    }

                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(PfolioError::Cancelled),
                        () = tokio::time::sleep(self.grace_period) => {}
                    }
                }
                Err(error) if error.is_timeout() => {
                    warn!("{error}; wake-up retries exhausted");
                    return Err(error);
                }
                other => return other,
            }
        }
    }
}
