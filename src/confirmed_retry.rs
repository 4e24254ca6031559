//! User-confirmed retry loop for long-running actions.
//!
//! Sending a reply e-mail can legitimately take close to a minute against a
//! cold hosted backend. When such a call times out, the user is asked whether
//! to try again; each confirmed retry waits a little longer than the last.
//!
//! ```text
//! Idle -> InFlight -> Success
//!             |
//!             v
//!          TimedOut -> InFlight   (confirmed, attempts left)
//!             |
//!             v
//!           Failed                (declined or exhausted)
//! ```

use crate::classify::classify;
use crate::config::ConfirmedRetryConfig;
use crate::errors::PfolioError;
use crate::http::loud_wire;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shown when every permitted retry timed out.
pub const EXHAUSTED_MESSAGE: &str = "Request timeout after multiple attempts. The hosted backend may be experiencing issues. Please try again later.";

/// Shown when the user chose not to retry.
pub const DECLINED_MESSAGE: &str =
    "Request stopped after a timeout. The hosted backend may still be waking up; try again in a moment.";

/// Capability to ask the user a yes/no question.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

#[async_trait]
impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Retry bookkeeping. `attempt` counts retries already made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    pub attempt: u32,
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl RetryContext {
    #[must_use]
    pub const fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            backoff_step,
        }
    }

    #[must_use]
    pub const fn can_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Consumes one retry and returns the delay to wait before it.
    ///
    /// Returns `None` without changing state once the budget is spent.
    pub fn advance(&mut self) -> Option<Duration> {
        if !self.can_retry() {
            return None;
        }
        self.attempt += 1;
        Some(self.backoff_step.saturating_mul(self.attempt))
    }
}

/// Observable state of a [`ConfirmedRetry`] run.
///
/// `attempt` is the 1-based number of the send in flight or just finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    InFlight { attempt: u32 },
    TimedOut { attempt: u32 },
    Success,
    Failed,
}

/// Terminal failure of a [`ConfirmedRetry`] run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfirmedRetryError {
    /// Every permitted attempt timed out.
    #[error("Request timed out after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        source: PfolioError,
    },
    /// The user declined the retry offered after `attempt`.
    #[error("Retry declined after attempt {attempt}")]
    Declined {
        attempt: u32,
        #[source]
        source: PfolioError,
    },
    /// A non-timeout failure, or cancellation.
    #[error(transparent)]
    Failed(#[from] PfolioError),
}

impl ConfirmedRetryError {
    /// The error returned by the last attempt.
    #[must_use]
    pub fn last_error(&self) -> &PfolioError {
        match self {
            Self::Exhausted { source, .. } | Self::Declined { source, .. } => source,
            Self::Failed(error) => error,
        }
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Exhausted { .. } => EXHAUSTED_MESSAGE.to_string(),
            Self::Declined { .. } => DECLINED_MESSAGE.to_string(),
            Self::Failed(error) => classify(error).message,
        }
    }
}

/// Bounded retry loop that asks before every retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedRetry {
    /// Retries permitted after the first attempt.
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl Default for ConfirmedRetry {
    fn default() -> Self {
        Self::from_config(&ConfirmedRetryConfig::default())
    }
}

impl ConfirmedRetry {
    #[must_use]
    pub const fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts,
            backoff_step,
        }
    }

    #[must_use]
    pub const fn from_config(config: &ConfirmedRetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_step)
    }

    /// Prompt offered before the next retry.
    #[must_use]
    pub fn prompt_for(&self, ctx: &RetryContext) -> String {
        format!(
            "Request timeout (hosted backend may be sleeping). Retry attempt {}/{}?",
            ctx.attempt + 1,
            ctx.max_attempts
        )
    }

    /// Runs `action`, offering a retry through `confirm` after each timeout.
    ///
    /// # Errors
    ///
    /// See [`ConfirmedRetry::run_observed`].
    pub async fn run<T, A, Fut>(
        &self,
        confirm: &dyn Confirm,
        action: A,
    ) -> Result<T, ConfirmedRetryError>
    where
        A: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, PfolioError>> + Send,
    {
        self.run_observed(confirm, &CancellationToken::new(), action, |_| {})
            .await
    }

    /// Like [`ConfirmedRetry::run`], reporting each [`RetryState`] to
    /// `on_state` and stopping when `cancel` fires.
    ///
    /// # Errors
    ///
    /// - [`ConfirmedRetryError::Exhausted`] when the last permitted attempt timed out
    /// - [`ConfirmedRetryError::Declined`] when the user refused a retry
    /// - [`ConfirmedRetryError::Failed`] for any other error, including
    ///   [`PfolioError::Cancelled`]
    pub async fn run_observed<T, A, Fut, S>(
        &self,
        confirm: &dyn Confirm,
        cancel: &CancellationToken,
        mut action: A,
        mut on_state: S,
    ) -> Result<T, ConfirmedRetryError>
    where
        A: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, PfolioError>> + Send,
        S: FnMut(RetryState) + Send,
    {
        let mut ctx = RetryContext::new(self.max_attempts, self.backoff_step);
        let chain_id = loud_wire::next_request_id();
        on_state(RetryState::Idle);

        loop {
            let attempt = ctx.attempt + 1;
            on_state(RetryState::InFlight { attempt });

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => Err(PfolioError::Cancelled),
                result = action() => result,
            };

            let error = match result {
                Ok(value) => {
                    on_state(RetryState::Success);
                    return Ok(value);
                }
                Err(error) if error.is_timeout() => error,
                Err(error) => {
                    debug!("Attempt {attempt} failed without timeout: {error}");
                    on_state(RetryState::Failed);
                    return Err(ConfirmedRetryError::Failed(error));
                }
            };

            on_state(RetryState::TimedOut { attempt });
            if !ctx.can_retry() {
                warn!("Attempt {attempt} timed out; no retries left");
                on_state(RetryState::Failed);
                return Err(ConfirmedRetryError::Exhausted {
                    attempts: attempt,
                    source: error,
                });
            }

            let prompt = self.prompt_for(&ctx);
            let confirmed = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                confirmed = confirm.confirm(&prompt) => Some(confirmed),
            };
            match confirmed {
                None => {
                    on_state(RetryState::Failed);
                    return Err(ConfirmedRetryError::Failed(PfolioError::Cancelled));
                }
                Some(false) => {
                    info!("Retry declined after attempt {attempt}");
                    on_state(RetryState::Failed);
                    return Err(ConfirmedRetryError::Declined {
                        attempt,
                        source: error,
                    });
                }
                Some(true) => {}
            }

            let delay = ctx.advance().unwrap_or_default();
            info!("Retrying in {delay:?} (retry {}/{})", ctx.attempt, ctx.max_attempts);
            loud_wire::log_retry(
                chain_id,
                &format!("confirmed retry {}/{} after {delay:?}", ctx.attempt, ctx.max_attempts),
            );
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    on_state(RetryState::Failed);
                    return Err(ConfirmedRetryError::Failed(PfolioError::Cancelled));
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}
