use crate::Client;
use crate::confirmed_retry::{Confirm, ConfirmedRetry, ConfirmedRetryError, RetryState};
use crate::errors::PfolioError;
use crate::http::common::Endpoint;
use crate::models::ReplyMessage;
use crate::request::ApiRequest;
use tokio_util::sync::CancellationToken;
use tracing::info;

impl Client {
    fn reply_request(&self, reply: &ReplyMessage) -> Result<ApiRequest, PfolioError> {
        reply.validate()?;
        Ok(ApiRequest::post(Endpoint::MessageReply.to_path())
            .json_body(reply)?
            .timeout(self.config.timeouts.long_running))
    }

    /// Sends a reply e-mail once, without retrying.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] for a blank message or bad
    /// recipient, otherwise see [`Client::send`].
    pub async fn send_reply_once(&self, reply: &ReplyMessage) -> Result<String, PfolioError> {
        let request = self.reply_request(reply)?;
        self.fetch_text(request).await
    }

    /// Sends a reply e-mail, asking through `confirm` before each retry after
    /// a timeout.
    ///
    /// # Errors
    ///
    /// See [`ConfirmedRetry::run_observed`]. Validation failures come back as
    /// [`ConfirmedRetryError::Failed`].
    pub async fn send_reply(
        &self,
        reply: &ReplyMessage,
        confirm: &dyn Confirm,
    ) -> Result<String, ConfirmedRetryError> {
        self.send_reply_observed(reply, confirm, &CancellationToken::new(), |_| {})
            .await
    }

    /// Like [`Client::send_reply`], reporting progress to `on_state` and
    /// stopping when `cancel` fires.
    ///
    /// # Errors
    ///
    /// See [`Client::send_reply`].
    pub async fn send_reply_observed<S>(
        &self,
        reply: &ReplyMessage,
        confirm: &dyn Confirm,
        cancel: &CancellationToken,
        on_state: S,
    ) -> Result<String, ConfirmedRetryError>
    where
        S: FnMut(RetryState) + Send,
    {
        let request = self.reply_request(reply)?;
        let text = ConfirmedRetry::from_config(&self.config.confirmed_retry)
            .run_observed(
                confirm,
                cancel,
                || self.send_with_cancel(request.clone(), cancel),
                on_state,
            )
            .await?
            .into_text();
        info!("Reply sent to {}", reply.email);
        Ok(text)
    }

    /// Stores a reply in the backend's outbox without e-mailing it.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn save_message(&self, reply: &ReplyMessage) -> Result<String, PfolioError> {
        let request = ApiRequest::post(Endpoint::MessageSave.to_path()).json_body(reply)?;
        self.fetch_text(request).await
    }

    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn list_messages(&self) -> Result<Vec<ReplyMessage>, PfolioError> {
        self.fetch(ApiRequest::get(Endpoint::MessagesAll.to_path()))
            .await
    }
}
