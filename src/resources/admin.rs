use crate::Client;
use crate::errors::PfolioError;
use crate::http::common::Endpoint;
use crate::models::{AdminCredentials, PasswordUpdate};
use crate::request::ApiRequest;
use serde_json::Value;
use tracing::info;

impl Client {
    /// Checks admin credentials and returns the admin record on success.
    ///
    /// Login is usually the first call after a long idle period, so it runs
    /// under the wake-up policy with the extended timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] for blank credentials and
    /// [`PfolioError::Api`] with status 401 for wrong ones.
    pub async fn login(&self, credentials: &AdminCredentials) -> Result<Value, PfolioError> {
        credentials.validate()?;
        let request = ApiRequest::post(Endpoint::AdminLogin.to_path())
            .json_body(credentials)?
            .timeout(self.config.timeouts.extended);

        let admin = self
            .with_wakeup(|| self.send(request.clone()))
            .await?
            .into_value()
            .unwrap_or(Value::Null);
        info!("Admin '{}' logged in", credentials.username);
        Ok(admin)
    }

    /// Changes the admin password.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] before any I/O for a missing
    /// token, missing fields, or a weak new password. A wrong current
    /// password comes back as a 401.
    pub async fn update_password(
        &self,
        update: &PasswordUpdate,
        token: &str,
    ) -> Result<String, PfolioError> {
        if token.trim().is_empty() {
            return Err(PfolioError::InvalidInput(
                "Authentication required. Please log in again.".to_string(),
            ));
        }
        update.validate()?;

        let request = ApiRequest::post(Endpoint::AdminUpdatePassword.to_path())
            .json_body(update)?
            .bearer_auth(token);
        self.fetch_text(request).await
    }
}
