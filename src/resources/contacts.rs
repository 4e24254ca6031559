use super::parse_count;
use crate::Client;
use crate::errors::PfolioError;
use crate::http::common::Endpoint;
use crate::models::Contact;
use crate::request::ApiRequest;

impl Client {
    /// Submits the public contact form.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] without sending anything if the
    /// form is incomplete or the e-mail address is malformed.
    pub async fn submit_contact(&self, contact: &Contact) -> Result<Contact, PfolioError> {
        contact.validate()?;
        let request = ApiRequest::post(Endpoint::ContactAdd.to_path()).json_body(contact)?;
        self.fetch(request).await
    }

    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn list_contacts(&self) -> Result<Vec<Contact>, PfolioError> {
        self.fetch(ApiRequest::get(Endpoint::ContactsAll.to_path()))
            .await
    }

    /// Deletes a contact message and returns the backend's confirmation.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn delete_contact(&self, id: i64) -> Result<String, PfolioError> {
        self.fetch_text(ApiRequest::delete(Endpoint::ContactDelete { id }.to_path()))
            .await
    }

    /// Number of contact messages received.
    ///
    /// # Errors
    ///
    /// See [`Client::send`]; a non-numeric body is [`PfolioError::Parse`].
    pub async fn count_messages(&self) -> Result<u64, PfolioError> {
        let request = ApiRequest::get(Endpoint::ContactsCount.to_path())
            .timeout(self.config.timeouts.extended);
        parse_count(&self.fetch_text(request).await?, "message")
    }
}
