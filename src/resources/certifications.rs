use super::{parse_count, upload_form};
use crate::Client;
use crate::errors::PfolioError;
use crate::http::common::Endpoint;
use crate::models::{Certification, ImageUpload};
use crate::request::ApiRequest;

impl Client {
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn list_certifications(&self) -> Result<Vec<Certification>, PfolioError> {
        self.fetch(ApiRequest::get(Endpoint::CertificationsAll.to_path()))
            .await
    }

    /// # Errors
    ///
    /// See [`Client::send`]; a non-numeric body is [`PfolioError::Parse`].
    pub async fn count_certifications(&self) -> Result<u64, PfolioError> {
        let request = ApiRequest::get(Endpoint::CertificationsCount.to_path())
            .timeout(self.config.timeouts.extended);
        parse_count(&self.fetch_text(request).await?, "certification")
    }

    /// Creates a certification with an optional badge image.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] for a blank title or a bad image,
    /// otherwise see [`Client::send`].
    pub async fn add_certification(
        &self,
        certification: &Certification,
        image: Option<&ImageUpload>,
    ) -> Result<Certification, PfolioError> {
        certification.validate()?;
        let request = ApiRequest::post(Endpoint::CertificationAdd.to_path())
            .multipart(upload_form("certification", certification, image)?)
            .timeout(self.config.timeouts.extended);
        self.fetch(request).await
    }

    /// # Errors
    ///
    /// See [`Client::add_certification`].
    pub async fn update_certification(
        &self,
        id: i64,
        certification: &Certification,
        image: Option<&ImageUpload>,
    ) -> Result<Certification, PfolioError> {
        certification.validate()?;
        let request = ApiRequest::put(Endpoint::CertificationUpdate { id }.to_path())
            .multipart(upload_form("certification", certification, image)?)
            .timeout(self.config.timeouts.extended);
        self.fetch(request).await
    }

    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn delete_certification(&self, id: i64) -> Result<(), PfolioError> {
        self.fetch_unit(ApiRequest::delete(
            Endpoint::CertificationDelete { id }.to_path(),
        ))
        .await
    }
}
