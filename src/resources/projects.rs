use super::{parse_count, upload_form};
use crate::Client;
use crate::errors::PfolioError;
use crate::http::common::Endpoint;
use crate::models::{ImageUpload, Project};
use crate::request::ApiRequest;

impl Client {
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn list_projects(&self) -> Result<Vec<Project>, PfolioError> {
        self.fetch(ApiRequest::get(Endpoint::ProjectsAll.to_path()))
            .await
    }

    /// # Errors
    ///
    /// See [`Client::send`]; a non-numeric body is [`PfolioError::Parse`].
    pub async fn count_projects(&self) -> Result<u64, PfolioError> {
        let request = ApiRequest::get(Endpoint::ProjectsCount.to_path())
            .timeout(self.config.timeouts.extended);
        parse_count(&self.fetch_text(request).await?, "project")
    }

    /// Creates a project, uploading `image` alongside the metadata.
    ///
    /// The project is sent as a JSON `project` part; the image, if any, as an
    /// `image` file part.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] for a blank title or a bad image,
    /// otherwise see [`Client::send`].
    pub async fn add_project(
        &self,
        project: &Project,
        image: Option<&ImageUpload>,
    ) -> Result<Project, PfolioError> {
        project.validate()?;
        let request = ApiRequest::post(Endpoint::ProjectAdd.to_path())
            .multipart(upload_form("project", project, image)?)
            .timeout(self.config.timeouts.extended);
        self.fetch(request).await
    }

    /// Updates project `id`. Without `image` the stored image is kept.
    ///
    /// # Errors
    ///
    /// See [`Client::add_project`]; a missing project is a 404.
    pub async fn update_project(
        &self,
        id: i64,
        project: &Project,
        image: Option<&ImageUpload>,
    ) -> Result<Project, PfolioError> {
        project.validate()?;
        let request = ApiRequest::put(Endpoint::ProjectUpdate { id }.to_path())
            .multipart(upload_form("project", project, image)?)
            .timeout(self.config.timeouts.extended);
        self.fetch(request).await
    }

    /// # Errors
    ///
    /// A missing project is a 404.
    pub async fn delete_project(&self, id: i64) -> Result<(), PfolioError> {
        self.fetch_unit(ApiRequest::delete(Endpoint::ProjectDelete { id }.to_path()))
            .await
    }
}
