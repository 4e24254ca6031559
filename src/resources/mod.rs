//! Typed operations for each backend resource.
//!
//! Every operation is an `impl Client` method that builds an
//! [`ApiRequest`](crate::ApiRequest) for one backend endpoint and applies the
//! matching timeout preset. Caller input is validated before any network I/O.

mod admin;
mod certifications;
mod contacts;
mod dashboard;
mod messages;
mod projects;
mod skills;

pub use skills::ABOUT_SKILLS_CACHE_KEY;

use crate::errors::PfolioError;
use crate::models::ImageUpload;
use crate::request::MultipartBody;
use serde::Serialize;

/// Builds the `<part>` + optional `image` form used by upload endpoints.
pub(crate) fn upload_form<T: Serialize>(
    part: &str,
    entity: &T,
    image: Option<&ImageUpload>,
) -> Result<MultipartBody, PfolioError> {
    let metadata = serde_json::to_value(entity)
        .map_err(|e| PfolioError::InvalidInput(format!("Failed to serialize {part}: {e}")))?;
    let mut form = MultipartBody::new().json_part(part, metadata);
    if let Some(image) = image {
        image.validate()?;
        form = form.file_part(
            "image",
            image.file_name.as_str(),
            image.content_type.as_deref(),
            image.bytes.clone(),
        );
    }
    Ok(form)
}

/// Parses a count endpoint body. The backend sends a bare number.
pub(crate) fn parse_count(body: &str, what: &str) -> Result<u64, PfolioError> {
    body.trim()
        .parse()
        .map_err(|e| PfolioError::Parse(format!("Invalid {what} count '{}': {e}", body.trim())))
}
