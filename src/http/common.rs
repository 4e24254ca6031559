use crate::errors::PfolioError;

/// Backend REST endpoints known to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    SkillsAll,
    SkillsByCategory { category: &'a str },
    SkillsCount,
    SkillAdd,
    /// Skills are addressed by name, not id
    SkillUpdate { name: &'a str },
    SkillDelete { name: &'a str },
    ProjectsAll,
    ProjectsCount,
    ProjectAdd,
    ProjectUpdate { id: i64 },
    ProjectDelete { id: i64 },
    CertificationsAll,
    CertificationsCount,
    CertificationAdd,
    CertificationUpdate { id: i64 },
    CertificationDelete { id: i64 },
    ContactAdd,
    ContactsAll,
    ContactDelete { id: i64 },
    ContactsCount,
    MessageReply,
    MessageSave,
    MessagesAll,
    AdminLogin,
    AdminUpdatePassword,
}

impl Endpoint<'_> {
    /// Constructs the URL path for this endpoint
    #[must_use]
    pub fn to_path(&self) -> String {
        match self {
            Self::SkillsAll => "/skills/all".to_string(),
            Self::SkillsByCategory { category } => {
                format!("/skills/category/{}", urlencoding::encode(category))
            }
            Self::SkillsCount => "/skills/countskills".to_string(),
            Self::SkillAdd => "/skills/add".to_string(),
            Self::SkillUpdate { name } => format!("/skills/update/{}", urlencoding::encode(name)),
            Self::SkillDelete { name } => format!("/skills/delete/{}", urlencoding::encode(name)),
            Self::ProjectsAll => "/projects/viewAll".to_string(),
            Self::ProjectsCount => "/projects/countprojects".to_string(),
            Self::ProjectAdd => "/projects/add".to_string(),
            Self::ProjectUpdate { id } => format!("/projects/update/{id}"),
            Self::ProjectDelete { id } => format!("/projects/del/{id}"),
            Self::CertificationsAll => "/certifications/viewAll".to_string(),
            Self::CertificationsCount => "/certifications/countcertifications".to_string(),
            Self::CertificationAdd => "/certifications/add".to_string(),
            Self::CertificationUpdate { id } => format!("/certifications/update/{id}"),
            Self::CertificationDelete { id } => format!("/certifications/delete/{id}"),
            Self::ContactAdd => "/contacts/add".to_string(),
            Self::ContactsAll => "/contacts/all".to_string(),
            Self::ContactDelete { id } => format!("/contacts/delete/{id}"),
            Self::ContactsCount => "/contacts/countmessages".to_string(),
            Self::MessageReply => "/message/reply".to_string(),
            Self::MessageSave => "/message/save".to_string(),
            Self::MessagesAll => "/message/all".to_string(),
            Self::AdminLogin => "/admin/checkadminlogin".to_string(),
            Self::AdminUpdatePassword => "/admin/updatepassword".to_string(),
        }
    }
}

/// Joins the configured base URL and a request path.
///
/// The base URL is expected without a trailing slash (see
/// [`crate::config::ClientConfig::normalized_base_url`]). A path without a
/// leading slash gets one.
///
/// # Errors
///
/// Returns [`PfolioError::InvalidInput`] if `path` is empty.
pub fn construct_url(base_url: &str, path: &str) -> Result<String, PfolioError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PfolioError::InvalidInput(
            "Request path must not be empty".to_string(),
        ));
    }

    if path.starts_with('/') {
        Ok(format!("{base_url}{path}"))
    } else {
        Ok(format!("{base_url}/{path}"))
    }
}
