//! Backend entities, shaped with the backend's JSON field names.
//!
//! Ids are optional so the same types serve both as create payloads (no id
//! yet) and as responses. Dates are kept as the strings the backend sends.

use crate::errors::PfolioError;
use bytes::Bytes;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile")
});

/// Largest image accepted for project and certification uploads.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Categories shown on the public skills page.
pub const PUBLIC_SKILL_CATEGORIES: [&str; 5] =
    ["Languages", "Frontend", "Backend", "Databases", "Tools & Others"];

/// Categories summarized on the about page.
pub const ABOUT_SKILL_CATEGORIES: [&str; 4] = ["backend", "frontend", "languages", "tools"];

/// Skills grouped by category name.
pub type SkillsByCategory = BTreeMap<String, Vec<Skill>>;

fn require(value: &str, message: &str) -> Result<(), PfolioError> {
    if value.trim().is_empty() {
        Err(PfolioError::InvalidInput(message.to_string()))
    } else {
        Ok(())
    }
}

/// Returns `true` if `email` looks like `local@domain.tld`.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub skillname: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learningtype: Option<String>,
}

impl Skill {
    #[must_use]
    pub fn new(skillname: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            skillname: skillname.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] if the name or category is blank.
    pub fn validate(&self) -> Result<(), PfolioError> {
        require(&self.skillname, "Skill name is required")?;
        require(&self.category, "Skill category is required")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Long-form description shown on the project detail view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fdescription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edate: Option<String>,
    /// Comma-separated technology list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitlink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveurl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imgurl: Option<String>,
}

impl Project {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Technologies split on commas, trimmed, blanks dropped.
    #[must_use]
    pub fn technology_list(&self) -> Vec<&str> {
        self.technologies
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] if the title is blank.
    pub fn validate(&self) -> Result<(), PfolioError> {
        require(&self.title, "Title is required")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Certification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
}

impl Certification {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] if the title is blank.
    pub fn validate(&self) -> Result<(), PfolioError> {
        require(&self.title, "Title is required")
    }
}

/// A message left through the public contact form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// Older backends send `createdAt` instead
    #[serde(alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl Contact {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            subject: subject.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Checks the form before it is submitted.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] if any field is blank or the
    /// e-mail address is malformed.
    pub fn validate(&self) -> Result<(), PfolioError> {
        let fields = [&self.name, &self.email, &self.subject, &self.message];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(PfolioError::InvalidInput(
                "Please fill in all fields".to_string(),
            ));
        }
        if !is_valid_email(&self.email) {
            return Err(PfolioError::InvalidInput(
                "Please enter a valid email address".to_string(),
            ));
        }
        Ok(())
    }
}

/// An e-mail reply sent from the admin inbox.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyMessage {
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ReplyMessage {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Builds a reply addressed to the sender of `contact`.
    #[must_use]
    pub fn reply_to(contact: &Contact, message: impl Into<String>) -> Self {
        Self::new(
            contact.email.clone(),
            format!("Re: {}", contact.subject),
            message,
        )
    }

    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] for a blank message or a
    /// malformed recipient.
    pub fn validate(&self) -> Result<(), PfolioError> {
        require(&self.message, "Please enter a message before sending.")?;
        if !is_valid_email(&self.email) {
            return Err(PfolioError::InvalidInput(format!(
                "Invalid recipient address '{}'",
                self.email
            )));
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] if either field is blank.
    pub fn validate(&self) -> Result<(), PfolioError> {
        require(&self.username, "Username is required")?;
        require(&self.password, "Password is required")
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdate {
    pub username: String,
    pub current_password: String,
    pub new_password: String,
}

impl PasswordUpdate {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        current_password: impl Into<String>,
        new_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            current_password: current_password.into(),
            new_password: new_password.into(),
        }
    }

    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] for missing fields, a new
    /// password equal to the current one, or a weak new password.
    pub fn validate(&self) -> Result<(), PfolioError> {
        require(&self.username, "Username is required")?;
        require(&self.current_password, "Current password is required")?;
        require(&self.new_password, "New password is required")?;
        if self.new_password == self.current_password {
            return Err(PfolioError::InvalidInput(
                "New password must be different from current password".to_string(),
            ));
        }
        if !is_strong_password(&self.new_password) {
            return Err(PfolioError::InvalidInput(
                "Password must be at least 8 characters long and contain uppercase, lowercase, number, and special character".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for PasswordUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordUpdate")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// At least 8 characters with an upper-case letter, a lower-case letter, a
/// digit and a character that is neither.
#[must_use]
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(char::is_uppercase)
        && password.chars().any(char::is_lowercase)
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
}

/// Entity counts shown on the admin dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub skills: u64,
    pub certifications: u64,
    pub projects: u64,
    pub messages: u64,
}

/// Image attached to a project or certification upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ImageUpload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Reads an image from disk, guessing the content type from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] if the file cannot be read.
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, PfolioError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            PfolioError::InvalidInput(format!("Failed to read image {}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        let content_type = guess_image_type(&file_name);

        Ok(Self {
            file_name,
            content_type: content_type.map(String::from),
            bytes: bytes.into(),
        })
    }

    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] for an empty or oversized image.
    pub fn validate(&self) -> Result<(), PfolioError> {
        if self.bytes.is_empty() {
            return Err(PfolioError::InvalidInput(format!(
                "Image '{}' is empty",
                self.file_name
            )));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(PfolioError::InvalidInput(
                "Image file size must be less than 5MB".to_string(),
            ));
        }
        Ok(())
    }
}

fn guess_image_type(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skill_uses_backend_field_names() {
        let skill = Skill {
            icon_url: Some("https://cdn.example.com/rust.svg".to_string()),
            ..Skill::new("Rust", "Languages")
        };
        let value = serde_json::to_value(&skill).unwrap();
        assert_eq!(
            value,
            json!({
                "skillname": "Rust",
                "category": "Languages",
                "iconUrl": "https://cdn.example.com/rust.svg"
            })
        );
    }

    #[test]
    fn test_certification_deserializes_camel_case() {
        let cert: Certification = serde_json::from_value(json!({
            "id": 3,
            "title": "AWS Cloud Practitioner",
            "issueDate": "2024-05-01",
            "credentialUrl": "https://aws.example/verify/abc",
            "imgUrl": null
        }))
        .unwrap();
        assert_eq!(cert.id, Some(3));
        assert_eq!(cert.issue_date.as_deref(), Some("2024-05-01"));
        assert_eq!(cert.img_url, None);
    }

    #[test]
    fn test_contact_accepts_created_at_alias() {
        let contact: Contact = serde_json::from_value(json!({
            "id": 9,
            "name": "Ada",
            "email": "ada@example.com",
            "subject": "Hi",
            "message": "Hello",
            "createdAt": "2025-01-02T03:04:05"
        }))
        .unwrap();
        assert_eq!(contact.timestamp.as_deref(), Some("2025-01-02T03:04:05"));
        assert_eq!(contact.read, None);
    }

    #[test]
    fn test_contact_validation() {
        assert!(Contact::new("Ada", "ada@example.com", "Hi", "Hello").validate().is_ok());

        let blank = Contact::new("Ada", "ada@example.com", "  ", "Hello");
        assert!(matches!(blank.validate(), Err(PfolioError::InvalidInput(m)) if m.contains("all fields")));

        let bad_email = Contact::new("Ada", "ada@example", "Hi", "Hello");
        assert!(matches!(bad_email.validate(), Err(PfolioError::InvalidInput(m)) if m.contains("email")));
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@@b.co"));
    }

    #[test]
    fn test_reply_validation_and_reply_to() {
        let contact = Contact::new("Ada", "ada@example.com", "Hiring", "Hello");
        let reply = ReplyMessage::reply_to(&contact, "Thanks!");
        assert_eq!(reply.email, "ada@example.com");
        assert_eq!(reply.subject, "Re: Hiring");
        assert!(reply.validate().is_ok());

        let empty = ReplyMessage::reply_to(&contact, "   ");
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(is_strong_password("Str0ng!pass"));
        assert!(!is_strong_password("Sh0rt!"));
        assert!(!is_strong_password("alllower1!"));
        assert!(!is_strong_password("NoDigits!!"));
        assert!(!is_strong_password("NoSpecial12"));
    }

    #[test]
    fn test_password_update_validation() {
        assert!(PasswordUpdate::new("admin", "Old!pass1", "N3w!passw").validate().is_ok());
        assert!(PasswordUpdate::new("", "Old!pass1", "N3w!passw").validate().is_err());
        assert!(PasswordUpdate::new("admin", "Same!pass1", "Same!pass1").validate().is_err());
        assert!(PasswordUpdate::new("admin", "Old!pass1", "weak").validate().is_err());
    }

    #[test]
    fn test_password_update_serializes_camel_case() {
        let value = serde_json::to_value(PasswordUpdate::new("admin", "a", "b")).unwrap();
        assert_eq!(
            value,
            json!({"username": "admin", "currentPassword": "a", "newPassword": "b"})
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = AdminCredentials::new("admin", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));

        let update = PasswordUpdate::new("admin", "hunter2", "Hunter3!x");
        assert!(!format!("{:?}", update).contains("hunter2"));
    }

    #[test]
    fn test_project_technology_list() {
        let project = Project {
            technologies: Some("React, Spring Boot, ,MySQL".to_string()),
            ..Project::new("Portfolio")
        };
        assert_eq!(project.technology_list(), vec!["React", "Spring Boot", "MySQL"]);
        assert!(Project::new("x").technology_list().is_empty());
    }

    #[test]
    fn test_image_validation() {
        assert!(ImageUpload::new("a.png", vec![1u8]).validate().is_ok());
        assert!(ImageUpload::new("a.png", Vec::<u8>::new()).validate().is_err());
        let big = ImageUpload::new("big.png", vec![0u8; MAX_IMAGE_BYTES + 1]);
        assert!(big.validate().is_err());
    }

    #[tokio::test]
    async fn test_image_from_path_guesses_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.JPG");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let image = ImageUpload::from_path(&path).await.unwrap();
        assert_eq!(image.file_name, "cover.JPG");
        assert_eq!(image.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(image.bytes.len(), 3);
    }
}
