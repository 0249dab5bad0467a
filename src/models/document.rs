//! Document model: the titled, tagged record users keep in their vault.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Emoji assigned when a document is created without one.
pub const DEFAULT_EMOJI: &str = "📄";

/// A stored document ("prompt").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub owner_id: String,
    #[serde(default)]
    pub is_public: bool,
}

impl Document {
    /// Whether `user_id` may read this document.
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.is_public || self.owner_id == user_id
    }

    /// Estimated reading time, one minute per started thousand UTF-16 code units.
    pub fn read_time(&self) -> String {
        format!(
            "{} min read",
            self.content.encode_utf16().count().div_ceil(1000)
        )
    }
}

/// Request body for creating a new document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub title: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
}

impl CreateDocumentRequest {
    /// Trim and default every field, rejecting blank title or content.
    pub fn normalized(self) -> Result<Self, AppError> {
        let title = required(&self.title, "Title is required")?;
        let content = required(&self.content, "Content is required")?;

        Ok(Self {
            title,
            emoji: Some(trimmed(self.emoji).unwrap_or_else(|| DEFAULT_EMOJI.to_string())),
            excerpt: trimmed(self.excerpt),
            content,
            tags: normalize_tags(&self.tags),
            is_public: self.is_public,
        })
    }
}

/// Request body for updating an existing document. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl UpdateDocumentRequest {
    /// Trim present fields; a present title or content must not be blank.
    pub fn normalized(self) -> Result<Self, AppError> {
        let title = self
            .title
            .map(|t| required(&t, "Title must not be empty"))
            .transpose()?;
        let content = self
            .content
            .map(|c| required(&c, "Content must not be empty"))
            .transpose()?;

        Ok(Self {
            title,
            emoji: self.emoji.map(|e| e.trim().to_string()),
            excerpt: self.excerpt.map(|e| e.trim().to_string()),
            content,
            tags: self.tags.as_deref().map(normalize_tags),
            is_public: self.is_public,
        })
    }
}

/// Trim tags, drop blanks and keep only the first occurrence of each.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

fn required(value: &str, message: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(value.to_string())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
