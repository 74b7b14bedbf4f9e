//! Content element and version domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Body format of a content element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Html,
    Json,
    Markdown,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Text => write!(f, "text"),
            ContentType::Html => write!(f, "html"),
            ContentType::Json => write!(f, "json"),
            ContentType::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ContentType::Text),
            "html" => Ok(ContentType::Html),
            "json" => Ok(ContentType::Json),
            "markdown" => Ok(ContentType::Markdown),
            _ => Err(format!("Unknown content type: {}", s)),
        }
    }
}

/// Lifecycle state of a content element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentState {
    Draft,
    Published,
    Unpublished,
}

/// One immutable version of a content element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentVersion {
    pub id: Uuid,
    pub element_id: String,
    pub content: String,
    pub content_type: ContentType,
    pub version_number: i32,
    pub is_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_version_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_summary: Option<String>,
    pub metadata: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for a new version; the number is assigned by the version manager.
#[derive(Debug, Clone)]
pub struct VersionSnapshot {
    pub element_id: String,
    pub content: String,
    pub content_type: ContentType,
    pub parent_version_id: Option<Uuid>,
    pub change_summary: Option<String>,
    pub metadata: serde_json::Value,
    pub created_by: Option<Uuid>,
}

/// Denormalized row for the live version of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedContent {
    pub element_id: String,
    pub version_id: Uuid,
    pub version_number: i32,
    pub content: String,
    pub content_type: ContentType,
    pub metadata: serde_json::Value,
    pub published_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_by: Option<Uuid>,
}

impl PublishedContent {
    pub fn from_version(version: &ContentVersion, at: DateTime<Utc>, by: Option<Uuid>) -> Self {
        Self {
            element_id: version.element_id.clone(),
            version_id: version.id,
            version_number: version.version_number,
            content: version.content.clone(),
            content_type: version.content_type,
            metadata: version.metadata.clone(),
            published_at: at,
            published_by: by,
        }
    }
}

/// Listing row for a content element.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub element_id: String,
    pub content_type: ContentType,
    pub latest_version: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_version: Option<i32>,
    pub version_count: usize,
    pub state: ContentState,
    pub updated_at: DateTime<Utc>,
}

/// Comparison of two versions of one element.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDiff {
    pub element_id: String,
    pub from_version: i32,
    pub to_version: i32,
    pub content_changed: bool,
    pub metadata_changed: bool,
    pub content_type_changed: bool,
    pub changed_metadata_keys: Vec<String>,
    pub lines_added: usize,
    pub lines_removed: usize,
    pub size_delta: i64,
}

/// One node of the version tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionNode {
    pub version_id: Uuid,
    pub version_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_version_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_version_number: Option<i32>,
    pub children: Vec<Uuid>,
    pub is_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A single problem found while validating a content body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentIssue {
    pub field: String,
    pub message: String,
}

impl ContentIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Request to create a new content element.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    #[validate(length(min = 1, max = 100, message = "Element id must be 1-100 characters"))]
    pub element_id: String,
    pub content: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Request to create a new draft version of an element.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditContentRequest {
    pub content: String,
    #[validate(length(max = 500, message = "Change summary must be at most 500 characters"))]
    pub change_summary: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub version_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackRequest {
    pub target_version: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CleanupVersionsRequest {
    #[validate(range(min = 1, max = 1000, message = "keepCount must be between 1 and 1000"))]
    pub keep_count: Option<usize>,
}
