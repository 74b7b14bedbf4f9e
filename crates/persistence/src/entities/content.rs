//! Content version entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{ContentType, ContentVersion, PublishedContent};
use sqlx::FromRow;
use uuid::Uuid;

fn parse_content_type(raw: &str) -> ContentType {
    raw.parse::<ContentType>().unwrap_or_else(|_| {
        tracing::warn!(content_type = %raw, "Unknown content type, treating as text");
        ContentType::Text
    })
}

/// Database row mapping for the content_versions table.
#[derive(Debug, Clone, FromRow)]
pub struct ContentVersionEntity {
    pub id: Uuid,
    pub element_id: String,
    pub content: String,
    pub content_type: String,
    pub version_number: i32,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub parent_version_id: Option<Uuid>,
    pub change_summary: Option<String>,
    pub metadata: serde_json::Value,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<ContentVersionEntity> for ContentVersion {
    fn from(entity: ContentVersionEntity) -> Self {
        ContentVersion {
            id: entity.id,
            content_type: parse_content_type(&entity.content_type),
            element_id: entity.element_id,
            content: entity.content,
            version_number: entity.version_number,
            is_published: entity.is_published,
            published_at: entity.published_at,
            parent_version_id: entity.parent_version_id,
            change_summary: entity.change_summary,
            metadata: entity.metadata,
            created_by: entity.created_by,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the published_content table.
#[derive(Debug, Clone, FromRow)]
pub struct PublishedContentEntity {
    pub element_id: String,
    pub version_id: Uuid,
    pub version_number: i32,
    pub content: String,
    pub content_type: String,
    pub metadata: serde_json::Value,
    pub published_at: DateTime<Utc>,
    pub published_by: Option<Uuid>,
}

impl From<PublishedContentEntity> for PublishedContent {
    fn from(entity: PublishedContentEntity) -> Self {
        PublishedContent {
            content_type: parse_content_type(&entity.content_type),
            element_id: entity.element_id,
            version_id: entity.version_id,
            version_number: entity.version_number,
            content: entity.content,
            metadata: entity.metadata,
            published_at: entity.published_at,
            published_by: entity.published_by,
        }
    }
}
