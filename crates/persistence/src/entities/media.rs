//! Media asset entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Dimensions, MediaAsset, MediaFileType, MediaVariant};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the media_assets table.
///
/// Variants are stored as a JSONB array.
#[derive(Debug, Clone, FromRow)]
pub struct MediaAssetEntity {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub file_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub variants: serde_json::Value,
    pub usage_count: i64,
    pub is_optimized: bool,
    pub alt_text: Option<String>,
    pub checksum: String,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaAssetEntity {
    pub fn into_domain(self) -> MediaAsset {
        let file_type = self
            .file_type
            .parse::<MediaFileType>()
            .unwrap_or(MediaFileType::Other);
        let dimensions = match (self.width, self.height) {
            (Some(width), Some(height)) => Some(Dimensions {
                width: width.max(0) as u32,
                height: height.max(0) as u32,
            }),
            _ => None,
        };
        let variants = serde_json::from_value::<Vec<MediaVariant>>(self.variants)
            .unwrap_or_else(|e| {
                tracing::warn!(media_id = %self.id, error = %e, "Ignoring unreadable media variants");
                Vec::new()
            });

        MediaAsset {
            id: self.id,
            filename: self.filename,
            original_filename: self.original_filename,
            file_path: self.file_path,
            file_size: self.file_size,
            mime_type: self.mime_type,
            file_type,
            dimensions,
            variants,
            usage_count: self.usage_count,
            is_optimized: self.is_optimized,
            alt_text: self.alt_text,
            checksum: self.checksum,
            uploaded_by: self.uploaded_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<MediaAssetEntity> for MediaAsset {
    fn from(entity: MediaAssetEntity) -> Self {
        entity.into_domain()
    }
}
