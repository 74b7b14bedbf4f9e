//! Media asset domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Broad class of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFileType {
    Image,
    Video,
    Document,
    Other,
}

impl std::fmt::Display for MediaFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaFileType::Image => write!(f, "image"),
            MediaFileType::Video => write!(f, "video"),
            MediaFileType::Document => write!(f, "document"),
            MediaFileType::Other => write!(f, "other"),
        }
    }
}

impl FromStr for MediaFileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaFileType::Image),
            "video" => Ok(MediaFileType::Video),
            "document" => Ok(MediaFileType::Document),
            "other" => Ok(MediaFileType::Other),
            _ => Err(format!("Unknown media file type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn longest_edge(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Whether a variant file exists yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantStatus {
    /// The rendition was written to storage.
    Ready,
    /// The rendition is planned; an external transcoder produces the file.
    Pending,
}

/// A derived rendition of a media asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaVariant {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
    pub file_size: i64,
    pub format: String,
    pub status: VariantStatus,
}

/// An uploaded binary asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub file_type: MediaFileType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    pub variants: Vec<MediaVariant>,
    pub usage_count: i64,
    pub is_optimized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    pub checksum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw upload handed to the media processor.
#[derive(Debug, Clone)]
pub struct UploadMedia {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: Option<String>,
    pub alt_text: Option<String>,
    pub uploaded_by: Option<Uuid>,
}

/// HTTP upload body; `data` is base64.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadMediaRequest {
    #[validate(length(min = 1, max = 255, message = "Filename must be 1-255 characters"))]
    pub filename: String,
    pub mime_type: Option<String>,
    #[validate(length(min = 1, message = "File data is required"))]
    pub data: String,
    #[validate(length(max = 300, message = "Alt text must be at most 300 characters"))]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMediaQuery {
    pub file_type: Option<MediaFileType>,
}
