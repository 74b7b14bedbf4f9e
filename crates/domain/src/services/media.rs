//! Media upload and optimization.
//!
//! Originals are stored under `originals/`, derived renditions under
//! `variants/{id}/`. Images are decoded and resized for real; video
//! renditions are size estimates left in the `pending` state for an external
//! transcoder.

use crate::error::{DomainError, DomainResult, StoreError};
use crate::models::{
    AuditAction, Dimensions, MediaAsset, MediaFileType, MediaVariant, UploadMedia, VariantStatus,
};
use crate::services::audit::{audit_helpers, record_best_effort};
use crate::store::{AuditSink, MediaStorage, MediaStore};
use chrono::Utc;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use metrics::counter;
use serde_json::json;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Image renditions by longest edge.
const IMAGE_VARIANTS: [(&str, u32); 4] = [
    ("thumbnail", 150),
    ("small", 300),
    ("medium", 600),
    ("large", 1200),
];

/// Video renditions: name, height, width, bitrate in kbps.
const VIDEO_VARIANTS: [(&str, u32, u32, u32); 3] = [
    ("low", 480, 854, 1_000),
    ("medium", 720, 1280, 2_500),
    ("high", 1080, 1920, 5_000),
];

/// Bitrate assumed for an uploaded original when estimating its duration.
const ASSUMED_SOURCE_BITRATE_KBPS: f64 = 8_000.0;

/// Vector image types stored as-is; they have no pixel dimensions or renditions.
const VECTOR_IMAGE_TYPES: [&str; 1] = ["image/svg+xml"];

const DOCUMENT_EXTENSIONS: [&str; 10] = [
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "txt", "csv",
];

#[derive(Debug, Clone)]
pub struct MediaOptions {
    pub max_upload_bytes: usize,
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Classify an upload from its extension and MIME type.
pub fn classify_file(extension: &str, mime_type: &str) -> MediaFileType {
    let extension = extension.to_ascii_lowercase();
    if mime_type.starts_with("image/") {
        MediaFileType::Image
    } else if mime_type.starts_with("video/") {
        MediaFileType::Video
    } else if mime_type == "application/pdf"
        || mime_type.starts_with("text/")
        || DOCUMENT_EXTENSIONS.contains(&extension.as_str())
    {
        MediaFileType::Document
    } else {
        MediaFileType::Other
    }
}

fn is_raster_image(file_type: MediaFileType, mime_type: &str) -> bool {
    file_type == MediaFileType::Image && !VECTOR_IMAGE_TYPES.contains(&mime_type)
}

struct RenderedVariant {
    name: &'static str,
    dimensions: Dimensions,
    bytes: Vec<u8>,
}

pub struct MediaProcessor {
    store: Arc<dyn MediaStore>,
    storage: Arc<dyn MediaStorage>,
    audit: Arc<dyn AuditSink>,
    options: MediaOptions,
}

impl MediaProcessor {
    pub fn new(
        store: Arc<dyn MediaStore>,
        storage: Arc<dyn MediaStorage>,
        audit: Arc<dyn AuditSink>,
        options: MediaOptions,
    ) -> Self {
        Self {
            store,
            storage,
            audit,
            options,
        }
    }

    /// Store an original file and register it as a new asset.
    pub async fn upload_media(&self, upload: UploadMedia) -> DomainResult<MediaAsset> {
        if upload.bytes.is_empty() {
            return Err(DomainError::Validation("Uploaded file is empty".to_string()));
        }
        if upload.bytes.len() > self.options.max_upload_bytes {
            return Err(DomainError::Validation(format!(
                "Uploaded file is {} bytes, exceeding the limit of {} bytes",
                upload.bytes.len(),
                self.options.max_upload_bytes
            )));
        }

        let original_filename = shared::validation::sanitize_filename(&upload.filename);
        let extension = Path::new(&original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let mime_type = upload
            .mime_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(&original_filename)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });
        let file_type = classify_file(&extension, &mime_type);

        let id = Uuid::new_v4();
        let filename = if extension.is_empty() {
            id.to_string()
        } else {
            format!("{}.{}", id, extension)
        };
        let file_path = format!("originals/{}", filename);

        let bytes = upload.bytes;
        let (bytes, dimensions) = if is_raster_image(file_type, &mime_type) {
            let (bytes, dimensions) = tokio::task::spawn_blocking(move || {
                let dimensions = read_dimensions(&bytes);
                (bytes, dimensions)
            })
            .await
            .map_err(join_error)?;
            (bytes, Some(dimensions?))
        } else {
            (bytes, None)
        };

        let now = Utc::now();
        let asset = MediaAsset {
            id,
            filename,
            original_filename,
            file_path: file_path.clone(),
            file_size: bytes.len() as i64,
            mime_type,
            file_type,
            dimensions,
            variants: Vec::new(),
            usage_count: 0,
            is_optimized: false,
            alt_text: upload.alt_text,
            checksum: shared::crypto::sha256_hex_bytes(&bytes),
            uploaded_by: upload.uploaded_by,
            created_at: now,
            updated_at: now,
        };

        self.storage.write(&file_path, &bytes).await?;
        if let Err(err) = self.store.insert(&asset).await {
            if let Err(cleanup) = self.storage.delete(&file_path).await {
                warn!(path = %file_path, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(err.into());
        }

        record_best_effort(
            self.audit.as_ref(),
            audit_helpers::media_event(
                AuditAction::MediaUpload,
                asset.uploaded_by,
                asset.id,
                json!({
                    "filename": asset.original_filename,
                    "fileType": asset.file_type,
                    "fileSize": asset.file_size,
                }),
            ),
        )
        .await;
        counter!("media_uploads_total", "file_type" => file_type.to_string()).increment(1);
        info!(
            media_id = %asset.id,
            file_type = %asset.file_type,
            file_size = asset.file_size,
            "Media uploaded"
        );
        Ok(asset)
    }

    /// Derive the renditions for an asset and mark it optimized.
    pub async fn optimize_media(
        &self,
        id: Uuid,
        user_id: Option<Uuid>,
    ) -> DomainResult<Vec<MediaVariant>> {
        let mut asset = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Media {} not found", id)))?;

        let variants = match asset.file_type {
            MediaFileType::Image if is_raster_image(asset.file_type, &asset.mime_type) => {
                self.image_variants(&asset).await?
            }
            MediaFileType::Image => Vec::new(),
            MediaFileType::Video => video_variants(&asset),
            MediaFileType::Document | MediaFileType::Other => Vec::new(),
        };

        asset.variants = variants.clone();
        asset.is_optimized = true;
        asset.updated_at = Utc::now();
        self.store.update(&asset).await?;

        record_best_effort(
            self.audit.as_ref(),
            audit_helpers::media_event(
                AuditAction::MediaOptimize,
                user_id,
                asset.id,
                json!({
                    "variants": variants.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
                }),
            ),
        )
        .await;
        info!(media_id = %asset.id, variants = variants.len(), "Media optimized");
        Ok(variants)
    }

    pub async fn get_media(&self, id: Uuid) -> DomainResult<Option<MediaAsset>> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Newest first, optionally restricted to one file type.
    pub async fn list_media(&self, file_type: Option<MediaFileType>) -> DomainResult<Vec<MediaAsset>> {
        Ok(self.store.list(file_type).await?)
    }

    pub async fn increment_usage(&self, id: Uuid) -> DomainResult<i64> {
        self.store
            .increment_usage(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Media {} not found", id)))
    }

    /// Remove an asset with its original and variant files.
    pub async fn delete_media(&self, id: Uuid, user_id: Option<Uuid>) -> DomainResult<bool> {
        let Some(asset) = self.store.find_by_id(id).await? else {
            return Ok(false);
        };

        let paths = asset
            .variants
            .iter()
            .filter(|v| v.status == VariantStatus::Ready)
            .map(|v| v.path.as_str())
            .chain(std::iter::once(asset.file_path.as_str()));
        for path in paths {
            if let Err(err) = self.storage.delete(path).await {
                warn!(media_id = %id, path = %path, error = %err, "Failed to delete media file");
            }
        }
        let deleted = self.store.delete(id).await?;

        record_best_effort(
            self.audit.as_ref(),
            audit_helpers::media_event(
                AuditAction::MediaDelete,
                user_id,
                id,
                json!({ "filename": asset.original_filename }),
            ),
        )
        .await;
        info!(media_id = %id, "Media deleted");
        Ok(deleted)
    }

    async fn image_variants(&self, asset: &MediaAsset) -> DomainResult<Vec<MediaVariant>> {
        let original = self.storage.read(&asset.file_path).await?;
        let format = if matches!(asset.mime_type.as_str(), "image/jpeg" | "image/jpg") {
            ImageFormat::Jpeg
        } else {
            ImageFormat::Png
        };

        let rendered = tokio::task::spawn_blocking(move || render_image_variants(&original, format))
            .await
            .map_err(join_error)??;

        let extension = if format == ImageFormat::Jpeg { "jpg" } else { "png" };
        let mut variants = Vec::with_capacity(rendered.len());
        for variant in rendered {
            let path = format!("variants/{}/{}.{}", asset.id, variant.name, extension);
            self.storage.write(&path, &variant.bytes).await?;
            variants.push(MediaVariant {
                name: variant.name.to_string(),
                path,
                dimensions: Some(variant.dimensions),
                quality: None,
                bitrate_kbps: None,
                file_size: variant.bytes.len() as i64,
                format: extension.to_string(),
                status: VariantStatus::Ready,
            });
        }
        Ok(variants)
    }
}

fn read_dimensions(bytes: &[u8]) -> DomainResult<Dimensions> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DomainError::Validation(format!("Unreadable image: {}", e)))?
        .into_dimensions()
        .map_err(|e| DomainError::Validation(format!("Unreadable image: {}", e)))?;
    Ok(Dimensions { width, height })
}

fn render_image_variants(bytes: &[u8], format: ImageFormat) -> DomainResult<Vec<RenderedVariant>> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DomainError::Validation(format!("Unreadable image: {}", e)))?
        .decode()
        .map_err(|e| DomainError::Validation(format!("Unreadable image: {}", e)))?;
    let longest = image.width().max(image.height());

    let mut rendered = Vec::new();
    for (name, edge) in IMAGE_VARIANTS {
        if edge >= longest {
            continue;
        }
        let resized = image.resize(edge, edge, FilterType::Lanczos3);
        let dimensions = Dimensions {
            width: resized.width(),
            height: resized.height(),
        };
        // JPEG has no alpha channel.
        let resized = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(resized.to_rgb8())
        } else {
            resized
        };
        let mut buffer = Cursor::new(Vec::new());
        resized
            .write_to(&mut buffer, format)
            .map_err(|e| DomainError::Storage(StoreError::Backend(format!("Failed to encode {} variant: {}", name, e))))?;
        rendered.push(RenderedVariant {
            name,
            dimensions,
            bytes: buffer.into_inner(),
        });
    }
    Ok(rendered)
}

fn video_variants(asset: &MediaAsset) -> Vec<MediaVariant> {
    let original_size = asset.file_size as f64;
    let duration_secs = (original_size * 8.0 / 1000.0 / ASSUMED_SOURCE_BITRATE_KBPS).max(1.0);

    VIDEO_VARIANTS
        .iter()
        .filter_map(|&(name, height, width, bitrate_kbps)| {
            let estimated = (bitrate_kbps as f64 * 1000.0 / 8.0 * duration_secs).round();
            if estimated >= original_size {
                return None;
            }
            Some(MediaVariant {
                name: name.to_string(),
                path: format!("variants/{}/{}.mp4", asset.id, name),
                dimensions: Some(Dimensions { width, height }),
                quality: Some(format!("{}p", height)),
                bitrate_kbps: Some(bitrate_kbps),
                file_size: estimated as i64,
                format: "mp4".to_string(),
                status: VariantStatus::Pending,
            })
        })
        .collect()
}

fn join_error(err: tokio::task::JoinError) -> DomainError {
    DomainError::Storage(StoreError::Backend(format!("Media task failed: {}", err)))
}
