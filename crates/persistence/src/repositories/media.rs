//! Media asset repository for database operations.

use async_trait::async_trait;
use domain::error::StoreResult;
use domain::models::{MediaAsset, MediaFileType};
use domain::store::MediaStore;
use sqlx::PgPool;
use uuid::Uuid;

use super::store_error;
use crate::entities::MediaAssetEntity;
use crate::metrics::QueryTimer;

/// Repository for the media_assets table.
#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaStore for MediaRepository {
    async fn insert(&self, asset: &MediaAsset) -> StoreResult<()> {
        let variants = serde_json::to_value(&asset.variants)?;
        let timer = QueryTimer::new("insert_media_asset");
        let result = sqlx::query(
            r#"
            INSERT INTO media_assets (id, filename, original_filename, file_path, file_size,
                                      mime_type, file_type, width, height, variants, usage_count,
                                      is_optimized, alt_text, checksum, uploaded_by,
                                      created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(asset.id)
        .bind(&asset.filename)
        .bind(&asset.original_filename)
        .bind(&asset.file_path)
        .bind(asset.file_size)
        .bind(&asset.mime_type)
        .bind(asset.file_type.to_string())
        .bind(asset.dimensions.map(|d| d.width as i32))
        .bind(asset.dimensions.map(|d| d.height as i32))
        .bind(variants)
        .bind(asset.usage_count)
        .bind(asset.is_optimized)
        .bind(&asset.alt_text)
        .bind(&asset.checksum)
        .bind(asset.uploaded_by)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<MediaAsset>> {
        let timer = QueryTimer::new("find_media_asset_by_id");
        let result = sqlx::query_as::<_, MediaAssetEntity>(
            r#"
            SELECT id, filename, original_filename, file_path, file_size, mime_type, file_type,
                   width, height, variants, usage_count, is_optimized, alt_text, checksum,
                   uploaded_by, created_at, updated_at
            FROM media_assets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(MediaAsset::from))
    }

    async fn list(&self, file_type: Option<MediaFileType>) -> StoreResult<Vec<MediaAsset>> {
        let timer = QueryTimer::new("list_media_assets");
        let result = sqlx::query_as::<_, MediaAssetEntity>(
            r#"
            SELECT id, filename, original_filename, file_path, file_size, mime_type, file_type,
                   width, height, variants, usage_count, is_optimized, alt_text, checksum,
                   uploaded_by, created_at, updated_at
            FROM media_assets
            WHERE ($1::text IS NULL OR file_type = $1)
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(file_type.map(|t| t.to_string()))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(MediaAsset::from)
            .collect())
    }

    async fn update(&self, asset: &MediaAsset) -> StoreResult<()> {
        let variants = serde_json::to_value(&asset.variants)?;
        let timer = QueryTimer::new("update_media_asset");
        let result = sqlx::query(
            r#"
            UPDATE media_assets
            SET width = $2, height = $3, variants = $4, is_optimized = $5,
                alt_text = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(asset.id)
        .bind(asset.dimensions.map(|d| d.width as i32))
        .bind(asset.dimensions.map(|d| d.height as i32))
        .bind(variants)
        .bind(asset.is_optimized)
        .bind(&asset.alt_text)
        .bind(asset.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)?;
        Ok(())
    }

    async fn increment_usage(&self, id: Uuid) -> StoreResult<Option<i64>> {
        let timer = QueryTimer::new("increment_media_usage");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE media_assets
            SET usage_count = usage_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING usage_count
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let timer = QueryTimer::new("delete_media_asset");
        let result = sqlx::query("DELETE FROM media_assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(store_error)?.rows_affected() > 0)
    }
}
