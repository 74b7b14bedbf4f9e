//! Content version repositories for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::StoreResult;
use domain::models::{ContentVersion, PublishedContent};
use domain::store::{ContentVersionStore, PublishedContentStore};
use sqlx::PgPool;
use uuid::Uuid;

use super::store_error;
use crate::entities::{ContentVersionEntity, PublishedContentEntity};
use crate::metrics::QueryTimer;

/// Repository for the content_versions table.
#[derive(Clone)]
pub struct ContentVersionRepository {
    pool: PgPool,
}

impl ContentVersionRepository {
    /// Creates a new ContentVersionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(
        &self,
        query_name: &str,
        sql: &str,
        element_id: &str,
    ) -> StoreResult<Vec<ContentVersion>> {
        let timer = QueryTimer::new(query_name);
        let result = sqlx::query_as::<_, ContentVersionEntity>(sql)
            .bind(element_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(ContentVersion::from)
            .collect())
    }
}

#[async_trait]
impl ContentVersionStore for ContentVersionRepository {
    async fn insert(&self, version: &ContentVersion) -> StoreResult<()> {
        let timer = QueryTimer::new("insert_content_version");
        let result = sqlx::query(
            r#"
            INSERT INTO content_versions (id, element_id, content, content_type, version_number,
                                          is_published, published_at, parent_version_id,
                                          change_summary, metadata, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(version.id)
        .bind(&version.element_id)
        .bind(&version.content)
        .bind(version.content_type.to_string())
        .bind(version.version_number)
        .bind(version.is_published)
        .bind(version.published_at)
        .bind(version.parent_version_id)
        .bind(&version.change_summary)
        .bind(&version.metadata)
        .bind(version.created_by)
        .bind(version.created_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ContentVersion>> {
        let timer = QueryTimer::new("find_content_version_by_id");
        let result = sqlx::query_as::<_, ContentVersionEntity>(
            r#"
            SELECT id, element_id, content, content_type, version_number, is_published,
                   published_at, parent_version_id, change_summary, metadata, created_by, created_at
            FROM content_versions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(ContentVersion::from))
    }

    async fn find_by_number(
        &self,
        element_id: &str,
        version_number: i32,
    ) -> StoreResult<Option<ContentVersion>> {
        let timer = QueryTimer::new("find_content_version_by_number");
        let result = sqlx::query_as::<_, ContentVersionEntity>(
            r#"
            SELECT id, element_id, content, content_type, version_number, is_published,
                   published_at, parent_version_id, change_summary, metadata, created_by, created_at
            FROM content_versions
            WHERE element_id = $1 AND version_number = $2
            "#,
        )
        .bind(element_id)
        .bind(version_number)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(ContentVersion::from))
    }

    async fn list_for_element(&self, element_id: &str) -> StoreResult<Vec<ContentVersion>> {
        self.fetch_many(
            "list_content_versions",
            r#"
            SELECT id, element_id, content, content_type, version_number, is_published,
                   published_at, parent_version_id, change_summary, metadata, created_by, created_at
            FROM content_versions
            WHERE element_id = $1
            ORDER BY version_number
            "#,
            element_id,
        )
        .await
    }

    async fn max_version_number(&self, element_id: &str) -> StoreResult<Option<i32>> {
        let timer = QueryTimer::new("max_content_version_number");
        let result = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(version_number) FROM content_versions WHERE element_id = $1",
        )
        .bind(element_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)
    }

    async fn find_published(&self, element_id: &str) -> StoreResult<Option<ContentVersion>> {
        Ok(self
            .fetch_many(
                "find_published_content_version",
                r#"
                SELECT id, element_id, content, content_type, version_number, is_published,
                       published_at, parent_version_id, change_summary, metadata, created_by, created_at
                FROM content_versions
                WHERE element_id = $1 AND is_published
                "#,
                element_id,
            )
            .await?
            .pop())
    }

    async fn mark_published(
        &self,
        element_id: &str,
        version_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ContentVersion>> {
        let timer = QueryTimer::new("mark_content_version_published");
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        // Clear first: the partial unique index allows one published row.
        sqlx::query(
            r#"
            UPDATE content_versions
            SET is_published = FALSE, published_at = NULL
            WHERE element_id = $1 AND id <> $2
              AND EXISTS (SELECT 1 FROM content_versions WHERE id = $2 AND element_id = $1)
            "#,
        )
        .bind(element_id)
        .bind(version_id)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        let published = sqlx::query_as::<_, ContentVersionEntity>(
            r#"
            UPDATE content_versions
            SET is_published = TRUE, published_at = $3
            WHERE id = $2 AND element_id = $1
            RETURNING id, element_id, content, content_type, version_number, is_published,
                      published_at, parent_version_id, change_summary, metadata, created_by, created_at
            "#,
        )
        .bind(element_id)
        .bind(version_id)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        timer.record();
        Ok(published.map(ContentVersion::from))
    }

    async fn clear_published(&self, element_id: &str) -> StoreResult<u64> {
        let timer = QueryTimer::new("clear_content_published");
        let result = sqlx::query(
            "UPDATE content_versions SET is_published = FALSE WHERE element_id = $1 AND is_published",
        )
        .bind(element_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.rows_affected())
    }

    async fn delete_versions(&self, ids: &[Uuid]) -> StoreResult<u64> {
        let timer = QueryTimer::new("delete_content_versions");
        let result = sqlx::query("DELETE FROM content_versions WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(store_error)?.rows_affected())
    }

    async fn delete_element(&self, element_id: &str) -> StoreResult<u64> {
        let timer = QueryTimer::new("delete_content_element");
        let result = sqlx::query("DELETE FROM content_versions WHERE element_id = $1")
            .bind(element_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(store_error)?.rows_affected())
    }

    async fn list_element_ids(&self) -> StoreResult<Vec<String>> {
        let timer = QueryTimer::new("list_content_element_ids");
        let result = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT element_id FROM content_versions ORDER BY element_id",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)
    }
}

/// Repository for the published_content table.
#[derive(Clone)]
pub struct PublishedContentRepository {
    pool: PgPool,
}

impl PublishedContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PublishedContentStore for PublishedContentRepository {
    async fn upsert(&self, row: &PublishedContent) -> StoreResult<()> {
        let timer = QueryTimer::new("upsert_published_content");
        let result = sqlx::query(
            r#"
            INSERT INTO published_content (element_id, version_id, version_number, content,
                                           content_type, metadata, published_at, published_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (element_id)
            DO UPDATE SET version_id = $2, version_number = $3, content = $4, content_type = $5,
                          metadata = $6, published_at = $7, published_by = $8
            "#,
        )
        .bind(&row.element_id)
        .bind(row.version_id)
        .bind(row.version_number)
        .bind(&row.content)
        .bind(row.content_type.to_string())
        .bind(&row.metadata)
        .bind(row.published_at)
        .bind(row.published_by)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)?;
        Ok(())
    }

    async fn find(&self, element_id: &str) -> StoreResult<Option<PublishedContent>> {
        let timer = QueryTimer::new("find_published_content");
        let result = sqlx::query_as::<_, PublishedContentEntity>(
            r#"
            SELECT element_id, version_id, version_number, content, content_type, metadata,
                   published_at, published_by
            FROM published_content
            WHERE element_id = $1
            "#,
        )
        .bind(element_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(PublishedContent::from))
    }

    async fn delete(&self, element_id: &str) -> StoreResult<bool> {
        let timer = QueryTimer::new("delete_published_content");
        let result = sqlx::query("DELETE FROM published_content WHERE element_id = $1")
            .bind(element_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(store_error)?.rows_affected() > 0)
    }
}
